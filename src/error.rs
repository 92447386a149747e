//! Request-time failures and their outward HTTP form.
//!
//! | Failure | Status |
//! |---|---|
//! | [`GuardError::Resolution`] | 400 |
//! | [`GuardError::MethodNotDeclared`] | 400 |
//! | [`ValidationFailure::Parse`], `Schema`, `Multiple` | 400 |
//! | [`ValidationFailure::Security`] | 403 |
//! | [`ValidationFailure::Unclassified`] | 500 |
//!
//! The engine's message is carried verbatim into the response detail.

use crate::engine::ValidationFailure;
use crate::resolver::ResolutionError;
use crate::server::Response;
use http::{Method, StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("method '{method}' not found on path '{path}'")]
    MethodNotDeclared { method: Method, path: String },
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

/// Status code plus message, ready to be written as a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// `{"error": <reason phrase>, "status": <code>, "detail": <message>}`
    #[must_use]
    pub fn to_response(&self) -> Response {
        Response::json(
            self.status,
            json!({
                "error": self.status.canonical_reason().unwrap_or("Error"),
                "status": self.status.as_u16(),
                "detail": self.message,
            }),
        )
    }
}

impl GuardError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            GuardError::Resolution(_) | GuardError::MethodNotDeclared { .. } => {
                StatusCode::BAD_REQUEST
            }
            GuardError::Validation(failure) => match failure {
                ValidationFailure::Parse { .. }
                | ValidationFailure::Schema { .. }
                | ValidationFailure::Multiple(_) => StatusCode::BAD_REQUEST,
                ValidationFailure::Security { .. } => StatusCode::FORBIDDEN,
                ValidationFailure::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Whether the failure is the caller's fault rather than the server's.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<&GuardError> for HttpError {
    fn from(err: &GuardError) -> Self {
        HttpError::new(err.status(), err.to_string())
    }
}

impl From<GuardError> for HttpError {
    fn from(err: GuardError) -> Self {
        HttpError::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FailureLocation;

    #[test]
    fn test_status_mapping() {
        let resolution = GuardError::from(ResolutionError::PathNotInSpec {
            route: "/goodbye/:name".into(),
            api_path: "/goodbye/{name}".into(),
        });
        assert_eq!(resolution.status(), StatusCode::BAD_REQUEST);

        let method = GuardError::MethodNotDeclared {
            method: Method::POST,
            path: "/hello/world".into(),
        };
        assert_eq!(method.status(), StatusCode::BAD_REQUEST);
        assert_eq!(method.to_string(), "method 'POST' not found on path '/hello/world'");

        let parse = GuardError::from(ValidationFailure::Parse {
            name: "number".into(),
            location: FailureLocation::Path,
            value: "USD".into(),
            reason: "value must be an integer".into(),
        });
        assert_eq!(parse.status(), StatusCode::BAD_REQUEST);

        let security = GuardError::from(ValidationFailure::Security {
            reason: "security scheme 'ApiKeyAuth' not satisfied".into(),
        });
        assert_eq!(security.status(), StatusCode::FORBIDDEN);

        let other = GuardError::from(ValidationFailure::Unclassified("boom".into()));
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!other.is_client_error());
    }

    #[test]
    fn test_message_is_verbatim() {
        let failure = ValidationFailure::Unclassified("engine exploded: code 7".into());
        let http = HttpError::from(GuardError::from(failure));
        assert_eq!(http.message, "engine exploded: code 7");
    }

    #[test]
    fn test_problem_body() {
        let http = HttpError::new(StatusCode::FORBIDDEN, "nope");
        let response = http.to_response();
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(
            response.body,
            json!({"error": "Forbidden", "status": 403, "detail": "nope"})
        );
        assert_eq!(response.get_header("content-type"), Some("application/json"));
    }
}
