use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::security::SecurityRequest;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;

/// Query parameters by name, every value in the order it appeared.
pub type QueryParams = HashMap<String, Vec<String>>;

/// An HTTP request as seen by the middleware chain and handlers.
///
/// Header names are stored lowercase. Cookies and query parameters are parsed
/// once, when the request is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub method: Method,
    /// Path without the query string
    pub path: String,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub query_params: QueryParams,
    /// JSON body, if any
    pub body: Option<Value>,
}

impl Request {
    /// Build a request from a method and a path that may carry a query string.
    #[must_use]
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, query),
            None => (uri, ""),
        };
        Self {
            id: RequestId::new(),
            method,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            headers: HashMap::new(),
            cookies: HashMap::new(),
            query_params: parse_query_params(query),
            body: None,
        }
    }

    #[must_use]
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    #[must_use]
    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Add a header. `cookie` re-parses the cookie map; `x-request-id` adopts the id when valid.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match name.as_str() {
            "cookie" => self.cookies = parse_cookies(&value),
            REQUEST_ID_HEADER => self.id = RequestId::from_header_or_new(Some(&value)),
            _ => {}
        }
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body and set `content-type: application/json`.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        self
    }

    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// First value of a query parameter.
    #[must_use]
    pub fn get_query(&self, name: &str) -> Option<&str> {
        self.query_params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of a repeated query parameter, empty when absent.
    #[must_use]
    pub fn get_query_all(&self, name: &str) -> &[String] {
        self.query_params.get(name).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// View for security providers.
    #[must_use]
    pub fn security_request(&self) -> SecurityRequest<'_> {
        SecurityRequest {
            headers: &self.headers,
            query: &self.query_params,
            cookies: &self.cookies,
        }
    }
}

/// Parse a `Cookie` header value into name/value pairs.
#[must_use]
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// URL-decode a query string (without the leading `?`). Repeated keys keep every value.
#[must_use]
pub fn parse_query_params(query: &str) -> QueryParams {
    let mut params = QueryParams::new();
    if query.is_empty() {
        return params;
    }
    for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
        params.entry(k.into_owned()).or_default().push(v.into_owned());
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_splits_query() {
        let req = Request::get("/users?limit=10&name=a%20b");
        assert_eq!(req.path, "/users");
        assert_eq!(req.get_query("limit"), Some("10"));
        assert_eq!(req.get_query("name"), Some("a b"));
    }

    #[test]
    fn test_repeated_query_keys_keep_every_value() {
        let req = Request::get("/list?ids=1&ids=2&tag=a&ids=3");
        assert_eq!(req.get_query_all("ids"), ["1", "2", "3"]);
        assert_eq!(req.get_query("ids"), Some("1"));
        assert_eq!(req.get_query_all("tag"), ["a"]);
        assert!(req.get_query_all("missing").is_empty());
    }

    #[test]
    fn test_headers_are_lowercased() {
        let req = Request::get("/").with_header("X-API-Key", "secret");
        assert_eq!(req.headers.get("x-api-key").map(String::as_str), Some("secret"));
        assert_eq!(req.get_header("X-Api-Key"), Some("secret"));
    }

    #[test]
    fn test_cookie_header_is_parsed() {
        let req = Request::get("/").with_header("Cookie", "session=abc; theme=dark; =skip");
        assert_eq!(req.get_cookie("session"), Some("abc"));
        assert_eq!(req.get_cookie("theme"), Some("dark"));
        assert_eq!(req.cookies.len(), 2);
    }

    #[test]
    fn test_request_id_header_is_adopted() {
        let id = RequestId::new();
        let req = Request::get("/").with_header("X-Request-Id", id.to_string());
        assert_eq!(req.id, id);
    }

    #[test]
    fn test_with_json_sets_content_type() {
        let req = Request::post("/pets").with_json(json!({"name": "rex"}));
        assert_eq!(req.get_header("content-type"), Some("application/json"));
        assert_eq!(req.body, Some(json!({"name": "rex"})));
    }
}
