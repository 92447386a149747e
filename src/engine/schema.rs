use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::decoder::is_exploded_array;
use super::validator_cache::ValidatorCache;
use super::{FailureLocation, RequestValidationInput, ValidationEngine, ValidationFailure};
use crate::runtime_config::RuntimeConfig;
use crate::security::{SecurityProvider, SecurityRequest};
use crate::spec::{ApiDescription, OperationMeta, ParameterLocation, ParameterMeta, SecurityScheme};

/// Default engine: JSON Schema checks for parameters and body, then security.
pub struct SchemaEngine {
    validators: ValidatorCache,
    security_schemes: HashMap<String, SecurityScheme>,
    security_providers: HashMap<String, Arc<dyn SecurityProvider>>,
}

impl std::fmt::Debug for SchemaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut providers: Vec<&String> = self.security_providers.keys().collect();
        providers.sort();
        f.debug_struct("SchemaEngine")
            .field("validators", &self.validators)
            .field("security_schemes", &self.security_schemes.keys())
            .field("security_providers", &providers)
            .finish()
    }
}

impl SchemaEngine {
    /// Engine for a description, with the schema cache toggled by `config`.
    #[must_use]
    pub fn new(description: &ApiDescription, config: &RuntimeConfig) -> Self {
        Self::with_cache(description, ValidatorCache::new(config.schema_cache))
    }

    #[must_use]
    pub fn with_cache(description: &ApiDescription, validators: ValidatorCache) -> Self {
        Self {
            validators,
            security_schemes: description.security_schemes().clone(),
            security_providers: HashMap::new(),
        }
    }

    /// Register the provider that checks the scheme declared as `scheme_name`.
    pub fn register_security_provider(
        &mut self,
        scheme_name: &str,
        provider: Arc<dyn SecurityProvider>,
    ) {
        self.security_providers
            .insert(scheme_name.to_string(), provider);
    }

    #[must_use]
    pub fn validators(&self) -> &ValidatorCache {
        &self.validators
    }

    fn validate_parameters(
        &self,
        input: &RequestValidationInput<'_>,
    ) -> Result<(), ValidationFailure> {
        let mut failures = Vec::new();
        for param in &input.operation.parameters {
            if let Err(failure) = self.validate_parameter(input, param) {
                if !input.options.multi_error {
                    return Err(failure);
                }
                failures.push(failure);
            }
        }
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(ValidationFailure::Multiple(failures)),
        }
    }

    fn validate_parameter(
        &self,
        input: &RequestValidationInput<'_>,
        param: &ParameterMeta,
    ) -> Result<(), ValidationFailure> {
        let request = input.request;
        let location = FailureLocation::from(param.location);
        let query_values: &[String] = match param.location {
            ParameterLocation::Query => input
                .query_params
                .get(&param.name)
                .map_or(&[][..], Vec::as_slice),
            _ => &[],
        };
        let raw = match param.location {
            ParameterLocation::Path => input.path_params.get(param.name.as_str()).copied(),
            ParameterLocation::Query => query_values.first().map(String::as_str),
            ParameterLocation::Header => request.get_header(&param.name),
            ParameterLocation::Cookie => request.get_cookie(&param.name),
        };

        let Some(raw) = raw else {
            if param.required {
                return Err(ValidationFailure::Schema {
                    name: param.name.clone(),
                    location,
                    value: String::new(),
                    reason: "value is required".to_string(),
                });
            }
            return Ok(());
        };

        // A repeated key carries one item per occurrence; a single value may
        // still be a delimited list
        let (decoded, raw) = if query_values.len() > 1 && is_exploded_array(param) {
            (
                input.decoder.decode_exploded(param, query_values),
                query_values.join(","),
            )
        } else {
            (input.decoder.decode(param, raw), raw.to_string())
        };
        let decoded = decoded.map_err(|reason| ValidationFailure::Parse {
            name: param.name.clone(),
            location,
            value: raw.clone(),
            reason,
        })?;

        let Some(schema) = &param.schema else {
            return Ok(());
        };
        let validator = self
            .validators
            .get_or_compile(
                &input.operation.operation_id,
                &location.to_string(),
                &param.name,
                schema,
            )
            .map_err(ValidationFailure::Unclassified)?;
        validator
            .validate(&decoded)
            .map_err(|e| ValidationFailure::Schema {
                name: param.name.clone(),
                location,
                value: raw,
                reason: e.to_string(),
            })
    }

    fn validate_body(&self, input: &RequestValidationInput<'_>) -> Result<(), ValidationFailure> {
        let operation = input.operation;
        let Some(body) = &input.request.body else {
            if operation.request_body_required {
                return Err(body_failure(String::new(), "request body is required".to_string()));
            }
            return Ok(());
        };
        let Some(schema) = &operation.request_schema else {
            return Ok(());
        };
        let validator = self
            .validators
            .get_or_compile(&operation.operation_id, "body", "", schema)
            .map_err(ValidationFailure::Unclassified)?;
        let reasons: Vec<String> = validator.iter_errors(body).map(|e| e.to_string()).collect();
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(body_failure(compact(body), reasons.join("; ")))
        }
    }

    fn validate_security(
        &self,
        input: &RequestValidationInput<'_>,
    ) -> Result<(), ValidationFailure> {
        let operation = input.operation;
        if operation.security.is_empty() {
            return Ok(());
        }
        let sec_req = input.request.security_request();
        let mut unmet = Vec::with_capacity(operation.security.len());

        for requirement in &operation.security {
            // An empty requirement object makes security optional
            if requirement.0.is_empty() {
                return Ok(());
            }
            match self.first_unmet_scheme(requirement.0.iter(), &sec_req) {
                None => {
                    debug!(
                        operation_id = %operation.operation_id,
                        schemes = ?requirement.0.keys().collect::<Vec<_>>(),
                        "Security requirement satisfied"
                    );
                    return Ok(());
                }
                Some(reason) => unmet.push(reason),
            }
        }

        warn!(
            operation_id = %operation.operation_id,
            reasons = ?unmet,
            "No security requirement satisfied"
        );
        Err(ValidationFailure::Security {
            reason: unmet.join(" or "),
        })
    }

    fn first_unmet_scheme<'r, I>(&self, schemes: I, sec_req: &SecurityRequest<'_>) -> Option<String>
    where
        I: Iterator<Item = (&'r String, &'r Vec<String>)>,
    {
        for (scheme_name, scopes) in schemes {
            let Some(scheme) = self.security_schemes.get(scheme_name) else {
                return Some(format!("security scheme '{scheme_name}' is not declared"));
            };
            let Some(provider) = self.security_providers.get(scheme_name) else {
                return Some(format!("no provider registered for security scheme '{scheme_name}'"));
            };
            if !provider.validate(scheme, scopes, sec_req) {
                return Some(format!("security scheme '{scheme_name}' not satisfied"));
            }
        }
        None
    }
}

impl ValidationEngine for SchemaEngine {
    fn validate(&self, input: &RequestValidationInput<'_>) -> Result<(), ValidationFailure> {
        let operation: &OperationMeta = input.operation;
        self.validate_parameters(input)?;
        if !input.options.exclude_request_body {
            self.validate_body(input)?;
        }
        if !input.options.exclude_security {
            self.validate_security(input)?;
        }
        debug!(
            operation_id = %operation.operation_id,
            method = %operation.method,
            api_path = %operation.path,
            "Request validated"
        );
        Ok(())
    }

    fn warm_up(&self, description: &ApiDescription) -> usize {
        self.validators.precompile(description)
    }
}

fn body_failure(value: String, reason: String) -> ValidationFailure {
    ValidationFailure::Schema {
        name: "body".to_string(),
        location: FailureLocation::Body,
        value,
        reason,
    }
}

/// Single-line rendering of a body for failure messages, shortened past 200 chars.
fn compact(body: &Value) -> String {
    const MAX: usize = 200;
    let text = body.to_string();
    if text.chars().count() <= MAX {
        return text;
    }
    let mut short: String = text.chars().take(MAX).collect();
    short.push_str("...");
    short
}
