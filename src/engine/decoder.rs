use crate::spec::{ParameterLocation, ParameterMeta, ParameterStyle};
use serde_json::Value;

/// Turns a raw parameter string into the JSON value its schema describes.
pub trait ParamDecoder: Send + Sync {
    /// # Errors
    ///
    /// A human-readable reason when `raw` cannot represent the declared type.
    fn decode(&self, param: &ParameterMeta, raw: &str) -> Result<Value, String>;

    /// Decode an exploded array parameter, one raw value per array item
    /// (`?ids=1&ids=2`).
    ///
    /// # Errors
    ///
    /// The reason for the first item that cannot represent the `items` type.
    fn decode_exploded(&self, param: &ParameterMeta, raws: &[String]) -> Result<Value, String> {
        let items = param.schema.as_ref().and_then(|s| s.get("items"));
        raws.iter()
            .map(|raw| decode_primitive(raw, schema_type(items)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Whether repeated query keys carry the items of this parameter.
///
/// True for array-typed query parameters in `form` style (the default) unless
/// `explode: false` is declared.
#[must_use]
pub fn is_exploded_array(param: &ParameterMeta) -> bool {
    param.location == ParameterLocation::Query
        && schema_type(param.schema.as_ref()) == Some("array")
        && matches!(param.style, None | Some(ParameterStyle::Form))
        && param.explode != Some(false)
}

/// Schema-type driven decoding.
///
/// - `integer`, `number`, `boolean`: parsed, failing when the text does not parse;
/// - `array`: split on `,` (or space / `|` for `spaceDelimited` / `pipeDelimited`),
///   each item decoded against `items`. An empty raw value is the empty array;
///   an empty item inside a list is decoded like any other item;
/// - `object`: parsed as JSON;
/// - anything else, or no schema: kept as a string.
///
/// `label` (`.a.b`) and `matrix` (`;name=a,b`) prefixes are stripped first.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParamDecoder;

impl ParamDecoder for DefaultParamDecoder {
    fn decode(&self, param: &ParameterMeta, raw: &str) -> Result<Value, String> {
        let raw = strip_style_prefix(param, raw);
        let schema = param.schema.as_ref();
        match schema_type(schema) {
            Some("array") => {
                let items = schema.and_then(|s| s.get("items"));
                let delim = match param.style {
                    Some(ParameterStyle::SpaceDelimited) => ' ',
                    Some(ParameterStyle::PipeDelimited) => '|',
                    Some(ParameterStyle::Label) => '.',
                    _ => ',',
                };
                if raw.is_empty() {
                    return Ok(Value::Array(Vec::new()));
                }
                raw.split(delim)
                    .map(|part| decode_primitive(part.trim(), schema_type(items)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Some("object") => serde_json::from_str::<Value>(raw)
                .map_err(|e| format!("value is not a JSON object: {e}"))
                .and_then(|v| {
                    if v.is_object() {
                        Ok(v)
                    } else {
                        Err("value is not a JSON object".to_string())
                    }
                }),
            ty => decode_primitive(raw, ty),
        }
    }
}

fn strip_style_prefix<'r>(param: &ParameterMeta, raw: &'r str) -> &'r str {
    match param.style {
        Some(ParameterStyle::Label) => raw.strip_prefix('.').unwrap_or(raw),
        Some(ParameterStyle::Matrix) => raw
            .strip_prefix(';')
            .and_then(|r| r.strip_prefix(param.name.as_str()))
            .and_then(|r| r.strip_prefix('='))
            .unwrap_or(raw),
        _ => raw,
    }
}

/// The schema's `type`, taking the first non-null entry of a type list.
fn schema_type(schema: Option<&Value>) -> Option<&str> {
    match schema?.get("type")? {
        Value::String(ty) => Some(ty.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null"),
        _ => None,
    }
}

fn decode_primitive(raw: &str, ty: Option<&str>) -> Result<Value, String> {
    match ty {
        Some("integer") => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| "value must be an integer".to_string()),
        Some("number") => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| "value must be a number".to_string()),
        Some("boolean") => raw
            .parse::<bool>()
            .map(Value::from)
            .map_err(|_| "value must be a boolean".to_string()),
        _ => Ok(Value::String(raw.to_string())),
    }
}
