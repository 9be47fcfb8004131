use mongodb::bson::oid::ObjectId;
use serde_json::{Map, Value, json};

use crate::utils::error::CustomError;

pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

/// Parse a path or token id, rejecting malformed values as bad input.
pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| CustomError::InvalidInput(format!("Invalid {} id", what)))
}

/// Clamp an optional, possibly out-of-range value into `[min, max]`.
pub fn clamp_or(value: Option<i64>, default: i64, min: i64, max: i64) -> i64 {
    value.unwrap_or(default).clamp(min, max)
}

/// Build the standard success envelope, merging `data` fields into it.
pub fn envelope(message: &str, status: u16, data: Value) -> Value {
    let mut body = Map::new();
    body.insert("success".into(), json!(true));
    body.insert("message".into(), json!(message));
    body.insert("httpStatusCode".into(), json!(status));
    body.insert("service".into(), json!(service_name()));
    if let Value::Object(fields) = data {
        body.extend(fields);
    }
    Value::Object(body)
}
