/*
[INPUT]:  Decoded JSON response bodies
[OUTPUT]: Untyped response envelope with `data` / `error` accessors
[POS]:    Data layer - response envelope shared by every endpoint
[UPDATE]: When the API envelope gains fields callers commonly need
*/

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::Result;

/// JSON envelope returned by every API call.
///
/// Bodies that fail to decode are represented as JSON `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope(Value);

impl Envelope {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Decode a response body, falling back to `null` when it is not JSON
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => Self(value),
            Err(err) => {
                tracing::debug!(error = %err, "response body is not JSON");
                Self(Value::Null)
            }
        }
    }

    /// The `data` payload, if present and non-null
    pub fn data(&self) -> Option<&Value> {
        self.0.get("data").filter(|value| !value.is_null())
    }

    /// Human-readable `error` message sent by the API
    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn success(&self) -> Option<bool> {
        self.0.get("success").and_then(Value::as_bool)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Deserialize `data` into a caller-defined type
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self.0.get("data").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Envelope {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
