/*
[INPUT]:  JSON object of request parameters (possibly nested, possibly holding `@path` markers)
[OUTPUT]: PHP-style bracket-notation form fields, url-encoded bodies and query strings
[POS]:    HTTP layer - request payload encoding
[UPDATE]: When changing nested-field or file-upload encoding rules
*/

use std::path::PathBuf;

use serde_json::{Map, Value};

/// Prefix that turns a string value into a file upload
pub const FILE_MARKER: char = '@';

/// Value of a single encoded form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Local file to attach; resolved by the transport, never opened here
    File(PathBuf),
    /// Empty container, sent as `name=` with the name left unencoded
    Empty,
}

/// One flattened `name=value` pair, name already in bracket notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
}

impl FormField {
    fn text(name: String, value: impl Into<String>) -> Self {
        Self {
            name,
            value: FieldValue::Text(value.into()),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.value, FieldValue::File(_))
    }

    /// `name=value` with PHP `urlencode` for the name and `rawurlencode` for the value
    fn to_encoded_pair(&self) -> String {
        let value = match &self.value {
            FieldValue::Text(text) => urlencoding::encode(text).into_owned(),
            FieldValue::File(path) => {
                let raw = format!("{FILE_MARKER}{}", path.display());
                urlencoding::encode(&raw).into_owned()
            }
            FieldValue::Empty => return format!("{}=", self.name),
        };
        format!("{}={}", encode_key(&self.name), value)
    }
}

/// Encoded request body handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `application/x-www-form-urlencoded` body
    Form(String),
    /// At least one file marker was present; sent as `multipart/form-data`
    Multipart(Vec<FormField>),
}

impl Payload {
    /// Encode a request body, switching to multipart when a file marker is present
    pub fn encode(params: &Map<String, Value>) -> Self {
        let fields = flatten(params, true);
        if fields.iter().any(FormField::is_file) {
            Payload::Multipart(fields)
        } else {
            Payload::Form(join_encoded(&fields))
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Payload::Multipart(_))
    }
}

/// Encode query parameters. `@` has no special meaning here.
pub fn encode_query(params: &Map<String, Value>) -> String {
    join_encoded(&flatten(params, false))
}

/// Flatten a parameter object into bracket-notation fields, in insertion order.
///
/// Associative children become `parent[key]`, list children `parent[]`; a
/// container nested in a list keeps its index (`parent[0][..]`). Empty
/// containers encode as an empty assignment and `null` values are dropped.
pub fn flatten(params: &Map<String, Value>, detect_files: bool) -> Vec<FormField> {
    let mut fields = Vec::new();
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(_) | Value::Object(_) => {
                flatten_nested(&mut fields, key, value, detect_files)
            }
            scalar => fields.push(scalar_field(key.clone(), scalar, detect_files)),
        }
    }
    fields
}

fn flatten_nested(fields: &mut Vec<FormField>, prefix: &str, value: &Value, detect_files: bool) {
    let entries: Vec<(String, &Value)> = match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        Value::Object(map) => map.iter().map(|(key, item)| (key.clone(), item)).collect(),
        _ => return,
    };

    if entries.is_empty() {
        fields.push(FormField {
            name: prefix.to_string(),
            value: FieldValue::Empty,
        });
        return;
    }

    let associative = is_associative(value);
    for (key, item) in entries {
        match item {
            Value::Null => {}
            Value::Array(_) | Value::Object(_) => {
                flatten_nested(fields, &format!("{prefix}[{key}]"), item, detect_files)
            }
            scalar => {
                let name = if associative {
                    format!("{prefix}[{key}]")
                } else {
                    format!("{prefix}[]")
                };
                fields.push(scalar_field(name, scalar, detect_files));
            }
        }
    }
}

/// Objects keyed only by integers count as lists, matching PHP's key casting.
fn is_associative(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.keys().any(|key| !is_integer_key(key)),
        _ => false,
    }
}

/// Canonical decimal integer only: `"7"` and `"-7"`, not `"007"`, `"+7"` or `"-0"`
fn is_integer_key(key: &str) -> bool {
    key.parse::<i64>()
        .is_ok_and(|index| index.to_string() == key)
}

fn scalar_field(name: String, value: &Value, detect_files: bool) -> FormField {
    match value {
        Value::String(text) => match text.strip_prefix(FILE_MARKER) {
            Some(path) if detect_files => FormField {
                name,
                value: FieldValue::File(PathBuf::from(path)),
            },
            _ => FormField::text(name, text.as_str()),
        },
        Value::Bool(flag) => FormField::text(name, if *flag { "1" } else { "0" }),
        Value::Number(number) => FormField::text(name, number.to_string()),
        _ => FormField::text(name, ""),
    }
}

fn join_encoded(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(FormField::to_encoded_pair)
        .collect::<Vec<_>>()
        .join("&")
}

/// PHP `urlencode`: like `rawurlencode` but space becomes `+` and `~` is escaped
fn encode_key(key: &str) -> String {
    urlencoding::encode(key)
        .replace("%20", "+")
        .replace('~', "%7E")
}
