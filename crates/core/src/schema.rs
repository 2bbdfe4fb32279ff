//! Data-driven argument validation.
//!
//! Every tool declares its input as a list of [`FieldSpec`]s. A single
//! validator walks that list, so adding a tool never means writing another
//! validation block.

use serde_json::{json, Map, Number, Value};

use crate::errors::ToolError;

pub type JsonObject = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    /// Record id: a JSON integer or a string of ASCII digits.
    Id,
    /// Reference the CRM accepts either as a number or as free text.
    IntegerOrString,
}

impl FieldType {
    /// JSON Schema `type` advertised to callers.
    pub fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer | Self::Id | Self::IntegerOrString => "integer",
            Self::Number => "number",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => is_integer(value),
            Self::Number => value.is_number(),
            Self::Id => match value {
                Value::String(raw) => !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()),
                other => is_integer(other),
            },
            Self::IntegerOrString => value.is_string() || is_integer(value),
        }
    }

    fn expectation(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Id => "an integer or numeric string",
            Self::IntegerOrString => "an integer or string",
        }
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(number) => {
            number.is_i64()
                || number.is_u64()
                || number.as_f64().map(|f| f.is_finite() && f.fract() == 0.0).unwrap_or(false)
        }
        _ => false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldType,
    pub required: bool,
    pub non_empty: bool,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldType, description: &'static str) -> Self {
        Self { name, kind, required: true, non_empty: false, description }
    }

    pub const fn optional(name: &'static str, kind: FieldType, description: &'static str) -> Self {
        Self { name, kind, required: false, non_empty: false, description }
    }

    pub const fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }
}

/// Checks `args` against `fields` and returns only the declared keys.
///
/// `null` counts as absent. The first failure wins.
pub fn validate(fields: &[FieldSpec], args: &Value) -> Result<JsonObject, ToolError> {
    let object = match args {
        Value::Null => return validate_object(fields, &JsonObject::new()),
        Value::Object(object) => object,
        _ => {
            let message = "Invalid arguments: expected an object".to_string();
            return Err(ToolError::InvalidParams(message));
        }
    };
    validate_object(fields, object)
}

fn validate_object(fields: &[FieldSpec], object: &JsonObject) -> Result<JsonObject, ToolError> {
    let mut validated = JsonObject::new();

    for field in fields {
        let value = match object.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(ToolError::InvalidParams(format!(
                        "Invalid arguments: `{}` is required",
                        field.name
                    )));
                }
                continue;
            }
            Some(value) => value,
        };

        if !field.kind.accepts(value) {
            return Err(ToolError::InvalidParams(format!(
                "Invalid arguments: `{}` must be {}",
                field.name,
                field.kind.expectation()
            )));
        }

        if field.non_empty && value.as_str().map(str::is_empty).unwrap_or(false) {
            return Err(ToolError::InvalidParams(format!(
                "Invalid arguments: `{}` must not be empty",
                field.name
            )));
        }

        validated.insert(field.name.to_string(), normalize_integer(field.kind, value));
    }

    Ok(validated)
}

/// Integer-typed fields store `42.0` as `42`.
fn normalize_integer(kind: FieldType, value: &Value) -> Value {
    let integer_kind =
        matches!(kind, FieldType::Integer | FieldType::Id | FieldType::IntegerOrString);
    match value {
        Value::Number(number) if integer_kind => {
            integral(number).map(Value::from).unwrap_or_else(|| value.clone())
        }
        other => other.clone(),
    }
}

/// JSON Schema for `list_tools`.
pub fn input_schema(fields: &[FieldSpec]) -> JsonObject {
    let mut properties = JsonObject::new();
    for field in fields {
        properties.insert(
            field.name.to_string(),
            json!({ "type": field.kind.json_type(), "description": field.description }),
        );
    }

    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));

    let required: Vec<Value> =
        fields.iter().filter(|field| field.required).map(|field| json!(field.name)).collect();
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }

    schema
}

/// Renders a scalar argument for use in a URL path.
///
/// Integral floats drop their fraction: `42.0` renders as `42`.
pub fn path_text(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        Value::Number(number) => match integral(number) {
            Some(whole) => whole.to_string(),
            None => number.to_string(),
        },
        other => other.to_string(),
    }
}

/// JavaScript truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => {
            number.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(true)
        }
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Text of a truthy value; strings as-is, anything else as compact JSON.
pub fn truthy_text(value: Option<&Value>) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    value.map(path_text)
}

/// A float with no fractional part as an `i64`, e.g. `7.0`.
fn integral(number: &Number) -> Option<i64> {
    if number.is_i64() || number.is_u64() {
        return None;
    }
    let float = number.as_f64()?;
    let in_range = float.is_finite()
        && float.fract() == 0.0
        && float >= i64::MIN as f64
        && float < i64::MAX as f64;
    in_range.then_some(float as i64)
}

/// Percent-encodes everything outside the `encodeURIComponent` unreserved set.
pub fn encode_path_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}

/// Inverse of [`encode_path_segment`]. `None` on a malformed escape or
/// bytes that are not UTF-8.
pub fn decode_path_segment(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] == b'%' {
            let hex = raw.get(index + 1..index + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            index += 3;
        } else {
            decoded.push(bytes[index]);
            index += 1;
        }
    }

    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        decode_path_segment, encode_path_segment, input_schema, path_text, truthy_text, validate,
        FieldSpec, FieldType,
    };
    use crate::errors::ToolError;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::required("id", FieldType::Id, "Record id"),
        FieldSpec::required("company", FieldType::String, "Company").non_empty(),
        FieldSpec::optional("country", FieldType::Integer, "Country id"),
        FieldSpec::optional("amount", FieldType::Number, "Amount"),
        FieldSpec::optional("source", FieldType::IntegerOrString, "Source"),
    ];

    #[test]
    fn accepts_numeric_and_numeric_string_ids() {
        let numeric = validate(FIELDS, &json!({ "id": 42, "company": "Acme" }));
        assert!(numeric.is_ok());

        let textual = validate(FIELDS, &json!({ "id": "42", "company": "Acme" }));
        assert_eq!(textual.expect("numeric string id")["id"], json!("42"));

        let rejected = validate(FIELDS, &json!({ "id": "forty-two", "company": "Acme" }));
        assert_eq!(
            rejected,
            Err(ToolError::InvalidParams(
                "Invalid arguments: `id` must be an integer or numeric string".to_string()
            ))
        );
    }

    #[test]
    fn reports_first_missing_required_field() {
        let error = validate(FIELDS, &json!({})).expect_err("id is required");
        assert_eq!(error, ToolError::InvalidParams("Invalid arguments: `id` is required".into()));

        let null_args = validate(FIELDS, &serde_json::Value::Null).expect_err("null is empty");
        assert!(null_args.message().contains("`id`"));
    }

    #[test]
    fn rejects_wrong_types_and_empty_strings() {
        let wrong = validate(FIELDS, &json!({ "id": 1, "company": "Acme", "country": "FR" }))
            .expect_err("country must be integer");
        assert!(wrong.message().contains("`country` must be an integer"));

        let fractional = validate(FIELDS, &json!({ "id": 1, "company": "Acme", "country": 1.5 }));
        assert!(fractional.is_err());

        let empty = validate(FIELDS, &json!({ "id": 1, "company": "" }))
            .expect_err("company must not be empty");
        assert!(empty.message().contains("must not be empty"));

        let not_object = validate(FIELDS, &json!([1, 2]));
        assert!(matches!(not_object, Err(ToolError::InvalidParams(_))));
    }

    #[test]
    fn drops_undeclared_keys_and_keeps_optional_values() {
        let validated = validate(
            FIELDS,
            &json!({ "id": 7, "company": "Acme", "amount": 12.5, "source": "web", "extra": true }),
        )
        .expect("valid arguments");

        assert_eq!(validated.len(), 4);
        assert!(!validated.contains_key("extra"));
        assert_eq!(validated["amount"], json!(12.5));
        assert_eq!(validated["source"], json!("web"));
    }

    #[test]
    fn integral_floats_become_integers() {
        let validated = validate(
            FIELDS,
            &json!({ "id": 42.0, "company": "Acme", "country": 3.0, "amount": 10.0 }),
        )
        .expect("integral floats are integers");

        assert_eq!(validated["id"], json!(42));
        assert!(validated["id"].is_i64());
        assert_eq!(validated["country"], json!(3));
        assert!(validated["amount"].is_f64(), "number fields keep their float");
    }

    #[test]
    fn path_text_drops_zero_fractions() {
        assert_eq!(path_text(&json!(42.0)), "42");
        assert_eq!(path_text(&json!(7)), "7");
        assert_eq!(path_text(&json!(2.5)), "2.5");
        assert_eq!(path_text(&json!("abc")), "abc");
    }

    #[test]
    fn truthy_text_follows_javascript_truthiness() {
        assert_eq!(truthy_text(Some(&json!(0))), None);
        assert_eq!(truthy_text(Some(&json!(""))), None);
        assert_eq!(truthy_text(Some(&json!(false))), None);
        assert_eq!(truthy_text(None), None);
        assert_eq!(truthy_text(Some(&json!(7.0))).as_deref(), Some("7"));
        assert_eq!(
            truthy_text(Some(&json!({ "vat": ["invalid"] }))).as_deref(),
            Some(r#"{"vat":["invalid"]}"#)
        );
    }

    #[test]
    fn schema_lists_required_fields_only_when_present() {
        let schema = input_schema(FIELDS);
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["properties"]["id"]["type"], json!("integer"));
        assert_eq!(schema["properties"]["amount"]["type"], json!("number"));
        assert_eq!(schema["required"], json!(["id", "company"]));

        let empty = input_schema(&[]);
        assert!(!empty.contains_key("required"));
        assert_eq!(empty["properties"], json!({}));
    }

    #[test]
    fn path_segments_encode_like_encode_uri_component() {
        assert_eq!(encode_path_segment("foo bar"), "foo%20bar");
        assert_eq!(encode_path_segment("a/b?c=d&e"), "a%2Fb%3Fc%3Dd%26e");
        assert_eq!(encode_path_segment("it's (ok)!"), "it's%20(ok)!");
        assert_eq!(encode_path_segment("café"), "caf%C3%A9");
    }

    #[test]
    fn path_segments_decode_and_reject_bad_escapes() {
        assert_eq!(decode_path_segment("foo%20bar").as_deref(), Some("foo bar"));
        assert_eq!(decode_path_segment("caf%C3%A9").as_deref(), Some("café"));
        assert_eq!(decode_path_segment("plain").as_deref(), Some("plain"));
        assert_eq!(decode_path_segment("bad%2"), None);
        assert_eq!(decode_path_segment("bad%zz"), None);
        assert_eq!(decode_path_segment("%FF"), None);
    }
}
