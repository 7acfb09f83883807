//! Canonical compact JSON rendering.
//!
//! ```text
//! {"MESSAGE":{"SUBJECT":"A.B","KIND":"PUBLISH","FIELD":[
//!     {"NAME":"CONTENT-VERSION","TYPE":"F32","BITS":"44FC6000","VALUE":"2019"},
//!     {"NAME":"COUNTER","TYPE":"U16","VALUE":"1"}]}}
//! ```
//!
//! Every value is rendered as a JSON string.  Keys appear in the order shown;
//! `FIELD` is omitted for a message with no fields.  On input, keys and type
//! names are case-insensitive and scalar values may be strings, numbers or
//! booleans.

use serde::Serialize;
use serde_json::{Map, Value};

use c2ms_contracts::{C2msError, C2msResult, Field, FieldType, FieldValue, Message, MessageKind};

// ── Rendering ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonField<'a> {
    #[serde(rename = "NAME")]
    name: &'a str,
    #[serde(rename = "TYPE")]
    field_type: &'static str,
    #[serde(rename = "BITS", skip_serializing_if = "Option::is_none")]
    bits: Option<String>,
    #[serde(rename = "VALUE")]
    value: String,
}

impl<'a> JsonField<'a> {
    fn from_field(field: &'a Field) -> Self {
        let value = match field.value() {
            FieldValue::Bool(true) => "TRUE".to_string(),
            FieldValue::Bool(false) => "FALSE".to_string(),
            other => other.to_text(),
        };
        Self {
            name: field.name(),
            field_type: field.field_type().as_str(),
            bits: field.value().float_bits_hex(),
            value,
        }
    }
}

#[derive(Serialize)]
struct JsonMessage<'a> {
    #[serde(rename = "SUBJECT")]
    subject: &'a str,
    #[serde(rename = "KIND")]
    kind: &'static str,
    #[serde(rename = "FIELD", skip_serializing_if = "Vec::is_empty")]
    fields: Vec<JsonField<'a>>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "MESSAGE")]
    message: JsonMessage<'a>,
}

fn encode<T: Serialize>(value: &T) -> C2msResult<String> {
    serde_json::to_string(value).map_err(|e| C2msError::parse(format!("failed to encode JSON: {e}")))
}

pub fn field_to_json(field: &Field) -> C2msResult<String> {
    encode(&JsonField::from_field(field))
}

pub fn message_to_json(msg: &Message) -> C2msResult<String> {
    message_to_json_as(msg, msg.subject().unwrap_or_default())
}

pub fn message_to_json_as(msg: &Message, subject: &str) -> C2msResult<String> {
    encode(&Envelope {
        message: JsonMessage {
            subject,
            kind: msg.kind().as_str(),
            fields: msg.fields().map(JsonField::from_field).collect(),
        },
    })
}

// ── Parsing ───────────────────────────────────────────────────────────────────

fn get_ci<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn scalar_text(value: &Value, what: &str) -> C2msResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(C2msError::parse(format!("{what} must be a scalar value"))),
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> C2msResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| C2msError::parse(format!("{what} must be a JSON object")))
}

fn decode_field(object: &Map<String, Value>) -> C2msResult<Field> {
    let name = get_ci(object, "NAME")
        .map(|v| scalar_text(v, "NAME"))
        .transpose()?
        .ok_or_else(|| C2msError::parse("FIELD object is missing NAME"))?;
    let field_type: FieldType = get_ci(object, "TYPE")
        .map(|v| scalar_text(v, "TYPE"))
        .transpose()?
        .ok_or_else(|| C2msError::parse(format!("FIELD \"{name}\" is missing TYPE")))?
        .parse()?;
    let bits = get_ci(object, "BITS").map(|v| scalar_text(v, "BITS")).transpose()?;

    let value = match bits {
        Some(bits) if field_type.is_float() => FieldValue::from_float_bits(field_type, &bits)?,
        _ => {
            let text = get_ci(object, "VALUE")
                .map(|v| scalar_text(v, "VALUE"))
                .transpose()?
                .unwrap_or_default();
            FieldValue::parse_as(field_type, &text)?
        }
    };
    Field::new(name, value)
}

fn parse_document(text: &str) -> C2msResult<Value> {
    serde_json::from_str(text).map_err(|e| C2msError::parse(format!("invalid JSON: {e}")))
}

/// Parse a single field object.
pub fn field_from_json(text: &str) -> C2msResult<Field> {
    let doc = parse_document(text)?;
    decode_field(as_object(&doc, "FIELD")?)
}

/// Parse a `{"MESSAGE":{...}}` document.
pub fn message_from_json(text: &str) -> C2msResult<Message> {
    let doc = parse_document(text)?;
    let root = as_object(&doc, "document")?;
    let body = get_ci(root, "MESSAGE")
        .ok_or_else(|| C2msError::parse("document has no MESSAGE object"))?;
    let body = as_object(body, "MESSAGE")?;

    let kind = match get_ci(body, "KIND") {
        Some(kind) => scalar_text(kind, "KIND")?.parse::<MessageKind>()?,
        None => MessageKind::Publish,
    };
    let mut msg = Message::new(kind);

    if let Some(subject) = get_ci(body, "SUBJECT") {
        let subject = scalar_text(subject, "SUBJECT")?;
        if !subject.is_empty() {
            msg.set_subject(subject)?;
        }
    }

    match get_ci(body, "FIELD") {
        None => {}
        Some(Value::Array(items)) => {
            for item in items {
                msg.add_field(decode_field(as_object(item, "FIELD")?)?);
            }
        }
        Some(single) => {
            msg.add_field(decode_field(as_object(single, "FIELD")?)?);
        }
    }
    Ok(msg)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_to_json_layout() {
        let mut msg = Message::new(MessageKind::Publish);
        msg.set_subject("A.B").unwrap();
        msg.set_field("CONTENT-VERSION", 2019f32).unwrap();
        msg.set_field("COUNTER", 1u16).unwrap();

        assert_eq!(
            message_to_json(&msg).unwrap(),
            r#"{"MESSAGE":{"SUBJECT":"A.B","KIND":"PUBLISH","FIELD":[{"NAME":"CONTENT-VERSION","TYPE":"F32","BITS":"44FC6000","VALUE":"2019"},{"NAME":"COUNTER","TYPE":"U16","VALUE":"1"}]}}"#
        );
    }

    #[test]
    fn test_empty_message_omits_field_key() {
        let msg = Message::new(MessageKind::Reply);
        assert_eq!(
            message_to_json(&msg).unwrap(),
            r#"{"MESSAGE":{"SUBJECT":"","KIND":"REPLY"}}"#
        );
    }

    #[test]
    fn test_case_insensitive_input() {
        let input = r#"{"message":{"subject":"X.Y","kind":"request","field":[
            {"name":"COUNT","type":"i32","value":-5},
            {"Name":"READY","Type":"Bool","Value":true},
            {"NAME":"RATE","TYPE":"f32","bits":"44fc6000","VALUE":"0"}
        ]}}"#;
        let msg = message_from_json(input).unwrap();
        assert_eq!(msg.kind(), MessageKind::Request);
        assert_eq!(msg.subject(), Some("X.Y"));
        assert_eq!(msg.i32_value("COUNT").unwrap(), -5);
        assert!(msg.boolean_value("READY").unwrap());
        assert_eq!(msg.get_field("RATE").unwrap().value(), &FieldValue::F32(2019.0));
    }

    #[test]
    fn test_field_round_trip_each_type() {
        let values: Vec<FieldValue> = vec![
            FieldValue::Char('z'),
            FieldValue::Bool(false),
            FieldValue::I8(i8::MAX),
            FieldValue::I16(-2),
            FieldValue::I32(123_456),
            FieldValue::I64(-9_000_000_000),
            FieldValue::U8(0),
            FieldValue::U16(1),
            FieldValue::U32(4_000_000_000),
            FieldValue::U64(u64::MAX),
            FieldValue::F32(-1234.56),
            FieldValue::F64(6.02e23),
            FieldValue::String("line\nbreak \"quoted\"".to_string()),
            FieldValue::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        ];
        for value in values {
            let field = Field::new("Y", value).unwrap();
            let json = field_to_json(&field).unwrap();
            let back = field_from_json(&json).unwrap();
            assert_eq!(back, field, "round trip failed for {json}");
        }
    }

    #[test]
    fn test_message_round_trip() {
        let mut msg = Message::new(MessageKind::Publish);
        msg.set_subject("C2MS.A.B").unwrap();
        msg.set_field("BLOB", vec![1u8, 2, 3]).unwrap();
        msg.set_field("NAME", "value").unwrap();
        let back = message_from_json(&message_to_json(&msg).unwrap()).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(message_from_json("{"), Err(C2msError::Parse { .. })));
        assert!(matches!(message_from_json("{\"OTHER\":{}}"), Err(C2msError::Parse { .. })));
        assert!(matches!(
            field_from_json(r#"{"NAME":"X","TYPE":"WHAT","VALUE":"1"}"#),
            Err(C2msError::Parse { .. })
        ));
        assert!(matches!(
            field_from_json(r#"{"NAME":"X","TYPE":"U8","VALUE":"-1"}"#),
            Err(C2msError::Conversion { .. })
        ));
    }
}
