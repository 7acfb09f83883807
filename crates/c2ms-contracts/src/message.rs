//! The `Message` value and its field map.
//!
//! Fields are keyed by unique name and kept sorted, which is the order the
//! canonical XML and JSON renderings use.  A message created from a template
//! remembers the schema id, version and level it was bound to.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{C2msError, C2msResult};
use crate::field::{check_field_name, Field, FieldValue};
use crate::template::{MessageTemplate, SchemaLevel, SubjectElementKind, FILL};

/// Message kind on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    Publish,
    Request,
    Reply,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Publish => "PUBLISH",
            MessageKind::Request => "REQUEST",
            MessageKind::Reply => "REPLY",
        }
    }

    /// Kind implied by the first segment of a schema id (`MSG`, `REQ`, `RESP`).
    pub fn from_schema_id(schema_id: &str) -> C2msResult<Self> {
        let first = schema_id.split('.').next().unwrap_or_default();
        match first {
            "MSG" => Ok(MessageKind::Publish),
            "REQ" => Ok(MessageKind::Request),
            "RESP" => Ok(MessageKind::Reply),
            _ => Err(C2msError::configuration(format!(
                "unable to deduce message kind from schema id \"{schema_id}\""
            ))),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = C2msError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PUBLISH" => Ok(MessageKind::Publish),
            "REQUEST" => Ok(MessageKind::Request),
            "REPLY" => Ok(MessageKind::Reply),
            _ => Err(C2msError::parse(format!("unknown message kind '{s}'"))),
        }
    }
}

/// The specification binding recorded when a message is built from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaBinding {
    pub schema_id: String,
    pub version: u32,
    pub schema_level: SchemaLevel,
}

/// A bus message: kind, optional explicit subject and named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    kind: MessageKind,
    subject: Option<String>,
    fields: BTreeMap<String, Field>,
    binding: Option<SchemaBinding>,
}

impl Message {
    /// An ad hoc message with no bound schema.
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            subject: None,
            fields: BTreeMap::new(),
            binding: None,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: MessageKind) {
        self.kind = kind;
    }

    /// The explicitly set subject, if any.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> C2msResult<()> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(C2msError::invalid_argument(
                "Subject cannot be NULL, nor an empty string",
            ));
        }
        self.subject = Some(subject);
        Ok(())
    }

    pub fn clear_subject(&mut self) {
        self.subject = None;
    }

    pub fn binding(&self) -> Option<&SchemaBinding> {
        self.binding.as_ref()
    }

    pub fn schema_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.schema_id.as_str())
    }

    pub fn bind(&mut self, binding: SchemaBinding) {
        self.binding = Some(binding);
    }

    // ── Fields ────────────────────────────────────────────────────────────────

    /// Insert `field`, replacing any field with the same name.
    ///
    /// Returns `true` when an existing field was replaced.
    pub fn add_field(&mut self, field: Field) -> bool {
        self.fields.insert(field.name().to_string(), field).is_some()
    }

    /// Convenience for `add_field(Field::new(name, value)?)`.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> C2msResult<bool> {
        Ok(self.add_field(Field::new(name, value)?))
    }

    /// Remove the named field.  Returns `true` when it existed.
    pub fn clear_field(&mut self, name: &str) -> C2msResult<bool> {
        check_field_name(name)?;
        Ok(self.fields.remove(name).is_some())
    }

    pub fn clear_fields(&mut self) {
        self.fields.clear();
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Look up a field.  An empty name is rejected before the lookup; a name
    /// with no field behind it is `FieldNotFound`.
    pub fn get_field(&self, name: &str) -> C2msResult<&Field> {
        check_field_name(name)?;
        self.fields
            .get(name)
            .ok_or_else(|| C2msError::FieldNotFound { name: name.to_string() })
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// All fields, sorted by name.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn string_value(&self, name: &str) -> C2msResult<String> {
        Ok(self.get_field(name)?.string_value())
    }

    pub fn boolean_value(&self, name: &str) -> C2msResult<bool> {
        self.get_field(name)?.boolean_value()
    }

    pub fn i16_value(&self, name: &str) -> C2msResult<i16> {
        self.get_field(name)?.i16_value()
    }

    pub fn i32_value(&self, name: &str) -> C2msResult<i32> {
        self.get_field(name)?.i32_value()
    }

    pub fn i64_value(&self, name: &str) -> C2msResult<i64> {
        self.get_field(name)?.i64_value()
    }

    pub fn u16_value(&self, name: &str) -> C2msResult<u16> {
        self.get_field(name)?.u16_value()
    }

    pub fn u32_value(&self, name: &str) -> C2msResult<u32> {
        self.get_field(name)?.u32_value()
    }

    pub fn u64_value(&self, name: &str) -> C2msResult<u64> {
        self.get_field(name)?.u64_value()
    }

    pub fn f64_value(&self, name: &str) -> C2msResult<f64> {
        self.get_field(name)?.f64_value()
    }
}

// ── Subject building ──────────────────────────────────────────────────────────

impl MessageTemplate {
    /// Build the subject for `msg` from this template's pattern.
    ///
    /// Field-bound elements take the upper-cased value of the first present
    /// field; unset elements become `FILL`, and trailing optional `FILL`
    /// elements are dropped.
    pub fn build_subject(&self, msg: &Message) -> String {
        let mut tokens: Vec<(String, bool)> = self
            .subject_elements()
            .iter()
            .map(|element| {
                let token = match &element.kind {
                    SubjectElementKind::Literal(text) => Some(text.clone()),
                    SubjectElementKind::Field(names) => names
                        .iter()
                        .find_map(|n| msg.fields.get(n))
                        .map(|f| f.string_value().to_ascii_uppercase()),
                    SubjectElementKind::Variable(_) => None,
                };
                match token {
                    Some(t) => (t, false),
                    None => (FILL.to_string(), element.optional),
                }
            })
            .collect();

        while tokens.last().is_some_and(|(_, droppable)| *droppable) {
            tokens.pop();
        }

        tokens.into_iter().map(|(t, _)| t).collect::<Vec<_>>().join(".")
    }
}
