//! Canonical XML rendering.
//!
//! ```text
//! <MESSAGE SUBJECT="C2MS.DOM1.DOM2.MSSN.CNST.SAT.MSG.HB.COMP" KIND="PUBLISH">
//!     <FIELD NAME="CONTENT-VERSION" TYPE="F32" BITS="44FC6000">2019</FIELD>
//!     <FIELD NAME="COUNTER" TYPE="U16">1</FIELD>
//! </MESSAGE>
//! ```
//!
//! Output always uses upper-case tags, attribute names and type names, with
//! fields sorted by name and indented by one tab.  Input is matched
//! case-insensitively.  For F32/F64 the `BITS` attribute is authoritative.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::escape::escape;
use quick_xml::Reader;
use tracing::debug;

use c2ms_contracts::{C2msError, C2msResult, Field, FieldType, FieldValue, Message, MessageKind};

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Value text as it appears between `<FIELD>` tags.
fn value_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(true) => "TRUE".to_string(),
        FieldValue::Bool(false) => "FALSE".to_string(),
        other => other.to_text(),
    }
}

pub fn field_to_xml(field: &Field) -> String {
    let mut out = format!(
        "<FIELD NAME=\"{}\" TYPE=\"{}\"",
        escape(field.name()),
        field.field_type()
    );
    if let Some(bits) = field.value().float_bits_hex() {
        out.push_str(&format!(" BITS=\"{bits}\""));
    }
    out.push('>');
    out.push_str(&escape(value_text(field.value()).as_str()));
    out.push_str("</FIELD>");
    out
}

/// Render `msg` using its explicit subject, or an empty subject if unset.
pub fn message_to_xml(msg: &Message) -> String {
    message_to_xml_as(msg, msg.subject().unwrap_or_default())
}

/// Render `msg` under the given subject.
pub fn message_to_xml_as(msg: &Message, subject: &str) -> String {
    let open = format!(
        "<MESSAGE SUBJECT=\"{}\" KIND=\"{}\"",
        escape(subject),
        msg.kind()
    );
    if msg.field_count() == 0 {
        return format!("{open}/>");
    }

    let mut out = format!("{open}>\n");
    for field in msg.fields() {
        out.push('\t');
        out.push_str(&field_to_xml(field));
        out.push('\n');
    }
    out.push_str("</MESSAGE>");
    out
}

// ── Parsing ───────────────────────────────────────────────────────────────────

fn xml_error(err: impl std::fmt::Display) -> C2msError {
    C2msError::parse(format!("invalid XML: {err}"))
}

/// Attributes with upper-cased names.
fn attributes(start: &BytesStart<'_>) -> C2msResult<Vec<(String, String)>> {
    start
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_uppercase();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            Ok((key, value))
        })
        .collect()
}

fn attribute<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn tag_is(start_name: &[u8], tag: &str) -> bool {
    start_name.eq_ignore_ascii_case(tag.as_bytes())
}

/// A `<FIELD>` whose closing tag has not been seen yet.
struct PendingField {
    name: String,
    field_type: FieldType,
    bits: Option<String>,
    text: String,
}

impl PendingField {
    fn open(attrs: &[(String, String)]) -> C2msResult<Self> {
        let name = attribute(attrs, "NAME")
            .ok_or_else(|| C2msError::parse("FIELD element is missing the NAME attribute"))?;
        let type_name = attribute(attrs, "TYPE")
            .ok_or_else(|| C2msError::parse(format!("FIELD \"{name}\" is missing the TYPE attribute")))?;
        Ok(Self {
            name: name.to_string(),
            field_type: type_name.parse()?,
            bits: attribute(attrs, "BITS").map(str::to_string),
            text: String::new(),
        })
    }

    fn finish(self) -> C2msResult<Field> {
        let value = match (&self.bits, self.field_type.is_float()) {
            (Some(bits), true) => FieldValue::from_float_bits(self.field_type, bits)?,
            _ => FieldValue::parse_as(self.field_type, &self.text)?,
        };
        Field::new(self.name, value)
    }
}

/// Streaming decoder shared by the field and message entry points.
#[derive(Default)]
struct Decoder {
    message: Option<Message>,
    pending: Option<PendingField>,
    fields: Vec<Field>,
}

impl Decoder {
    fn start(&mut self, start: &BytesStart<'_>, empty: bool) -> C2msResult<()> {
        let name = start.name();
        let attrs = attributes(start)?;

        if tag_is(name.as_ref(), "MESSAGE") {
            if self.message.is_some() {
                return Err(C2msError::parse("nested MESSAGE element"));
            }
            let kind = match attribute(&attrs, "KIND") {
                Some(kind) => kind.parse::<MessageKind>()?,
                None => MessageKind::Publish,
            };
            let mut msg = Message::new(kind);
            if let Some(subject) = attribute(&attrs, "SUBJECT").filter(|s| !s.is_empty()) {
                msg.set_subject(subject)?;
            }
            self.message = Some(msg);
            Ok(())
        } else if tag_is(name.as_ref(), "FIELD") {
            if self.pending.is_some() {
                return Err(C2msError::parse("nested FIELD element"));
            }
            let pending = PendingField::open(&attrs)?;
            if empty {
                self.fields.push(pending.finish()?);
            } else {
                self.pending = Some(pending);
            }
            Ok(())
        } else {
            Err(C2msError::parse(format!(
                "unexpected element <{}>",
                String::from_utf8_lossy(name.as_ref())
            )))
        }
    }

    fn text(&mut self, text: Cow<'_, str>) {
        if let Some(pending) = self.pending.as_mut() {
            pending.text.push_str(&text);
        }
    }

    fn end(&mut self, name: &[u8]) -> C2msResult<()> {
        if tag_is(name, "FIELD") {
            let pending = self
                .pending
                .take()
                .ok_or_else(|| C2msError::parse("unbalanced </FIELD>"))?;
            self.fields.push(pending.finish()?);
        }
        Ok(())
    }

    fn run(text: &str) -> C2msResult<Self> {
        let mut reader = Reader::from_str(text);
        let mut decoder = Decoder::default();
        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(e) => decoder.start(&e, false)?,
                Event::Empty(e) => decoder.start(&e, true)?,
                Event::Text(t) => decoder.text(t.unescape().map_err(xml_error)?),
                Event::CData(c) => {
                    let bytes = c.into_inner();
                    decoder.text(String::from_utf8_lossy(&bytes));
                }
                Event::End(e) => decoder.end(e.name().as_ref())?,
                Event::Eof => break,
                _ => {}
            }
        }
        if decoder.pending.is_some() {
            return Err(C2msError::parse("unterminated FIELD element"));
        }
        Ok(decoder)
    }
}

/// Parse a single `<FIELD>` element.
pub fn field_from_xml(text: &str) -> C2msResult<Field> {
    let mut decoder = Decoder::run(text)?;
    if decoder.message.is_some() || decoder.fields.len() != 1 {
        return Err(C2msError::parse("expected exactly one FIELD element"));
    }
    decoder
        .fields
        .pop()
        .ok_or_else(|| C2msError::parse("expected exactly one FIELD element"))
}

/// Parse a `<MESSAGE>` document.
pub fn message_from_xml(text: &str) -> C2msResult<Message> {
    let decoder = Decoder::run(text)?;
    let mut msg = decoder
        .message
        .ok_or_else(|| C2msError::parse("document has no MESSAGE element"))?;
    for field in decoder.fields {
        if msg.add_field(field) {
            debug!("duplicate FIELD in XML input; last occurrence kept");
        }
    }
    Ok(msg)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
