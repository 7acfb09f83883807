//! # c2ms-codec
//!
//! Canonical XML and compact JSON renderings of fields and messages.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use c2ms_codec::{message_from_data, xml};
//!
//! let msg = message_from_data(text)?;        // XML or JSON, detected
//! println!("{}", xml::message_to_xml(&msg));
//! ```
//!
//! Output is byte-for-byte stable: upper-case names, fields sorted by name,
//! `BITS` on every float.  Input tag, attribute, key and type names are
//! matched case-insensitively.

pub mod json;
pub mod xml;

use c2ms_contracts::{C2msError, C2msResult, Message};

/// Text encoding of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Xml,
    Json,
}

impl DataFormat {
    /// Detect the format from the first non-whitespace character.
    pub fn detect(text: &str) -> Option<DataFormat> {
        match text.trim_start().chars().next() {
            Some('<') => Some(DataFormat::Xml),
            Some('{') => Some(DataFormat::Json),
            _ => None,
        }
    }
}

/// Parse an XML or JSON message, detecting which from the input.
pub fn message_from_data(text: &str) -> C2msResult<Message> {
    match DataFormat::detect(text) {
        Some(DataFormat::Xml) => xml::message_from_xml(text),
        Some(DataFormat::Json) => json::message_from_json(text),
        None => Err(C2msError::parse("Unable to determine data type (XML or JSON)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c2ms_contracts::MessageKind;

    #[test]
    fn detect_format() {
        assert_eq!(DataFormat::detect("  <MESSAGE/>"), Some(DataFormat::Xml));
        assert_eq!(DataFormat::detect("\n{\"MESSAGE\":{}}"), Some(DataFormat::Json));
        assert_eq!(DataFormat::detect("MESSAGE"), None);
        assert_eq!(DataFormat::detect(""), None);
    }

    /// Both encodings of the same message parse to the same value.
    #[test]
    fn xml_and_json_agree() {
        let mut msg = Message::new(MessageKind::Publish);
        msg.set_subject("C2MS.X").unwrap();
        msg.set_field("COUNTER", 9u16).unwrap();
        msg.set_field("PI", 3.5f64).unwrap();

        let from_xml = message_from_data(&xml::message_to_xml(&msg)).unwrap();
        let from_json = message_from_data(&json::message_to_json(&msg).unwrap()).unwrap();
        assert_eq!(from_xml, from_json);
        assert_eq!(from_xml, msg);
        assert!(message_from_data("plain text").is_err());
    }
}
