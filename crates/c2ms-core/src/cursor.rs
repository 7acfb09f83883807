//! Restartable cursor over a message's fields.

use std::collections::HashSet;

use c2ms_contracts::{C2msError, C2msResult, Field, Message};

/// Which fields a `FieldCursor` visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelector {
    AllFields,
    /// Fields named in the specification's header set.
    HeaderFields,
    NonHeaderFields,
}

/// Walks a snapshot of a message's fields in name order.
///
/// `next` past the end is an error rather than `None`; `reset` rewinds.
#[derive(Debug, Clone)]
pub struct FieldCursor<'m> {
    fields: Vec<&'m Field>,
    position: usize,
}

impl<'m> FieldCursor<'m> {
    pub fn new(msg: &'m Message, selector: FieldSelector, header_names: &[String]) -> Self {
        let header: HashSet<&str> = header_names.iter().map(String::as_str).collect();
        let fields = msg
            .fields()
            .filter(|f| match selector {
                FieldSelector::AllFields => true,
                FieldSelector::HeaderFields => header.contains(f.name()),
                FieldSelector::NonHeaderFields => !header.contains(f.name()),
            })
            .collect();
        Self { fields, position: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.position < self.fields.len()
    }

    pub fn next(&mut self) -> C2msResult<&'m Field> {
        let field = self.fields.get(self.position).copied().ok_or_else(|| {
            C2msError::IteratorExhausted {
                reason: "No more fields to iterate over".to_string(),
            }
        })?;
        self.position += 1;
        Ok(field)
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Number of fields the cursor visits in one pass.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
