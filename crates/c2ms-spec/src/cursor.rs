use c2ms_contracts::{C2msError, C2msResult};

/// Restartable cursor over a registry's schema ids, in sorted order.
///
/// The cursor owns a copy of the id list taken at construction, so ids learned
/// afterwards do not appear until a new cursor is made.
#[derive(Debug, Clone)]
pub struct SchemaIdCursor {
    ids: Vec<String>,
    position: usize,
}

impl SchemaIdCursor {
    pub fn new(mut ids: Vec<String>) -> Self {
        ids.sort();
        Self { ids, position: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.position < self.ids.len()
    }

    pub fn next(&mut self) -> C2msResult<&str> {
        let id = self.ids.get(self.position).ok_or_else(|| C2msError::IteratorExhausted {
            reason: "next() has reached end of list".to_string(),
        })?;
        self.position += 1;
        Ok(id.as_str())
    }

    /// Rewind to the first id.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
