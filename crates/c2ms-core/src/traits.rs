//! Trait seams of the compliance engine.
//!
//! - `MessageValidator`: one check over a message, producing a `Status`.
//!   Custom validators and the built-in compliance checker both implement it.
//! - `TemplateCatalog`: read access to a loaded specification.
//!
//! `MessageFactory` is written against these traits only, so the registry and
//! the built-in checker can live in their own crates.

use std::sync::Arc;

use c2ms_contracts::{C2msResult, Message, MessageTemplate, SchemaLevel, Status};

/// A check over a message.
///
/// Implementations may be called concurrently from many threads.  Any state a
/// validator keeps is its own to protect; the chain holds no lock around it.
pub trait MessageValidator: Send + Sync {
    /// Return `Status::ok()` if the message passes, or the violation found.
    fn validate(&self, msg: &Message) -> Status;
}

/// Read access to a loaded specification.
pub trait TemplateCatalog: Send + Sync {
    /// Specification version, e.g. `201900`.
    fn version(&self) -> u32;

    fn schema_level(&self) -> SchemaLevel;

    /// Resolve a schema id (full id, alias or a more specific id) to its
    /// template.  Unknown ids are `C2msError::UnknownSchema`.
    fn find_template(&self, schema_id: &str) -> C2msResult<Arc<MessageTemplate>>;

    /// Header field names for a schema level name.  `None`, `""` and
    /// `"DEFAULT"` all select the active level's header set.
    fn header_field_names(&self, key: Option<&str>) -> C2msResult<Vec<String>>;

    /// Derive a schema id from a message's header fields or subject.
    fn deduce_schema_id(&self, msg: &Message) -> Option<String>;
}
