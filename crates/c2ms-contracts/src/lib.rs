//! # c2ms-contracts
//!
//! Shared types for the C2MS compliance engine: field values and their
//! coercions, messages, templates, status values and the error taxonomy.
//!
//! All crates in the workspace import from here.  Apart from value coercion
//! and subject building, no engine logic lives in this crate.

pub mod convert;
pub mod error;
pub mod field;
pub mod message;
pub mod status;
pub mod template;

pub use error::{C2msError, C2msResult};
pub use field::{Field, FieldType, FieldValue};
pub use message::{Message, MessageKind, SchemaBinding};
pub use status::{Status, StatusClass, StatusCode};
pub use template::{
    ContentPattern, FieldMode, FieldSpecification, MessageTemplate, SchemaLevel, SubjectElement,
    SubjectElementKind, TypeSpec, ValueConstraint, FILL,
};
