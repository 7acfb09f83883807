//! # c2ms-core
//!
//! Validator chain, field cursors and the message factory.
//!
//! The factory is written against two traits from [`traits`]:
//! `TemplateCatalog` (implemented by the specification registry) and
//! `MessageValidator` (implemented by the built-in compliance checker and by
//! any custom validator).  Wiring the concrete pieces together is left to the
//! caller, or to `c2ms_verify::message_factory`.

pub mod chain;
pub mod cursor;
pub mod factory;
pub mod traits;

pub use chain::{FnValidator, ValidatorChain};
pub use cursor::{FieldCursor, FieldSelector};
pub use factory::{Direction, MessageFactory, ValidationToggles};
pub use traits::{MessageValidator, TemplateCatalog};
