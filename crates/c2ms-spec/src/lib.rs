//! # c2ms-spec
//!
//! The layered, TOML-driven specification registry of the C2MS compliance
//! engine.
//!
//! ## Overview
//!
//! [`SpecificationRegistry`] loads every message template of one
//! (version, schema level) from a [`SchemaSource`], either the 2019.00
//! specification embedded in this crate or a directory tree on disk.  It
//! implements [`TemplateCatalog`](c2ms_core::TemplateCatalog), so it plugs
//! straight into `MessageFactory`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use c2ms_spec::{EngineConfig, SpecificationRegistry};
//!
//! let config = EngineConfig::from_toml_str("schema_level = 1")?;
//! let registry = SpecificationRegistry::from_config(&config)?;
//! let template = registry.find_template("HB")?;
//! ```
//!
//! ## Layering
//!
//! A registry at level L sees levels 0..=L.  Headers accumulate level by
//! level; for any other schema id the highest level that defines it wins.

pub mod config;
pub mod cursor;
pub mod document;
pub mod registry;
pub mod source;

pub use config::{EngineConfig, VersionSelector};
pub use cursor::SchemaIdCursor;
pub use registry::SpecificationRegistry;
pub use source::{DirectorySource, EmbeddedSource, SchemaSource, CURRENT_VERSION};

// ── Tests ─────────────────────────────────────────────────────────────────────
