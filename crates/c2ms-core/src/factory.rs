//! Message factory: template-driven creation and compliance checks.
//!
//! The factory is what the transport layer talks to.  It builds messages from
//! templates (`create_message`) and decides compliance (`is_compliant`) by
//! running its own validator chain, an optional caller-scoped chain, and then
//! the built-in checker.
//!
//! ```rust,ignore
//! let mut factory = MessageFactory::new(registry, Arc::new(ComplianceValidator::new(registry)));
//! factory.set_standard_fields(standard_fields);
//!
//! let msg = factory.create_message("HB")?;
//! let status = factory.is_compliant(&msg);
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use c2ms_codec::{json, xml};
use c2ms_contracts::{
    C2msError, C2msResult, Field, Message, MessageKind, SchemaBinding, Status,
};

use crate::chain::ValidatorChain;
use crate::cursor::{FieldCursor, FieldSelector};
use crate::traits::{MessageValidator, TemplateCatalog};

/// Whether validation wraps a send and/or a receive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationToggles {
    pub validate_publish: bool,
    pub validate_receive: bool,
}

/// Direction of a message relative to the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Publish,
    Receive,
}

/// Builds and checks messages against one loaded specification.
pub struct MessageFactory {
    catalog: Arc<dyn TemplateCatalog>,
    compliance: Arc<dyn MessageValidator>,
    validators: ValidatorChain,
    standard_fields: Vec<Field>,
    toggles: ValidationToggles,
}

impl MessageFactory {
    pub fn new(catalog: Arc<dyn TemplateCatalog>, compliance: Arc<dyn MessageValidator>) -> Self {
        Self {
            catalog,
            compliance,
            validators: ValidatorChain::new(),
            standard_fields: Vec::new(),
            toggles: ValidationToggles::default(),
        }
    }

    pub fn with_toggles(mut self, toggles: ValidationToggles) -> Self {
        self.toggles = toggles;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn TemplateCatalog> {
        &self.catalog
    }

    pub fn toggles(&self) -> ValidationToggles {
        self.toggles
    }

    // ── Standard fields and validators ────────────────────────────────────────

    /// Fields stamped onto every message this factory creates.
    pub fn set_standard_fields(&mut self, fields: Vec<Field>) {
        self.standard_fields = fields;
    }

    pub fn clear_standard_fields(&mut self) {
        self.standard_fields.clear();
    }

    pub fn standard_fields(&self) -> &[Field] {
        &self.standard_fields
    }

    /// Add a factory-scope custom validator.
    pub fn register_validator(&mut self, validator: Arc<dyn MessageValidator>) {
        self.validators.register(validator);
    }

    pub fn register_validator_fn<F>(&mut self, f: F)
    where
        F: Fn(&Message) -> Status + Send + Sync + 'static,
    {
        self.validators.register_fn(f);
    }

    // ── Creation ──────────────────────────────────────────────────────────────

    /// Create a message from the template for `schema_id`.
    ///
    /// The message is bound to the template's schema id and the catalog's
    /// version and level, carries the standard fields, and holds every
    /// non-control template field that declares a default.
    pub fn create_message(&self, schema_id: &str) -> C2msResult<Message> {
        if schema_id.trim().is_empty() {
            return Err(C2msError::invalid_argument(
                "SchemaID cannot be NULL, nor be an empty string",
            ));
        }

        let template = self.catalog.find_template(schema_id)?;
        let mut msg = Message::new(MessageKind::from_schema_id(template.schema_id())?);
        msg.bind(SchemaBinding {
            schema_id: template.schema_id().to_string(),
            version: self.catalog.version(),
            schema_level: self.catalog.schema_level(),
        });

        for field in &self.standard_fields {
            msg.add_field(field.clone());
        }
        for spec in template.field_specs() {
            if let Some(field) = spec.default_field()? {
                msg.add_field(field);
            }
        }

        debug!(
            schema_id = %template.schema_id(),
            fields = msg.field_count(),
            "message created from template"
        );
        Ok(msg)
    }

    /// Parse an XML or JSON message and bind it to its deduced schema, if the
    /// catalog knows one.
    pub fn from_data(&self, text: &str) -> C2msResult<Message> {
        let mut msg = c2ms_codec::message_from_data(text)?;
        if let Some(id) = self.catalog.deduce_schema_id(&msg) {
            match self.catalog.find_template(&id) {
                Ok(template) => msg.bind(SchemaBinding {
                    schema_id: template.schema_id().to_string(),
                    version: self.catalog.version(),
                    schema_level: self.catalog.schema_level(),
                }),
                Err(e) => debug!(schema_id = %id, error = %e, "parsed message left unbound"),
            }
        }
        Ok(msg)
    }

    // ── Compliance ────────────────────────────────────────────────────────────

    /// Factory validators, then the built-in checker.
    pub fn is_compliant(&self, msg: &Message) -> Status {
        self.validators.validate_with(msg, self.compliance.as_ref())
    }

    /// Factory validators, then `scoped` (connection or message scope), then
    /// the built-in checker.
    pub fn is_compliant_with(&self, msg: &Message, scoped: &ValidatorChain) -> Status {
        let status = self.validators.validate(msg);
        if status.has_error() {
            return status;
        }
        scoped.validate_with(msg, self.compliance.as_ref())
    }

    /// Validate around a send or receive, if the matching toggle is on.
    pub fn check(&self, direction: Direction, msg: &Message) -> Status {
        let enabled = match direction {
            Direction::Publish => self.toggles.validate_publish,
            Direction::Receive => self.toggles.validate_receive,
        };
        if !enabled {
            return Status::ok();
        }
        let status = self.is_compliant(msg);
        if status.has_error() {
            warn!(?direction, reason = %status.reason, "message failed validation");
        }
        status
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// The explicit subject, or the one built from the message's template.
    pub fn subject_of(&self, msg: &Message) -> String {
        if let Some(subject) = msg.subject() {
            return subject.to_string();
        }
        msg.schema_id()
            .map(str::to_string)
            .or_else(|| self.catalog.deduce_schema_id(msg))
            .and_then(|id| self.catalog.find_template(&id).ok())
            .map(|template| template.build_subject(msg))
            .unwrap_or_default()
    }

    pub fn to_xml(&self, msg: &Message) -> String {
        xml::message_to_xml_as(msg, &self.subject_of(msg))
    }

    pub fn to_json(&self, msg: &Message) -> C2msResult<String> {
        json::message_to_json_as(msg, &self.subject_of(msg))
    }

    /// Cursor over `msg` partitioned by the active header set.
    pub fn field_cursor<'m>(
        &self,
        msg: &'m Message,
        selector: FieldSelector,
    ) -> C2msResult<FieldCursor<'m>> {
        let header = self.catalog.header_field_names(None)?;
        Ok(FieldCursor::new(msg, selector, &header))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
