//! Built-in compliance checker.
//!
//! `ComplianceValidator` implements the `MessageValidator` trait from
//! `c2ms-core`.  A message is checked in three steps:
//!
//! 1. **Resolve**: the schema id bound at creation, else one deduced from the
//!    header fields or subject.  An unknown id fails, or is learned when the
//!    registry has the learn policy enabled.
//! 2. **Fields**: every specification of the template, in template order.
//!    REQUIRED fields must be present; present fields must have an accepted
//!    type, an allowed value if constrained, and content matching their
//!    pattern.  An indexed group is checked member by member, `<element>.1.`
//!    through `<element>.<NUM-OF-name>.`, and fields under its stem that no
//!    member declares are rejected.
//! 3. **Subject**: the explicit subject, or the one built from the template,
//!    against the template's subject pattern.
//!
//! The first violation is returned and nothing after it is checked.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use c2ms_contracts::{
    C2msError, Field, FieldMode, FieldSpecification, Message, MessageTemplate, Status, StatusClass,
    StatusCode, SubjectElementKind, FILL,
};
use c2ms_core::MessageValidator;
use c2ms_spec::SpecificationRegistry;

/// Checks messages against the templates of one registry.
#[derive(Debug, Clone)]
pub struct ComplianceValidator {
    registry: Arc<SpecificationRegistry>,
}

fn field_failure(subject: &str, code: StatusCode, detail: String) -> Status {
    Status::error(
        StatusClass::MsgError,
        code,
        format!("{subject}: Message Validation Failed.\n   {detail}"),
    )
}

fn subject_failure(subject: &str, detail: String) -> Status {
    Status::error(
        StatusClass::MsgError,
        StatusCode::InvalidSubjectName,
        format!("{subject}: Invalid Message Subject: {detail}"),
    )
}

fn is_subject_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

impl ComplianceValidator {
    pub fn new(registry: Arc<SpecificationRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SpecificationRegistry> {
        &self.registry
    }

    /// Resolve the template for `msg`, learning it if the registry allows.
    fn resolve(&self, msg: &Message) -> Result<Arc<MessageTemplate>, Status> {
        let schema_id = msg
            .schema_id()
            .map(str::to_string)
            .or_else(|| self.registry.deduce_schema_id(msg))
            .ok_or_else(|| {
                Status::error(
                    StatusClass::MsgError,
                    StatusCode::TemplateIdDoesNotExist,
                    format!(
                        "No template available; unable to validate message [{}]",
                        msg.subject().unwrap_or_default()
                    ),
                )
            })?;

        match self.registry.find_template(&schema_id) {
            Ok(template) => Ok(template),
            Err(C2msError::UnknownSchema { .. }) if self.registry.learns() => self
                .registry
                .learn_template(&schema_id, msg)
                .map_err(|e| Status::from(&e)),
            Err(e) => Err(Status::from(&e)),
        }
    }

    // ── Field checks ──────────────────────────────────────────────────────────

    /// Check `specs` in order against the fields named `<prefix><name>`.
    /// Every field name a spec covers is added to `seen`.
    fn check_fields(
        specs: &[FieldSpecification],
        msg: &Message,
        subject: &str,
        prefix: &str,
        seen: &mut BTreeSet<String>,
    ) -> Option<Status> {
        for spec in specs {
            if spec.is_group() {
                if let Some(status) = Self::check_group(spec, specs, msg, subject, prefix, seen) {
                    return Some(status);
                }
                continue;
            }
            if spec.mode == FieldMode::Control {
                continue;
            }
            let name = format!("{prefix}{}", spec.name);
            let status = Self::check_field(spec, &name, msg, subject);
            seen.insert(name);
            if status.is_some() {
                return status;
            }
        }
        None
    }

    /// Check an indexed group.  `siblings` are the specs declared alongside
    /// it, one of which may be its size field.
    fn check_group(
        group: &FieldSpecification,
        siblings: &[FieldSpecification],
        msg: &Message,
        subject: &str,
        prefix: &str,
        seen: &mut BTreeSet<String>,
    ) -> Option<Status> {
        let size_spec = group.size_field_name();
        let size_name = format!("{prefix}{size_spec}");
        let size_optional = siblings
            .iter()
            .any(|s| s.name == size_spec && s.mode == FieldMode::Optional);
        let size = match msg.get_field(&size_name) {
            Ok(field) => match field.u32_value() {
                Ok(size) => size,
                Err(_) => {
                    return Some(field_failure(
                        subject,
                        StatusCode::IncorrectFieldValue,
                        format!(
                            "{size_name} has incorrect value of {}, expected an array size",
                            field.string_value()
                        ),
                    ))
                }
            },
            // An absent optional size field means an empty group.
            Err(_) if size_optional => 0,
            Err(_) => {
                return Some(field_failure(
                    subject,
                    StatusCode::MessageFailedValidation,
                    format!(
                        "Message contains array of objects whose size is undefined: {size_name} cannot be found."
                    ),
                ))
            }
        };

        let stem = format!("{prefix}{}.", group.element_name());
        let mut members = BTreeSet::new();
        for index in 1..=size {
            let member = format!("{stem}{index}.");
            if let Some(status) = Self::check_fields(&group.children, msg, subject, &member, &mut members) {
                return Some(status);
            }
        }

        let stray = msg
            .fields()
            .map(Field::name)
            .find(|name| name.starts_with(&stem) && !members.contains(*name));
        if let Some(name) = stray {
            return Some(field_failure(
                subject,
                StatusCode::NonAllowedField,
                format!("Message contains user-defined field {name}"),
            ));
        }
        seen.extend(members);
        None
    }

    /// Check the field `name`, which `spec` describes.
    fn check_field(spec: &FieldSpecification, name: &str, msg: &Message, subject: &str) -> Option<Status> {
        let Ok(field) = msg.get_field(name) else {
            return (spec.mode == FieldMode::Required).then(|| {
                field_failure(
                    subject,
                    StatusCode::MissingRequiredField,
                    format!("{name} is a required field, but is missing from message"),
                )
            });
        };

        if !spec.field_type.accepts(field.field_type()) {
            return Some(field_failure(
                subject,
                StatusCode::IncorrectFieldType,
                format!(
                    "{name} has incorrect field type of {}.  Valid type(s): {}",
                    field.field_type(),
                    spec.field_type
                ),
            ));
        }

        if !spec.values.is_empty() && !spec.values.iter().any(|v| v.allows(field)) {
            let acceptable: Vec<String> = spec.values.iter().map(ToString::to_string).collect();
            return Some(field_failure(
                subject,
                StatusCode::IncorrectFieldValue,
                format!(
                    "{name} has incorrect value of {}, acceptable values: {}",
                    field.string_value(),
                    acceptable.join(", ")
                ),
            ));
        }

        if let Some(pattern) = spec.pattern {
            let value = field.string_value();
            if !pattern.matches(&value) {
                return Some(field_failure(
                    subject,
                    StatusCode::InvalidFieldValue,
                    format!("{name} has illegal {} value of '{value}'", pattern.label()),
                ));
            }
        }
        None
    }

    // ── Subject checks ────────────────────────────────────────────────────────

    /// Check `subject` against the template pattern.  Returns the detail text
    /// of the first problem.
    fn check_subject(template: &MessageTemplate, msg: &Message, subject: &str) -> Option<String> {
        let elements = template.subject_elements();
        if elements.is_empty() {
            return None;
        }
        if subject.contains("..") {
            return Some("Subject cannot contain empty elements".to_string());
        }

        let tokens: Vec<&str> = subject.split('.').collect();
        for (index, element) in elements.iter().enumerate() {
            let Some(token) = tokens.get(index).copied() else {
                if element.optional {
                    continue;
                }
                return Some(format!("Missing required subject element \"{}\"", element.name));
            };

            if token.is_empty() {
                return Some(format!("Subject element \"{}\" is empty", element.name));
            }
            if !token.chars().all(is_subject_char) {
                return Some(format!(
                    "Subject element \"{}\" contains invalid characters: \"{token}\"",
                    element.name
                ));
            }
            if token == FILL && element.optional {
                continue;
            }

            match &element.kind {
                SubjectElementKind::Literal(text) if token != text.as_str() => {
                    return Some(format!(
                        "Subject element \"{}\" must be \"{text}\", found \"{token}\"",
                        element.name
                    ));
                }
                // An absent bound field is reported by the field checks.
                SubjectElementKind::Field(names) => {
                    if let Some(field) = names.iter().find_map(|n| msg.get_field(n).ok()) {
                        let value = field.string_value();
                        if token != value && token != value.to_ascii_uppercase() {
                            return Some(format!(
                                "Subject element \"{}\" value \"{token}\" does not match field {} value \"{value}\"",
                                element.name,
                                field.name()
                            ));
                        }
                    }
                }
                SubjectElementKind::Variable(values) if !values.is_empty() => {
                    if !values.iter().any(|v| v.as_str() == token) {
                        return Some(format!(
                            "Subject element \"{}\" value \"{token}\" is not one of: {}",
                            element.name,
                            values.join(", ")
                        ));
                    }
                }
                _ => {}
            }
        }

        tokens.get(elements.len()).map(|extra| {
            format!("User-defined subject element value \"{extra}\" is not allowed")
        })
    }
}

impl MessageValidator for ComplianceValidator {
    fn validate(&self, msg: &Message) -> Status {
        let template = match self.resolve(msg) {
            Ok(template) => template,
            Err(status) => {
                debug!(reason = %status.reason, "message has no usable template");
                return status;
            }
        };

        let subject = match msg.subject() {
            Some(subject) => subject.to_string(),
            None => template.build_subject(msg),
        };

        let mut seen = BTreeSet::new();
        if let Some(status) = Self::check_fields(template.field_specs(), msg, &subject, "", &mut seen) {
            debug!(
                schema_id = %template.schema_id(),
                code = ?status.code,
                reason = %status.reason,
                "field check failed"
            );
            return status;
        }

        if let Some(detail) = Self::check_subject(&template, msg, &subject) {
            debug!(schema_id = %template.schema_id(), %subject, %detail, "subject check failed");
            return subject_failure(&subject, detail);
        }

        Status::ok()
    }
}
