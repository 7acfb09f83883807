//! # c2ms-verify
//!
//! The built-in compliance checker of the C2MS engine.
//!
//! This crate provides [`engine::ComplianceValidator`], which implements the
//! [`c2ms_core::MessageValidator`] trait against a
//! [`SpecificationRegistry`](c2ms_spec::SpecificationRegistry), and
//! [`message_factory`], which wires a registry, the checker and the
//! publish/receive toggles into a ready `MessageFactory`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use c2ms_spec::EngineConfig;
//! use c2ms_verify::message_factory;
//!
//! let factory = message_factory(&EngineConfig::default())?;
//! let msg = factory.create_message("HB")?;
//! let status = factory.is_compliant(&msg);
//! ```

pub mod engine;

use std::sync::Arc;

use tracing::info;

use c2ms_contracts::C2msResult;
use c2ms_core::MessageFactory;
use c2ms_spec::{EngineConfig, SpecificationRegistry};

pub use engine::ComplianceValidator;

/// Load the registry `config` describes and build a factory around it.
pub fn message_factory(config: &EngineConfig) -> C2msResult<MessageFactory> {
    config.validate()?;
    let registry = Arc::new(SpecificationRegistry::from_config(config)?);
    let compliance = Arc::new(ComplianceValidator::new(Arc::clone(&registry)));
    info!(
        version = config.version(),
        schema_level = config.schema_level,
        learn = registry.learns(),
        "message factory ready"
    );
    Ok(MessageFactory::new(registry, compliance).with_toggles(config.toggles()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use c2ms_contracts::{
        C2msResult, Field, Message, MessageKind, SchemaLevel, Status, StatusClass, StatusCode,
    };
    use c2ms_core::{Direction, MessageValidator};
    use c2ms_spec::{SchemaSource, CURRENT_VERSION};

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn standard_fields() -> Vec<Field> {
        [
            ("MISSION-ID", "MSSN"),
            ("CONSTELLATION-ID", "CNST"),
            ("SAT-ID-PHYSICAL", "SAT1"),
            ("SAT-ID-LOGICAL", "SAT-LOG"),
            ("FACILITY", "FACILITY"),
            ("DOMAIN1", "DOM1"),
            ("DOMAIN2", "DOM2"),
            ("COMPONENT", "GMPUB"),
        ]
        .into_iter()
        .map(|(name, value)| Field::new(name, value).unwrap())
        .collect()
    }

    fn config(level: u8) -> EngineConfig {
        EngineConfig {
            schema_level: level,
            ..EngineConfig::default()
        }
    }

    fn factory_at(level: u8) -> MessageFactory {
        let mut factory = message_factory(&config(level)).unwrap();
        factory.set_standard_fields(standard_fields());
        factory
    }

    fn heartbeat() -> (MessageFactory, Message) {
        let factory = factory_at(0);
        let msg = factory.create_message("HB").unwrap();
        (factory, msg)
    }

    const HB_SUBJECT: &str = "C2MS.DOM1.DOM2.MSSN.CNST.SAT1.MSG.HB.GMPUB";

    fn assert_subject_error(factory: &MessageFactory, msg: &mut Message, subject: &str, detail: &str) {
        msg.set_subject(subject).unwrap();
        let status = factory.is_compliant(msg);
        assert_eq!(status.code, StatusCode::InvalidSubjectName, "{subject}");
        assert_eq!(status.reason, format!("{subject}: Invalid Message Subject: {detail}"));
    }

    // ── Heartbeat scenario ────────────────────────────────────────────────────

    #[test]
    fn test_heartbeat_is_compliant_with_13_fields() {
        let (factory, msg) = heartbeat();
        assert_eq!(msg.field_count(), 13);
        assert_eq!(msg.kind(), MessageKind::Publish);
        assert_eq!(factory.subject_of(&msg), HB_SUBJECT);

        let status = factory.is_compliant(&msg);
        assert!(status.is_ok(), "{status}");
    }

    #[test]
    fn test_clearing_required_field_fails() {
        let (factory, mut msg) = heartbeat();
        assert!(msg.clear_field("DOMAIN1").unwrap());

        let status = factory.is_compliant(&msg);
        assert_eq!(status.classification, StatusClass::MsgError);
        assert_eq!(status.code, StatusCode::MissingRequiredField);
        assert_eq!(
            status.reason,
            "C2MS.FILL.DOM2.MSSN.CNST.SAT1.MSG.HB.GMPUB: Message Validation Failed.\n   \
             DOMAIN1 is a required field, but is missing from message"
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let (factory, mut msg) = heartbeat();
        assert_eq!(factory.is_compliant(&msg), factory.is_compliant(&msg));

        msg.clear_field("FACILITY").unwrap();
        let first = factory.is_compliant(&msg);
        assert!(first.has_error());
        assert_eq!(first, factory.is_compliant(&msg));
    }

    /// Several violations at once still yield one reason: the first field in
    /// template order, ahead of any subject problem.
    #[test]
    fn test_first_violation_wins() {
        let (factory, mut msg) = heartbeat();
        msg.clear_field("DOMAIN1").unwrap();
        msg.set_field("HEADER-VERSION", "2019").unwrap();
        msg.set_subject("C2MS.dom1..MSSN").unwrap();

        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::IncorrectFieldType);
        assert_eq!(
            status.reason,
            "C2MS.dom1..MSSN: Message Validation Failed.\n   \
             HEADER-VERSION has incorrect field type of STRING.  Valid type(s): F32"
        );
        assert_eq!(status.reason.matches('\n').count(), 1);

        msg.set_field("HEADER-VERSION", 2019.0f32).unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::MissingRequiredField);
        assert!(status.reason.ends_with("DOMAIN1 is a required field, but is missing from message"));
        assert!(!status.reason.contains("Invalid Message Subject"));
    }

    #[test]
    fn test_wrong_type_and_disallowed_value() {
        let (factory, mut msg) = heartbeat();
        msg.set_field("HEADER-VERSION", "2019").unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::IncorrectFieldType);
        assert!(status
            .reason
            .ends_with("HEADER-VERSION has incorrect field type of STRING.  Valid type(s): F32"));

        let (factory, mut msg) = heartbeat();
        msg.set_field("COMPONENT-STATUS", 9i16).unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::IncorrectFieldValue);
        assert!(status
            .reason
            .ends_with("COMPONENT-STATUS has incorrect value of 9, acceptable values: 0..4"));

        msg.set_field("COMPONENT-STATUS", 4i16).unwrap();
        assert!(factory.is_compliant(&msg).is_ok());
    }

    // ── Custom validators ─────────────────────────────────────────────────────

    /// Nominal on its first call, "Field is missing" on every call after.
    struct SecondCallFails {
        calls: AtomicUsize,
    }

    impl MessageValidator for SecondCallFails {
        fn validate(&self, _msg: &Message) -> Status {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Status::ok()
            } else {
                Status::custom("Field is missing", 0)
            }
        }
    }

    #[test]
    fn test_stateful_custom_validator() {
        let (mut factory, msg) = heartbeat();
        factory.register_validator(Arc::new(SecondCallFails { calls: AtomicUsize::new(0) }));

        assert!(factory.is_compliant(&msg).is_ok());
        for _ in 0..3 {
            let status = factory.is_compliant(&msg);
            assert!(status.has_error());
            assert_eq!(status.reason, "Field is missing");
        }
    }

    // ── Subject checks ────────────────────────────────────────────────────────

    #[test]
    fn test_explicit_subjects() {
        let (factory, mut msg) = heartbeat();

        for ok in [
            HB_SUBJECT,
            "C2MS.DOM1.DOM2.MSSN.FILL.FILL.MSG.HB.GMPUB",
            "C2MS.DOM1.DOM2.MSSN.CNST.SAT1.MSG.HB.GMPUB.ME2.ME3",
        ] {
            msg.set_subject(ok).unwrap();
            let status = factory.is_compliant(&msg);
            assert!(status.is_ok(), "{ok}: {status}");
        }

        assert_subject_error(
            &factory,
            &mut msg,
            "C2MS.DOM1.DOM2.MSSN.CNST.SAT1.MSG.HB.GMPUB.A.B.EXTRA",
            "User-defined subject element value \"EXTRA\" is not allowed",
        );
        assert_subject_error(
            &factory,
            &mut msg,
            "C2MS.DOM1..MSSN.CNST.SAT1.MSG.HB.GMPUB",
            "Subject cannot contain empty elements",
        );
        assert_subject_error(
            &factory,
            &mut msg,
            "C2MS.dom1.DOM2.MSSN.CNST.SAT1.MSG.HB.GMPUB",
            "Subject element \"DOMAIN1\" contains invalid characters: \"dom1\"",
        );
        assert_subject_error(
            &factory,
            &mut msg,
            "C2MS.DOM1.DOM2.MSSN.CNST.SAT1.MSG.HB",
            "Missing required subject element \"ME1\"",
        );
        assert_subject_error(
            &factory,
            &mut msg,
            "C2MS.DOM1.DOM2.MSSN.CNST.SAT1.MSG.HB.OTHER",
            "Subject element \"ME1\" value \"OTHER\" does not match field COMPONENT value \"GMPUB\"",
        );
    }

    #[test]
    fn test_lowercase_values_build_valid_subjects() {
        let (factory, mut msg) = heartbeat();
        msg.set_field("COMPONENT", "gmpub").unwrap();
        assert_eq!(factory.subject_of(&msg), HB_SUBJECT);
        assert!(factory.is_compliant(&msg).is_ok());
    }

    // ── Resolution ────────────────────────────────────────────────────────────

    #[test]
    fn test_unresolvable_message() {
        let factory = factory_at(0);
        let status = factory.is_compliant(&Message::new(MessageKind::Publish));
        assert_eq!(status.code, StatusCode::TemplateIdDoesNotExist);
        assert_eq!(status.reason, "No template available; unable to validate message []");
    }

    /// A message parsed from text carries no binding of its own until the
    /// factory deduces one; either way it validates the same.
    #[test]
    fn test_parsed_message_validates() {
        let (factory, msg) = heartbeat();
        for text in [factory.to_xml(&msg), factory.to_json(&msg).unwrap()] {
            let parsed = factory.from_data(&text).unwrap();
            assert_eq!(parsed.schema_id(), Some("MSG.HB"));
            assert!(factory.is_compliant(&parsed).is_ok());

            let unbound = unbound_copy(&parsed);
            assert!(factory.is_compliant(&unbound).is_ok());
        }
    }

    /// Rebuild `msg` field by field so it has no schema binding.
    fn unbound_copy(msg: &Message) -> Message {
        let mut copy = Message::new(msg.kind());
        for field in msg.fields() {
            copy.add_field(field.clone());
        }
        copy
    }

    fn custom_message() -> Message {
        let mut msg = Message::new(MessageKind::Publish);
        msg.set_field("MESSAGE-TYPE", "MSG").unwrap();
        msg.set_field("MESSAGE-SUBTYPE", "CUSTOM").unwrap();
        msg.set_field("VALUE", 42i32).unwrap();
        msg
    }

    #[test]
    fn test_strict_mode_rejects_unknown_schema() {
        let factory = factory_at(0);
        let status = factory.is_compliant(&custom_message());
        assert_eq!(status.classification, StatusClass::SpecificationError);
        assert_eq!(status.code, StatusCode::TemplateIdDoesNotExist);
        assert_eq!(
            status.reason,
            "SchemaID \"MSG.CUSTOM\" could not be found in list of available schema."
        );
    }

    #[test]
    fn test_learn_mode_registers_template() {
        let config = EngineConfig {
            learn_unknown_schemas: true,
            ..EngineConfig::default()
        };
        let factory = message_factory(&config).unwrap();
        assert!(factory.is_compliant(&custom_message()).is_ok());

        let learned = factory.catalog().find_template("MSG.CUSTOM").unwrap();
        assert_eq!(learned.field_specs().len(), 3);

        // The learned template now holds the message to its field set.
        let mut changed = custom_message();
        changed.set_field("VALUE", "forty-two").unwrap();
        assert_eq!(factory.is_compliant(&changed).code, StatusCode::IncorrectFieldType);
    }

    #[test]
    fn test_legacy_c2cx_id_is_deduced() {
        let factory = factory_at(0);
        let mut msg = Message::new(MessageKind::Publish);
        msg.set_field("MESSAGE-TYPE", "MSG").unwrap();
        msg.set_field("MESSAGE-SUBTYPE", "C2CX").unwrap();
        msg.set_field("C2CX-SUBTYPE", "HB").unwrap();

        let status = factory.is_compliant(&msg);
        assert_eq!(
            status.reason,
            "SchemaID \"MSG.C2CX.HB\" could not be found in list of available schema."
        );
    }

    // ── Other templates and toggles ───────────────────────────────────────────

    #[test]
    fn test_level_one_pipeline_message() {
        let factory = factory_at(1);
        let mut msg = factory.create_message("PIPE").unwrap();
        assert!(factory.is_compliant(&msg).has_error());

        msg.set_field("PIPELINE-NAME", "INGEST").unwrap();
        msg.set_field("STAGE", 2u16).unwrap();
        assert_eq!(
            factory.subject_of(&msg),
            "C2MS.DOM1.DOM2.MSSN.CNST.SAT1.MSG.PIPE.GMPUB.INGEST"
        );
        let status = factory.is_compliant(&msg);
        assert!(status.is_ok(), "{status}");
    }

    #[test]
    fn test_directive_request() {
        let factory = factory_at(0);
        let mut msg = factory.create_message("REQ.DIR").unwrap();
        assert_eq!(msg.kind(), MessageKind::Request);
        assert!(msg.boolean_value("RESPONSE").unwrap());
        assert!(!msg.has_field("NUM-OF-ARGUMENTS"));

        msg.set_field("DESTINATION-COMPONENT", "TARGET").unwrap();
        msg.set_field("DIRECTIVE-STRING", "START").unwrap();
        let status = factory.is_compliant(&msg);
        assert!(status.is_ok(), "{status}");
    }

    fn directive() -> (MessageFactory, Message) {
        let factory = factory_at(0);
        let mut msg = factory.create_message("REQ.DIR").unwrap();
        msg.set_field("DESTINATION-COMPONENT", "TARGET").unwrap();
        msg.set_field("DIRECTIVE-STRING", "START").unwrap();
        msg.set_field("NUM-OF-ARGUMENTS", 2u16).unwrap();
        msg.set_field("ARGUMENT.1.NAME", "MODE").unwrap();
        msg.set_field("ARGUMENT.1.VALUE", "SAFE").unwrap();
        msg.set_field("ARGUMENT.2.NAME", "DELAY").unwrap();
        msg.set_field("ARGUMENT.2.VALUE", 30u32).unwrap();
        (factory, msg)
    }

    #[test]
    fn test_directive_arguments() {
        let (factory, mut msg) = directive();
        let status = factory.is_compliant(&msg);
        assert!(status.is_ok(), "{status}");

        msg.set_field("ARGUMENT.1.NAME", 3.5f64).unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::IncorrectFieldType);
        assert!(status
            .reason
            .ends_with("ARGUMENT.1.NAME has incorrect field type of F64.  Valid type(s): STRING"));

        let (factory, mut msg) = directive();
        msg.clear_field("ARGUMENT.2.VALUE").unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::MissingRequiredField);
        assert!(status
            .reason
            .ends_with("ARGUMENT.2.VALUE is a required field, but is missing from message"));
    }

    #[test]
    fn test_directive_argument_count() {
        let (factory, mut msg) = directive();
        msg.set_field("NUM-OF-ARGUMENTS", "two").unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::IncorrectFieldType);
        assert!(status
            .reason
            .ends_with("NUM-OF-ARGUMENTS has incorrect field type of STRING.  Valid type(s): U16"));

        // Members beyond the declared count are user-defined fields.
        let (factory, mut msg) = directive();
        msg.set_field("ARGUMENT.9.X", 1i32).unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::NonAllowedField);
        assert!(status.reason.ends_with("Message contains user-defined field ARGUMENT.9.X"));

        // Without a count there are no members at all.
        let (factory, mut msg) = directive();
        msg.clear_field("NUM-OF-ARGUMENTS").unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::NonAllowedField);
        assert!(status.reason.ends_with("Message contains user-defined field ARGUMENT.1.NAME"));
    }

    /// Serves one version's documents from memory.
    struct InlineSource {
        directory: &'static str,
        templates: Vec<(&'static str, &'static str)>,
    }

    impl SchemaSource for InlineSource {
        fn describe(&self) -> String {
            "inline".to_string()
        }

        fn read_directory(&self, _version: u32) -> C2msResult<String> {
            Ok(self.directory.to_string())
        }

        fn read_templates(&self, _version: u32) -> C2msResult<Vec<(String, String)>> {
            Ok(self
                .templates
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect())
        }
    }

    const GROUP_DIRECTORY: &str = r#"
[[levels]]
level = 0
name = "MINI"

[[schemas]]
id = "HEADER"
level = 0
definition = ["MESSAGE-TYPE", "MESSAGE-SUBTYPE"]

[[schemas]]
id = "REQ.PLAN"
level = 0
"#;

    const GROUP_HEADER: &str = r#"
id = "HEADER"
level = "MINI"

[[subject]]
name = "MESSAGE-TYPE"
fields = ["MESSAGE-TYPE"]

[[subject]]
name = "MESSAGE-SUBTYPE"
fields = ["MESSAGE-SUBTYPE"]

[[fields]]
name = "MESSAGE-TYPE"
type = "STRING"
mode = "REQUIRED"

[[fields]]
name = "MESSAGE-SUBTYPE"
type = "STRING"
mode = "REQUIRED"
"#;

    /// `NUM-OF-STEPS` is not declared, so the step group is mandatory.  Each
    /// step holds an optional group of parameters.
    const GROUP_PLAN: &str = r#"
id = "REQ.PLAN"
level = "MINI"

[[fields]]
name = "STEPS"
type = "VARIABLE"
mode = "CONTROL"
element = "STEP"

[[fields.children]]
name = "LABEL"
type = "STRING"
mode = "REQUIRED"

[[fields.children]]
name = "NUM-OF-PARAMS"
type = "U16"
mode = "OPTIONAL"

[[fields.children]]
name = "PARAMS"
type = "VARIABLE"
mode = "CONTROL"
element = "PARAM"

[[fields.children.children]]
name = "VALUE"
type = "I32"
mode = "REQUIRED"
"#;

    fn plan_factory() -> MessageFactory {
        let source = InlineSource {
            directory: GROUP_DIRECTORY,
            templates: vec![("MINI_HEADER.toml", GROUP_HEADER), ("MINI_REQ.PLAN.toml", GROUP_PLAN)],
        };
        let registry =
            Arc::new(SpecificationRegistry::load(&source, CURRENT_VERSION, SchemaLevel::LEVEL_0).unwrap());
        let compliance = Arc::new(ComplianceValidator::new(Arc::clone(&registry)));
        MessageFactory::new(registry, compliance)
    }

    #[test]
    fn test_required_group_needs_its_size() {
        let factory = plan_factory();
        let msg = factory.create_message("REQ.PLAN").unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::MessageFailedValidation);
        assert_eq!(
            status.reason,
            "REQ.PLAN: Message Validation Failed.\n   \
             Message contains array of objects whose size is undefined: NUM-OF-STEPS cannot be found."
        );
    }

    #[test]
    fn test_nested_groups() {
        let factory = plan_factory();
        let mut msg = factory.create_message("REQ.PLAN").unwrap();
        msg.set_field("NUM-OF-STEPS", 1u16).unwrap();
        msg.set_field("STEP.1.LABEL", "ALIGN").unwrap();
        let status = factory.is_compliant(&msg);
        assert!(status.is_ok(), "{status}");

        msg.set_field("STEP.1.NUM-OF-PARAMS", 2u16).unwrap();
        msg.set_field("STEP.1.PARAM.1.VALUE", 10i32).unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::MissingRequiredField);
        assert!(status
            .reason
            .ends_with("STEP.1.PARAM.2.VALUE is a required field, but is missing from message"));

        msg.set_field("STEP.1.PARAM.2.VALUE", 20i32).unwrap();
        assert!(factory.is_compliant(&msg).is_ok());

        msg.set_field("STEP.1.PARAM.3.VALUE", 30i32).unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::NonAllowedField);
        assert!(status.reason.ends_with("Message contains user-defined field STEP.1.PARAM.3.VALUE"));
    }

    // ── Content patterns ──────────────────────────────────────────────────────

    fn log_message() -> (MessageFactory, Message) {
        let factory = factory_at(0);
        let mut msg = factory.create_message("LOG").unwrap();
        msg.set_field("SUBCLASS", "INFO").unwrap();
        msg.set_field("SEVERITY", 1i16).unwrap();
        msg.set_field("MSG-TEXT", "pump started").unwrap();
        (factory, msg)
    }

    #[test]
    fn test_event_time_pattern() {
        let (factory, mut msg) = log_message();
        msg.set_field("EVENT-TIME", "2019-032-12:34:56.789").unwrap();
        let status = factory.is_compliant(&msg);
        assert!(status.is_ok(), "{status}");

        msg.set_field("EVENT-TIME", "yesterday-ish").unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::InvalidFieldValue);
        assert!(status
            .reason
            .ends_with("EVENT-TIME has illegal Timestamp value of 'yesterday-ish'"));
    }

    #[test]
    fn test_header_string_pattern() {
        let (factory, mut msg) = log_message();
        msg.set_field("FACILITY", "bad facility!").unwrap();
        msg.set_field("EVENT-TIME", "yesterday-ish").unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::InvalidFieldValue);
        assert!(status
            .reason
            .ends_with("FACILITY has illegal Header String value of 'bad facility!'"));

        let (factory, mut msg) = heartbeat();
        msg.set_field("SAT-ID-LOGICAL", "").unwrap();
        let status = factory.is_compliant(&msg);
        assert!(status
            .reason
            .ends_with("SAT-ID-LOGICAL has illegal Header String value of ''"));
    }

    #[test]
    fn test_ip_address_pattern() {
        let factory = factory_at(2);
        let mut msg = factory.create_message("DEV").unwrap();
        msg.set_field("DEVICE-NAME", "PUMP1").unwrap();
        msg.set_field("DEVICE-STATUS", 1i16).unwrap();
        msg.set_field("DEVICE-ADDRESS", "10.1.2.3").unwrap();
        let status = factory.is_compliant(&msg);
        assert!(status.is_ok(), "{status}");

        msg.set_field("DEVICE-ADDRESS", "10.1.2").unwrap();
        let status = factory.is_compliant(&msg);
        assert_eq!(status.code, StatusCode::InvalidFieldValue);
        assert!(status
            .reason
            .ends_with("DEVICE-ADDRESS has illegal IP Address value of '10.1.2'"));
    }

    #[test]
    fn test_fully_qualified_create() {
        let factory = factory_at(0);
        let msg = factory.create_message("2019.00.C2MS.MSG.HB").unwrap();
        assert_eq!(msg.schema_id(), Some("MSG.HB"));
        assert!(factory.is_compliant(&msg).is_ok());
    }

    #[test]
    fn test_publish_toggle_gates_validation() {
        let config = EngineConfig {
            validate_publish: true,
            ..EngineConfig::default()
        };
        let factory = message_factory(&config).unwrap();
        let msg = factory.create_message("HB").unwrap();

        assert!(factory.check(Direction::Publish, &msg).has_error());
        assert!(factory.check(Direction::Receive, &msg).is_ok());
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let config = EngineConfig {
            schema_level: 9,
            ..EngineConfig::default()
        };
        assert!(message_factory(&config).is_err());
    }
}
