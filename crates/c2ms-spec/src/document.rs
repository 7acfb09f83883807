//! Schema source documents.
//!
//! A version directory holds one `DIRECTORY.toml` plus one template document
//! per (level, schema id).  These types mirror the TOML layout; the registry
//! turns them into `MessageTemplate`s.
//!
//! Example directory:
//! ```toml
//! [[levels]]
//! level = 0
//! name = "C2MS"
//!
//! [[schemas]]
//! id = "HEADER"
//! level = 0
//! definition = ["MESSAGE-TYPE", "MESSAGE-SUBTYPE"]
//!
//! [[schemas]]
//! id = "MSG.HB"
//! level = 0
//! alias = "HB"
//! ```
//!
//! Example template:
//! ```toml
//! id = "MSG.HB"
//! level = "C2MS"
//! description = "Heartbeat"
//!
//! [[subject]]
//! name = "ME1"
//! fields = ["COMPONENT"]
//!
//! [[fields]]
//! name = "PUB-RATE"
//! type = "U16"
//! mode = "OPTIONAL"
//! ```

use serde::Deserialize;

use c2ms_contracts::{
    C2msError, C2msResult, ContentPattern, FieldMode, FieldSpecification, FieldType, SubjectElement,
    SubjectElementKind, TypeSpec, ValueConstraint,
};

/// Reserved schema id of the per-level header document.
pub const HEADER_ID: &str = "HEADER";

// ── DIRECTORY.toml ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryDoc {
    #[serde(default)]
    pub levels: Vec<LevelDecl>,
    #[serde(default)]
    pub schemas: Vec<SchemaEntry>,
}

/// Names a schema level, e.g. `0 = "C2MS"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelDecl {
    pub level: u8,
    pub name: String,
}

/// One directory entry: a schema id available at a level.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaEntry {
    pub id: String,
    pub level: u8,
    /// Header fields whose values, joined by `.`, form this id.  Empty means
    /// "same as the level's HEADER definition".
    #[serde(default)]
    pub definition: Vec<String>,
    /// Short name accepted by `create_message`, e.g. `HB`.
    pub alias: Option<String>,
    /// The entry only drives schema id deduction and has no template.
    #[serde(default)]
    pub definition_only: bool,
}

// ── Template documents ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateDoc {
    pub id: String,
    /// Level name as declared in the directory.
    pub level: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: Vec<SubjectDoc>,
    #[serde(default)]
    pub fields: Vec<FieldDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectDoc {
    pub name: String,
    pub literal: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub optional: bool,
}

/// A single type name or a list of acceptable type names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeDoc {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: TypeDoc,
    pub mode: FieldMode,
    #[serde(default)]
    pub classification: String,
    pub default: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub values: Vec<String>,
    pub pattern: Option<ContentPattern>,
    /// Member name stem of an indexed group; the field name when absent.
    pub element: Option<String>,
    /// Member fields of an indexed group.  Only CONTROL fields may have them.
    #[serde(default)]
    pub children: Vec<FieldDoc>,
}

// ── Conversion ────────────────────────────────────────────────────────────────

fn parse_type_name(name: &str, field: &str) -> C2msResult<FieldType> {
    FieldType::parse(name).ok_or_else(|| {
        C2msError::configuration(format!("field \"{field}\" declares unknown type \"{name}\""))
    })
}

impl TypeDoc {
    fn to_spec(&self, field: &str) -> C2msResult<TypeSpec> {
        match self {
            TypeDoc::One(name) if name.trim().eq_ignore_ascii_case("VARIABLE") => {
                Ok(TypeSpec::Variable)
            }
            TypeDoc::One(name) => Ok(TypeSpec::OneOf(vec![parse_type_name(name, field)?])),
            TypeDoc::Many(names) if names.is_empty() => Err(C2msError::configuration(format!(
                "field \"{field}\" declares an empty type list"
            ))),
            TypeDoc::Many(names) => names
                .iter()
                .map(|n| parse_type_name(n, field))
                .collect::<C2msResult<Vec<_>>>()
                .map(TypeSpec::OneOf),
        }
    }
}

impl FieldDoc {
    pub fn to_spec(&self) -> C2msResult<FieldSpecification> {
        if !self.children.is_empty() && self.mode != FieldMode::Control {
            return Err(C2msError::configuration(format!(
                "field \"{}\" declares children but is not a CONTROL field",
                self.name
            )));
        }
        let spec = FieldSpecification {
            name: self.name.clone(),
            field_type: self.field_type.to_spec(&self.name)?,
            mode: self.mode,
            classification: self.classification.clone(),
            default_value: self.default.clone(),
            description: self.description.clone(),
            values: self.values.iter().map(|v| ValueConstraint::parse(v)).collect(),
            pattern: self.pattern,
            element: self.element.clone(),
            children: self.children.iter().map(FieldDoc::to_spec).collect::<C2msResult<_>>()?,
        };
        // A default must parse against its declared type, or creation would fail later.
        spec.default_field().map_err(|e| {
            C2msError::configuration(format!("invalid default for field \"{}\": {e}", self.name))
        })?;
        Ok(spec)
    }
}

impl SubjectDoc {
    pub fn to_element(&self) -> C2msResult<SubjectElement> {
        let kind = match (&self.literal, self.fields.is_empty()) {
            (Some(_), false) => {
                return Err(C2msError::configuration(format!(
                    "subject element \"{}\" declares both a literal and fields",
                    self.name
                )))
            }
            (Some(text), true) => SubjectElementKind::Literal(text.clone()),
            (None, false) => SubjectElementKind::Field(self.fields.clone()),
            (None, true) => SubjectElementKind::Variable(self.values.clone()),
        };
        Ok(SubjectElement {
            name: self.name.clone(),
            kind,
            optional: self.optional,
        })
    }
}

impl TemplateDoc {
    pub fn from_toml_str(source_name: &str, s: &str) -> C2msResult<Self> {
        toml::from_str(s).map_err(|e| {
            C2msError::configuration(format!("failed to parse schema document '{source_name}': {e}"))
        })
    }

    pub fn is_header(&self) -> bool {
        self.id == HEADER_ID
    }

    pub fn field_specs(&self) -> C2msResult<Vec<FieldSpecification>> {
        self.fields.iter().map(FieldDoc::to_spec).collect()
    }

    pub fn subject_elements(&self) -> C2msResult<Vec<SubjectElement>> {
        self.subject.iter().map(SubjectDoc::to_element).collect()
    }
}

impl DirectoryDoc {
    pub fn from_toml_str(s: &str) -> C2msResult<Self> {
        toml::from_str(s).map_err(|e| {
            C2msError::configuration(format!("failed to parse DIRECTORY: {e}"))
        })
    }

    pub fn level_name(&self, level: u8) -> Option<&str> {
        self.levels
            .iter()
            .find(|l| l.level == level)
            .map(|l| l.name.as_str())
    }

    /// Level number for a level name, matched case-insensitively.
    pub fn level_of(&self, name: &str) -> Option<u8> {
        self.levels
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
            .map(|l| l.level)
    }

    pub fn entry(&self, id: &str, level: u8) -> Option<&SchemaEntry> {
        self.schemas.iter().find(|s| s.id == id && s.level == level)
    }
}
