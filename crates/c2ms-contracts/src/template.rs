//! Message templates and field specifications.
//!
//! A `MessageTemplate` is the parsed, in-memory form of one schema: its
//! subject pattern and the ordered `FieldSpecification`s a message of that
//! schema must satisfy.  Templates are built by the specification registry and
//! shared behind `Arc`; nothing here mutates after construction.

use std::fmt;
use std::net::IpAddr;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{C2msError, C2msResult};
use crate::field::{Field, FieldType};

// ── SchemaLevel ───────────────────────────────────────────────────────────────

/// A schema layer, 0 through 6.  Higher levels add or override lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SchemaLevel(u8);

impl SchemaLevel {
    pub const MAX: u8 = 6;
    pub const LEVEL_0: SchemaLevel = SchemaLevel(0);

    pub fn new(level: u8) -> C2msResult<Self> {
        if level > Self::MAX {
            return Err(C2msError::configuration(format!(
                "schema level {level} is out of range 0..={}",
                Self::MAX
            )));
        }
        Ok(Self(level))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SchemaLevel {
    type Error = C2msError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<SchemaLevel> for u8 {
    fn from(level: SchemaLevel) -> Self {
        level.0
    }
}

impl fmt::Display for SchemaLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LEVEL-{}", self.0)
    }
}

// ── FieldSpecification ────────────────────────────────────────────────────────

/// How a template treats a field.
///
/// `Control` fields are template metadata and never appear on the wire.  A
/// control field with children declares an indexed group, sized by the
/// `NUM-OF-<name>` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Required,
    Optional,
    Control,
}

/// The type contract of a field specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// Any value type is acceptable.
    Variable,
    /// The value type must be one of these.
    OneOf(Vec<FieldType>),
}

impl TypeSpec {
    pub fn accepts(&self, ty: FieldType) -> bool {
        match self {
            TypeSpec::Variable => true,
            TypeSpec::OneOf(types) => types.contains(&ty),
        }
    }

    /// The single declared type, if there is exactly one.
    pub fn single(&self) -> Option<FieldType> {
        match self {
            TypeSpec::OneOf(types) if types.len() == 1 => Some(types[0]),
            _ => None,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Variable => f.write_str("VARIABLE"),
            TypeSpec::OneOf(types) => {
                let names: Vec<&str> = types.iter().map(FieldType::as_str).collect();
                f.write_str(&names.join(", "))
            }
        }
    }
}

/// One allowed value or range for a field.
///
/// Text forms: `a..b` (inclusive range), `n+` (at least n), `n-` (at most n);
/// anything that does not parse as one of those is an exact string match.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueConstraint {
    Exact(String),
    Range(f64, f64),
    AtLeast(f64),
    AtMost(f64),
}

impl ValueConstraint {
    pub fn parse(text: &str) -> Self {
        let t = text.trim();
        if let Some((lo, hi)) = t.split_once("..") {
            if let (Ok(lo), Ok(hi)) = (lo.trim().parse(), hi.trim().parse()) {
                return ValueConstraint::Range(lo, hi);
            }
        }
        if let Some(n) = t.strip_suffix('+').and_then(|n| n.trim().parse().ok()) {
            return ValueConstraint::AtLeast(n);
        }
        if let Some(n) = t.strip_suffix('-').and_then(|n| n.trim().parse().ok()) {
            return ValueConstraint::AtMost(n);
        }
        ValueConstraint::Exact(t.to_string())
    }

    pub fn allows(&self, field: &Field) -> bool {
        match self {
            ValueConstraint::Exact(s) => field.string_value() == *s,
            ValueConstraint::Range(lo, hi) => field.f64_value().is_ok_and(|v| *lo <= v && v <= *hi),
            ValueConstraint::AtLeast(n) => field.f64_value().is_ok_and(|v| v >= *n),
            ValueConstraint::AtMost(n) => field.f64_value().is_ok_and(|v| v <= *n),
        }
    }
}

impl fmt::Display for ValueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueConstraint::Exact(s) => f.write_str(s),
            ValueConstraint::Range(lo, hi) => write!(f, "{lo}..{hi}"),
            ValueConstraint::AtLeast(n) => write!(f, "{n}+"),
            ValueConstraint::AtMost(n) => write!(f, "{n}-"),
        }
    }
}

/// A content rule checked on present values once their type is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentPattern {
    /// Non-empty, `A-Z 0-9 - _` only.
    HeaderString,
    /// `YYYY-DDD-HH:MM:SS[.s]`, or a relative `+`/`-` offset.
    Time,
    /// IPv4 dotted quad or IPv6.
    IpAddress,
}

impl ContentPattern {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            ContentPattern::HeaderString => {
                !text.is_empty()
                    && text
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
            }
            ContentPattern::Time => parse_timestamp(text).is_some(),
            ContentPattern::IpAddress => text.parse::<IpAddr>().is_ok(),
        }
    }

    /// Name used in failure reasons.
    pub fn label(&self) -> &'static str {
        match self {
            ContentPattern::HeaderString => "Header String",
            ContentPattern::Time => "Timestamp",
            ContentPattern::IpAddress => "IP Address",
        }
    }
}

fn digits(text: &str, width: RangeInclusive<usize>) -> Option<u32> {
    if !width.contains(&text.len()) || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// `[[HH:]MM:]SS[.fraction]`; `full` demands all three clock parts.
fn parse_clock(text: &str, full: bool) -> Option<()> {
    let (hms, fraction) = match text.split_once('.') {
        Some((hms, fraction)) => (hms, Some(fraction)),
        None => (text, None),
    };
    if let Some(fraction) = fraction {
        digits(fraction, 1..=9)?;
    }
    let parts = hms
        .split(':')
        .map(|p| digits(p, 1..=2))
        .collect::<Option<Vec<u32>>>()?;
    let (hour, minute, second) = match parts[..] {
        [s] if !full => (0, 0, s),
        [m, s] if !full => (0, m, s),
        [h, m, s] => (h, m, s),
        _ => return None,
    };
    // 60 allows for a leap second.
    (hour <= 23 && minute <= 59 && second <= 60).then_some(())
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn parse_timestamp(text: &str) -> Option<()> {
    let (relative, body) = match text.chars().next()? {
        '+' | '-' => (true, &text[1..]),
        c if c.is_ascii_digit() => (false, text),
        _ => return None,
    };
    let parts: Vec<&str> = body.split('-').collect();
    let (year, day) = match parts[..] {
        [clock] if relative => return parse_clock(clock, false),
        [day, clock] if relative => {
            parse_clock(clock, true)?;
            (0, digits(day, 1..=3)?)
        }
        [year, day, clock] => {
            parse_clock(clock, true)?;
            (digits(year, 4..=4)?, digits(day, 3..=3)?)
        }
        _ => return None,
    };
    let first_day = if relative { 0 } else { 1 };
    let last_day = if is_leap_year(year) { 366 } else { 365 };
    (first_day..=last_day).contains(&day).then_some(())
}

/// The contract for one field within a template.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpecification {
    pub name: String,
    pub field_type: TypeSpec,
    pub mode: FieldMode,
    /// Free-form grouping label, e.g. `HEADER` or `CONTENT`.
    pub classification: String,
    /// Default value text, parsed against the single declared type when a
    /// message is created from the template.
    pub default_value: Option<String>,
    pub description: String,
    /// Allowed values; empty means unconstrained.
    pub values: Vec<ValueConstraint>,
    pub pattern: Option<ContentPattern>,
    /// Name stem of an indexed group's members, e.g. `ARGUMENT` for
    /// `ARGUMENT.1.NAME`.  Defaults to the field name.
    pub element: Option<String>,
    /// Specs repeated for each member of an indexed group.
    pub children: Vec<FieldSpecification>,
}

impl FieldSpecification {
    pub fn new(name: impl Into<String>, field_type: TypeSpec, mode: FieldMode) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode,
            classification: String::new(),
            default_value: None,
            description: String::new(),
            values: Vec::new(),
            pattern: None,
            element: None,
            children: Vec::new(),
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_values(mut self, values: Vec<ValueConstraint>) -> Self {
        self.values = values;
        self
    }

    pub fn with_pattern(mut self, pattern: ContentPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Turn this spec into an indexed group of `children`, one set per
    /// member `<element>.<n>.`.
    pub fn with_children(mut self, element: impl Into<String>, children: Vec<FieldSpecification>) -> Self {
        self.element = Some(element.into());
        self.children = children;
        self
    }

    pub fn is_group(&self) -> bool {
        self.mode == FieldMode::Control && !self.children.is_empty()
    }

    pub fn element_name(&self) -> &str {
        self.element.as_deref().unwrap_or(&self.name)
    }

    /// Name of the field holding the member count of this group.
    pub fn size_field_name(&self) -> String {
        format!("NUM-OF-{}", self.name)
    }

    /// Build the default field for this spec, when it has both a default and
    /// a single declared type.  Control fields never produce one.
    pub fn default_field(&self) -> C2msResult<Option<Field>> {
        if self.mode == FieldMode::Control {
            return Ok(None);
        }
        match (&self.default_value, self.field_type.single()) {
            (Some(text), Some(ty)) => Field::from_text(&self.name, ty, text).map(Some),
            _ => Ok(None),
        }
    }
}

// ── Subject pattern ───────────────────────────────────────────────────────────

/// Token placed in a subject for an element with no value.
pub const FILL: &str = "FILL";

/// What a subject element's token must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectElementKind {
    /// A fixed token, matched case-sensitively.
    Literal(String),
    /// Bound to the first present field of these names.
    Field(Vec<String>),
    /// Any non-empty token, or one of `values` when that list is non-empty.
    Variable(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectElement {
    pub name: String,
    pub kind: SubjectElementKind,
    /// Optional elements may be omitted at the tail or given as `FILL`.
    pub optional: bool,
}

// ── MessageTemplate ───────────────────────────────────────────────────────────

/// One schema: subject pattern plus ordered field contracts.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageTemplate {
    schema_id: String,
    schema_level: SchemaLevel,
    description: String,
    subject: Vec<SubjectElement>,
    fields: Vec<FieldSpecification>,
}

impl MessageTemplate {
    pub fn new(
        schema_id: impl Into<String>,
        schema_level: SchemaLevel,
        subject: Vec<SubjectElement>,
        fields: Vec<FieldSpecification>,
    ) -> Self {
        Self {
            schema_id: schema_id.into(),
            schema_level,
            description: String::new(),
            subject,
            fields,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// The level the template was defined at (not the registry's level).
    pub fn schema_level(&self) -> SchemaLevel {
        self.schema_level
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn subject_elements(&self) -> &[SubjectElement] {
        &self.subject
    }

    pub fn field_specs(&self) -> &[FieldSpecification] {
        &self.fields
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpecification> {
        self.fields.iter().find(|f| f.name == name)
    }
}
