//! Engine configuration.
//!
//! The subset of the transport layer's configuration that the compliance
//! engine consumes:
//!
//! ```toml
//! specification_version = "CURRENT"   # or 201900
//! schema_level = 1
//! schema_path = "/etc/c2ms/templates"  # omit to use the embedded 2019.00
//! validate_publish = true
//! validate_receive = false
//! learn_unknown_schemas = false
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use c2ms_contracts::{C2msError, C2msResult, SchemaLevel};
use c2ms_core::ValidationToggles;

use crate::source::CURRENT_VERSION;

// ── VersionSelector ───────────────────────────────────────────────────────────

/// Which specification version to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawVersion")]
pub enum VersionSelector {
    #[default]
    Current,
    Exact(u32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Number(u32),
    Text(String),
}

impl TryFrom<RawVersion> for VersionSelector {
    type Error = C2msError;

    fn try_from(raw: RawVersion) -> Result<Self, Self::Error> {
        match raw {
            RawVersion::Number(v) => Ok(VersionSelector::Exact(v)),
            RawVersion::Text(s) => VersionSelector::parse(&s),
        }
    }
}

impl VersionSelector {
    /// `"CURRENT"` (any case) or a version number such as `"201900"`.
    pub fn parse(text: &str) -> C2msResult<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("CURRENT") {
            return Ok(VersionSelector::Current);
        }
        text.parse::<u32>().map(VersionSelector::Exact).map_err(|_| {
            C2msError::configuration(format!("invalid specification version \"{text}\""))
        })
    }

    pub fn resolve(&self) -> u32 {
        match self {
            VersionSelector::Current => CURRENT_VERSION,
            VersionSelector::Exact(v) => *v,
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Current => f.write_str("CURRENT"),
            VersionSelector::Exact(v) => write!(f, "{v}"),
        }
    }
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    pub specification_version: VersionSelector,
    pub schema_level: u8,
    /// Root of a directory source.  `None` selects the embedded specification.
    pub schema_path: Option<PathBuf>,
    pub validate_publish: bool,
    pub validate_receive: bool,
    pub learn_unknown_schemas: bool,
}

impl EngineConfig {
    /// Parse and validate `s`.
    ///
    /// Returns `C2msError::Configuration` on malformed TOML, an unknown key,
    /// a bad version string or a level above 6.
    pub fn from_toml_str(s: &str) -> C2msResult<Self> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| {
            C2msError::configuration(format!("failed to parse engine config TOML: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> C2msResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            C2msError::configuration(format!(
                "failed to read engine config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> C2msResult<()> {
        self.schema_level().map(|_| ())
    }

    pub fn schema_level(&self) -> C2msResult<SchemaLevel> {
        SchemaLevel::new(self.schema_level)
    }

    pub fn version(&self) -> u32 {
        self.specification_version.resolve()
    }

    pub fn toggles(&self) -> ValidationToggles {
        ValidationToggles {
            validate_publish: self.validate_publish,
            validate_receive: self.validate_receive,
        }
    }
}
