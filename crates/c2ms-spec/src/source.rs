//! Where schema documents come from.
//!
//! A `SchemaSource` hands the registry raw TOML text for one version: the
//! `DIRECTORY.toml` and every template document.  Two sources exist: a
//! directory tree on disk and the 2019.00 specification compiled into the
//! crate.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use c2ms_contracts::{C2msError, C2msResult};

/// The default specification version.
pub const CURRENT_VERSION: u32 = 201900;

pub const DIRECTORY_FILE: &str = "DIRECTORY.toml";

/// Directory name for a version, e.g. `201900` → `2019.00`.
pub fn version_dir(version: u32) -> String {
    format!("{}.{:02}", version / 100, version % 100)
}

fn unsupported(version: u32, detail: impl std::fmt::Display) -> C2msError {
    C2msError::configuration(format!("unsupported specification version {version}: {detail}"))
}

/// Supplies the raw documents of one specification version.
pub trait SchemaSource: Send + Sync {
    /// Human-readable location, for logs and error messages.
    fn describe(&self) -> String;

    /// Text of `DIRECTORY.toml`.  A version the source does not hold is a
    /// configuration error.
    fn read_directory(&self, version: u32) -> C2msResult<String>;

    /// `(document name, text)` for every template document, sorted by name.
    fn read_templates(&self, version: u32) -> C2msResult<Vec<(String, String)>>;
}

// ── Embedded ──────────────────────────────────────────────────────────────────

macro_rules! embedded {
    ($($file:literal),* $(,)?) => {
        &[$(($file, include_str!(concat!("../templates/2019.00/", $file)))),*]
    };
}

const EMBEDDED_2019_00: &[(&str, &str)] = embedded![
    "DIRECTORY.toml",
    "C2MS_HEADER.toml",
    "C2MS_MSG.HB.toml",
    "C2MS_MSG.LOG.toml",
    "C2MS_REQ.DIR.toml",
    "C2MS_RESP.DIR.toml",
    "C2MS-PIPE_HEADER.toml",
    "C2MS-PIPE_MSG.HB.toml",
    "C2MS-PIPE_MSG.PIPE.toml",
    "GMSEC_HEADER.toml",
    "GMSEC_MSG.DEV.toml",
];

/// The 2019.00 specification shipped with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl EmbeddedSource {
    fn check(version: u32) -> C2msResult<()> {
        if version != CURRENT_VERSION {
            return Err(unsupported(version, "embedded specification provides 2019.00 only"));
        }
        Ok(())
    }
}

impl SchemaSource for EmbeddedSource {
    fn describe(&self) -> String {
        "embedded".to_string()
    }

    fn read_directory(&self, version: u32) -> C2msResult<String> {
        Self::check(version)?;
        EMBEDDED_2019_00
            .iter()
            .find(|(name, _)| *name == DIRECTORY_FILE)
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| C2msError::configuration("embedded specification has no DIRECTORY"))
    }

    fn read_templates(&self, version: u32) -> C2msResult<Vec<(String, String)>> {
        Self::check(version)?;
        let mut docs: Vec<(String, String)> = EMBEDDED_2019_00
            .iter()
            .filter(|(name, _)| *name != DIRECTORY_FILE)
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();
        docs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(docs)
    }
}

// ── Directory tree ────────────────────────────────────────────────────────────

/// Reads `<root>/<YYYY.MM>/DIRECTORY.toml` and the `*.toml` documents beside it.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn version_path(&self, version: u32) -> C2msResult<PathBuf> {
        let path = self.root.join(version_dir(version));
        if !path.is_dir() {
            return Err(unsupported(version, format!("'{}' not found", path.display())));
        }
        Ok(path)
    }
}

fn read_file(path: &Path) -> C2msResult<String> {
    fs::read_to_string(path).map_err(|e| {
        C2msError::configuration(format!("failed to read schema file '{}': {e}", path.display()))
    })
}

impl SchemaSource for DirectorySource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn read_directory(&self, version: u32) -> C2msResult<String> {
        read_file(&self.version_path(version)?.join(DIRECTORY_FILE))
    }

    fn read_templates(&self, version: u32) -> C2msResult<Vec<(String, String)>> {
        let dir = self.version_path(version)?;
        let entries = fs::read_dir(&dir).map_err(|e| {
            C2msError::configuration(format!("failed to list '{}': {e}", dir.display()))
        })?;

        let mut docs = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| C2msError::configuration(format!("failed to list '{}': {e}", dir.display())))?
                .path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            if name == DIRECTORY_FILE || path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            debug!(document = %name, "reading schema document");
            docs.push((name, read_file(&path)?));
        }
        docs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(docs)
    }
}
