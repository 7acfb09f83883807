//! The specification registry.
//!
//! `SpecificationRegistry` loads every template of one (version, schema level)
//! from a `SchemaSource` and answers template, header and schema-id queries.
//!
//! Load algorithm:
//!
//! 1. Parse `DIRECTORY.toml`; levels 0..=L must each be named and must each
//!    have a `HEADER` entry.
//! 2. Parse every template document, skipping those above level L.  For each
//!    schema id the highest level wins; lower definitions are replaced whole.
//! 3. Check the directory and the documents agree: every listed entry has a
//!    document and every document is listed.
//! 4. Layer the headers 0..=L, then compose each template as header fields
//!    (with the id-defining fields defaulted) followed by content fields.
//!
//! Any failure aborts the load; there is no partially built registry.
//!
//! Templates sit behind a `parking_lot::RwLock<Arc<BTreeMap<..>>>`.  Readers
//! take a snapshot `Arc` and release the lock immediately.  The only writer is
//! the opt-in learn policy, which copies the map, inserts, and swaps.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use c2ms_contracts::{
    C2msError, C2msResult, FieldMode, FieldSpecification, Message, MessageTemplate, SchemaLevel,
    SubjectElement, SubjectElementKind, TypeSpec,
};
use c2ms_core::TemplateCatalog;

use crate::config::EngineConfig;
use crate::cursor::SchemaIdCursor;
use crate::document::{DirectoryDoc, TemplateDoc, HEADER_ID};
use crate::source::{version_dir, DirectorySource, EmbeddedSource, SchemaSource};

/// Upper bound on definition refinements while deducing a schema id.
const MAX_REFINEMENTS: usize = 8;

type TemplateMap = BTreeMap<String, Arc<MessageTemplate>>;

/// A directory entry resolved against its level's header definition.
#[derive(Debug, Clone)]
struct Definition {
    id: String,
    level: u8,
    fields: Vec<String>,
}

/// The header in effect at one level, after layering.
#[derive(Debug, Clone)]
struct LayeredHeader {
    name: String,
    fields: Vec<FieldSpecification>,
    subject: Vec<SubjectElement>,
}

/// All templates of one (version, schema level).
pub struct SpecificationRegistry {
    version: u32,
    schema_level: SchemaLevel,
    source: String,
    /// Index = level.
    headers: Vec<LayeredHeader>,
    definitions: Vec<Definition>,
    aliases: HashMap<String, String>,
    templates: RwLock<Arc<TemplateMap>>,
    learn: bool,
}

/// Replace same-named specs in place and append new ones.
fn overlay(base: &mut Vec<FieldSpecification>, specs: Vec<FieldSpecification>) {
    for spec in specs {
        match base.iter_mut().find(|existing| existing.name == spec.name) {
            Some(existing) => *existing = spec,
            None => base.push(spec),
        }
    }
}

impl SpecificationRegistry {
    /// Build a registry from `config`, using the embedded specification unless
    /// `schema_path` names a directory source.
    pub fn from_config(config: &EngineConfig) -> C2msResult<Self> {
        let level = config.schema_level()?;
        let version = config.version();
        let registry = match &config.schema_path {
            Some(path) => Self::load(&DirectorySource::new(path), version, level)?,
            None => Self::load(&EmbeddedSource, version, level)?,
        };
        Ok(registry.with_learning(config.learn_unknown_schemas))
    }

    /// Load every template of `version` at `level` from `source`.
    pub fn load(source: &dyn SchemaSource, version: u32, level: SchemaLevel) -> C2msResult<Self> {
        let top = level.value();
        let directory = DirectoryDoc::from_toml_str(&source.read_directory(version)?)?;

        // ── 1. Directory levels and headers ──────────────────────────────────
        let mut level_names = Vec::new();
        for n in 0..=top {
            let name = directory.level_name(n).ok_or_else(|| {
                C2msError::configuration(format!("DIRECTORY is missing definition for LEVEL-{n}"))
            })?;
            if directory.entry(HEADER_ID, n).is_none() {
                return Err(C2msError::configuration(format!(
                    "DIRECTORY is missing definition for LEVEL-{n} HEADER"
                )));
            }
            level_names.push(name.to_string());
        }

        // ── 2. Documents ─────────────────────────────────────────────────────
        let mut header_docs: BTreeMap<u8, TemplateDoc> = BTreeMap::new();
        let mut template_docs: BTreeMap<String, (u8, TemplateDoc)> = BTreeMap::new();
        let mut seen: Vec<(String, u8)> = Vec::new();

        for (name, text) in source.read_templates(version)? {
            let doc = TemplateDoc::from_toml_str(&name, &text)?;
            let doc_level = directory.level_of(&doc.level).ok_or_else(|| {
                C2msError::configuration(format!(
                    "schema document '{name}' names unknown level \"{}\"",
                    doc.level
                ))
            })?;
            if seen.contains(&(doc.id.clone(), doc_level)) {
                return Err(C2msError::configuration(format!(
                    "duplicate definition of schema \"{}\" at LEVEL-{doc_level}",
                    doc.id
                )));
            }
            seen.push((doc.id.clone(), doc_level));

            if doc_level > top {
                debug!(schema_id = %doc.id, level = doc_level, "skipping document above schema level");
                continue;
            }
            if directory.entry(&doc.id, doc_level).is_none() {
                return Err(C2msError::configuration(format!(
                    "schema document '{name}' has no DIRECTORY entry for \"{}\" at LEVEL-{doc_level}",
                    doc.id
                )));
            }

            if doc.is_header() {
                header_docs.insert(doc_level, doc);
            } else {
                let shadowed = template_docs
                    .get(&doc.id)
                    .is_some_and(|(existing, _)| *existing > doc_level);
                if !shadowed {
                    template_docs.insert(doc.id.clone(), (doc_level, doc));
                }
            }
        }

        // ── 3. Directory/document agreement ──────────────────────────────────
        for entry in directory.schemas.iter().filter(|e| e.level <= top && !e.definition_only) {
            if !seen.contains(&(entry.id.clone(), entry.level)) {
                return Err(C2msError::configuration(format!(
                    "missing template for \"{}\" at LEVEL-{}",
                    entry.id, entry.level
                )));
            }
        }

        // ── 4. Headers, definitions, templates ───────────────────────────────
        let mut headers: Vec<LayeredHeader> = Vec::new();
        for (n, name) in level_names.iter().enumerate() {
            let doc = header_docs.get(&(n as u8)).ok_or_else(|| {
                C2msError::configuration(format!("missing template for LEVEL-{n} HEADER"))
            })?;
            let (mut fields, mut subject) = match headers.last() {
                Some(below) => (below.fields.clone(), below.subject.clone()),
                None => (Vec::new(), Vec::new()),
            };
            overlay(&mut fields, doc.field_specs()?);
            let own_subject = doc.subject_elements()?;
            if !own_subject.is_empty() {
                subject = own_subject;
            }
            headers.push(LayeredHeader { name: name.clone(), fields, subject });
        }

        let definitions: Vec<Definition> = directory
            .schemas
            .iter()
            .filter(|e| e.level <= top)
            .map(|e| {
                let fields = if e.definition.is_empty() {
                    directory
                        .entry(HEADER_ID, e.level)
                        .map(|h| h.definition.clone())
                        .unwrap_or_default()
                } else {
                    e.definition.clone()
                };
                Definition { id: e.id.clone(), level: e.level, fields }
            })
            .collect();

        let active = headers
            .last()
            .ok_or_else(|| C2msError::configuration("no header levels loaded"))?;

        let mut templates = TemplateMap::new();
        for (id, (doc_level, doc)) in &template_docs {
            let definition = definitions
                .iter()
                .find(|d| d.id == *id && d.level == *doc_level)
                .map(|d| d.fields.as_slice())
                .unwrap_or_default();

            let mut fields = active.fields.clone();
            for (field_name, segment) in definition.iter().zip(id.split('.')) {
                if let Some(spec) = fields.iter_mut().find(|f| f.name == *field_name) {
                    spec.default_value = Some(segment.to_string());
                }
            }
            overlay(&mut fields, doc.field_specs()?);

            let mut subject = active.subject.clone();
            subject.extend(doc.subject_elements()?);

            let template = MessageTemplate::new(id.clone(), SchemaLevel::new(*doc_level)?, subject, fields)
                .with_description(doc.description.clone());
            templates.insert(id.clone(), Arc::new(template));
        }

        // The highest level declaring an alias owns it, whatever the entry order.
        let mut aliased: Vec<_> = directory
            .schemas
            .iter()
            .filter(|e| e.level <= top && templates.contains_key(&e.id))
            .filter(|e| e.alias.is_some())
            .collect();
        aliased.sort_by_key(|e| e.level);
        let aliases = aliased
            .into_iter()
            .filter_map(|e| e.alias.as_ref().map(|a| (a.clone(), e.id.clone())))
            .collect();

        info!(
            source = %source.describe(),
            version,
            schema_level = top,
            templates = templates.len(),
            "specification loaded"
        );

        Ok(Self {
            version,
            schema_level: level,
            source: source.describe(),
            headers,
            definitions,
            aliases,
            templates: RwLock::new(Arc::new(templates)),
            learn: false,
        })
    }

    /// Enable or disable the learn policy for unknown schema ids.
    pub fn with_learning(mut self, learn: bool) -> Self {
        self.learn = learn;
        self
    }

    pub fn learns(&self) -> bool {
        self.learn
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Level names 0..=L, e.g. `["C2MS", "C2MS-PIPE"]`.
    pub fn level_names(&self) -> Vec<&str> {
        self.headers.iter().map(|h| h.name.as_str()).collect()
    }

    fn active_header(&self) -> Option<&LayeredHeader> {
        self.headers.last()
    }

    /// Header field specs of the active level.
    pub fn header_field_specs(&self) -> &[FieldSpecification] {
        self.active_header().map(|h| h.fields.as_slice()).unwrap_or_default()
    }

    fn snapshot(&self) -> Arc<TemplateMap> {
        Arc::clone(&self.templates.read())
    }

    /// All schema ids, in sorted order.
    pub fn schema_ids(&self) -> Vec<String> {
        self.snapshot().keys().cloned().collect()
    }

    pub fn schema_id_cursor(&self) -> SchemaIdCursor {
        SchemaIdCursor::new(self.schema_ids())
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// `MSG.HB` for a fully qualified `2019.00.C2MS.MSG.HB`, when the version
    /// is this registry's and the level name one of its levels.
    fn unqualified<'a>(&self, schema_id: &'a str) -> &'a str {
        let Some(rest) = schema_id
            .strip_prefix(version_dir(self.version).as_str())
            .and_then(|r| r.strip_prefix('.'))
        else {
            return schema_id;
        };
        match rest.split_once('.') {
            Some((level, bare)) if self.headers.iter().any(|h| h.name.eq_ignore_ascii_case(level)) => bare,
            _ => schema_id,
        }
    }

    /// Resolve `schema_id`: exact id, then alias, then the id with trailing
    /// segments trimmed while more than two remain.  A fully qualified id
    /// (`YYYY.MM.<LEVEL>.<id>`) is resolved by its bare id.
    pub fn find_template(&self, schema_id: &str) -> C2msResult<Arc<MessageTemplate>> {
        if schema_id.trim().is_empty() {
            return Err(C2msError::invalid_argument(
                "SchemaID cannot be NULL, nor be an empty string",
            ));
        }
        let qualified = schema_id;
        let schema_id = self.unqualified(qualified);
        let templates = self.snapshot();
        if let Some(template) = templates.get(schema_id) {
            return Ok(Arc::clone(template));
        }
        if let Some(template) = self.aliases.get(schema_id).and_then(|id| templates.get(id)) {
            return Ok(Arc::clone(template));
        }

        let mut segments: Vec<&str> = schema_id.split('.').collect();
        while segments.len() > 2 {
            segments.pop();
            if let Some(template) = templates.get(&segments.join(".")) {
                debug!(schema_id, resolved = %template.schema_id(), "schema id resolved by base id");
                return Ok(Arc::clone(template));
            }
        }
        Err(C2msError::UnknownSchema { schema_id: qualified.to_string() })
    }

    /// Header field names for `key`.  `None`, `""` and `"DEFAULT"` select the
    /// active level; otherwise `key` is a level name.
    pub fn header_field_names(&self, key: Option<&str>) -> C2msResult<Vec<String>> {
        let header = match key.map(str::trim) {
            None | Some("") => self.active_header(),
            Some(k) if k.eq_ignore_ascii_case("DEFAULT") => self.active_header(),
            Some(k) => self.headers.iter().find(|h| h.name.eq_ignore_ascii_case(k)),
        };
        header
            .map(|h| h.fields.iter().map(|f| f.name.clone()).collect())
            .ok_or_else(|| C2msError::UnknownSchema {
                schema_id: key.unwrap_or_default().to_string(),
            })
    }

    // ── Schema id deduction ───────────────────────────────────────────────────

    fn definition(&self, id: &str, level: u8) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.id == id && d.level == level)
    }

    fn join_values(msg: &Message, names: &[String]) -> Option<String> {
        if names.is_empty() {
            return None;
        }
        names
            .iter()
            .map(|n| msg.get_field(n).ok().map(|f| f.string_value()))
            .collect::<Option<Vec<_>>>()
            .map(|values| values.join("."))
    }

    /// Schema id from header fields, refined through directory definitions
    /// (e.g. `MSG.C2CX` + `C2CX-SUBTYPE` → `MSG.C2CX.HB`).
    pub fn deduce_from_fields(&self, msg: &Message) -> Option<String> {
        let top = self.schema_level.value();
        let header = self.definition(HEADER_ID, top)?;
        let base = Self::join_values(msg, &header.fields)?;

        for level in (0..=top).rev() {
            let mut id = base.clone();
            let mut found = false;
            for _ in 0..MAX_REFINEMENTS {
                let Some(definition) = self.definition(&id, level) else {
                    break;
                };
                found = true;
                match Self::join_values(msg, &definition.fields) {
                    Some(next) if next != id => id = next,
                    _ => break,
                }
            }
            if found {
                return Some(id);
            }
        }
        Some(base)
    }

    /// Schema id from the subject tokens at the header positions bound to the
    /// id-defining fields.
    pub fn deduce_from_subject(&self, subject: &str) -> Option<String> {
        let top = self.schema_level.value();
        let header = self.definition(HEADER_ID, top)?;
        let elements = &self.active_header()?.subject;
        let tokens: Vec<&str> = subject.split('.').collect();

        let parts = header
            .fields
            .iter()
            .map(|name| {
                let index = elements.iter().position(|e| {
                    matches!(&e.kind, SubjectElementKind::Field(names) if names.contains(name))
                })?;
                tokens.get(index).filter(|t| !t.is_empty()).map(|t| t.to_string())
            })
            .collect::<Option<Vec<_>>>()?;
        (!parts.is_empty()).then(|| parts.join("."))
    }

    pub fn deduce_schema_id(&self, msg: &Message) -> Option<String> {
        self.deduce_from_fields(msg)
            .or_else(|| msg.subject().and_then(|s| self.deduce_from_subject(s)))
    }

    // ── Learn policy ──────────────────────────────────────────────────────────

    /// Synthesize and register a template for `schema_id` from `msg`.
    ///
    /// Every current field becomes REQUIRED with its exact type; the template
    /// has no subject pattern.  If another thread learned the id first, its
    /// template is returned unchanged.
    pub fn learn_template(&self, schema_id: &str, msg: &Message) -> C2msResult<Arc<MessageTemplate>> {
        if !self.learn {
            return Err(C2msError::UnknownSchema { schema_id: schema_id.to_string() });
        }

        let mut guard = self.templates.write();
        if let Some(existing) = guard.get(schema_id) {
            return Ok(Arc::clone(existing));
        }

        let fields = msg
            .fields()
            .map(|f| {
                let mut spec = FieldSpecification::new(
                    f.name(),
                    TypeSpec::OneOf(vec![f.field_type()]),
                    FieldMode::Required,
                );
                spec.classification = "LEARNED".to_string();
                spec
            })
            .collect();
        let template = Arc::new(
            MessageTemplate::new(schema_id, self.schema_level, Vec::new(), fields)
                .with_description("learned from message"),
        );

        let mut next = TemplateMap::clone(&guard);
        next.insert(schema_id.to_string(), Arc::clone(&template));
        *guard = Arc::new(next);

        warn!(
            schema_id,
            fields = template.field_specs().len(),
            "learned template for unknown schema id"
        );
        Ok(template)
    }
}

impl std::fmt::Debug for SpecificationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecificationRegistry")
            .field("version", &self.version)
            .field("schema_level", &self.schema_level)
            .field("source", &self.source)
            .field("templates", &self.snapshot().len())
            .field("learn", &self.learn)
            .finish()
    }
}

impl TemplateCatalog for SpecificationRegistry {
    fn version(&self) -> u32 {
        self.version
    }

    fn schema_level(&self) -> SchemaLevel {
        self.schema_level
    }

    fn find_template(&self, schema_id: &str) -> C2msResult<Arc<MessageTemplate>> {
        SpecificationRegistry::find_template(self, schema_id)
    }

    fn header_field_names(&self, key: Option<&str>) -> C2msResult<Vec<String>> {
        SpecificationRegistry::header_field_names(self, key)
    }

    fn deduce_schema_id(&self, msg: &Message) -> Option<String> {
        SpecificationRegistry::deduce_schema_id(self, msg)
    }
}
