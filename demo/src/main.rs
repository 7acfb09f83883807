//! C2MS compliance engine: demo CLI
//!
//! Lists the loaded schemas, builds template messages, and validates XML or
//! JSON message files against the specification.
//!
//! Usage:
//!   cargo run -p demo -- schemas --level 1
//!   cargo run -p demo -- create HB --field MISSION-ID=MSSN --field COMPONENT=GMPUB
//!   cargo run -p demo -- validate heartbeat.xml

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use c2ms_contracts::{C2msError, C2msResult, Field, FieldType};
use c2ms_spec::{EngineConfig, SpecificationRegistry, VersionSelector};
use c2ms_verify::message_factory;

// ── CLI definition ────────────────────────────────────────────────────────────

/// C2MS message compliance engine demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "C2MS message compliance engine demo",
    long_about = "Loads a C2MS specification, creates template messages and checks\n\
                  XML or JSON messages for compliance."
)]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct EngineArgs {
    /// Engine configuration TOML.  Flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Schema level, 0 through 6.
    #[arg(long, global = true)]
    level: Option<u8>,

    /// Specification version: CURRENT or a number such as 201900.
    #[arg(long = "spec-version", global = true)]
    spec_version: Option<String>,

    /// Directory source root instead of the embedded specification.
    #[arg(long, global = true)]
    schema_path: Option<PathBuf>,

    /// Learn templates for unknown schema ids instead of rejecting them.
    #[arg(long, global = true)]
    learn: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List schema ids and header fields of the loaded specification.
    Schemas,
    /// Create a message from a template and report its compliance.
    Create {
        /// Schema id or alias, e.g. MSG.HB or HB.
        schema_id: String,
        /// Field to set, as NAME=VALUE.  Repeatable.
        #[arg(long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,
        /// Print JSON instead of XML.
        #[arg(long)]
        json: bool,
    },
    /// Validate an XML or JSON message file.
    Validate {
        file: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = engine_config(&cli.engine).and_then(|config| match cli.command {
        Command::Schemas => run_schemas(&config),
        Command::Create { schema_id, fields, json } => run_create(&config, &schema_id, &fields, json),
        Command::Validate { file } => run_validate(&config, &file),
    });

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn engine_config(args: &EngineArgs) -> C2msResult<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(level) = args.level {
        config.schema_level = level;
    }
    if let Some(version) = &args.spec_version {
        config.specification_version = VersionSelector::parse(version)?;
    }
    if let Some(path) = &args.schema_path {
        config.schema_path = Some(path.clone());
    }
    config.learn_unknown_schemas |= args.learn;
    config.validate()?;
    Ok(config)
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_schemas(config: &EngineConfig) -> C2msResult<bool> {
    let registry = SpecificationRegistry::from_config(config)?;
    println!(
        "Specification {} at LEVEL-{} ({})",
        config.version(),
        config.schema_level,
        registry.source()
    );
    println!();

    let mut cursor = registry.schema_id_cursor();
    while cursor.has_next() {
        let id = cursor.next()?;
        let template = registry.find_template(id)?;
        println!(
            "  {:<12} {:<9} {:>3} fields  {}",
            id,
            template.schema_level().to_string(),
            template.field_specs().len(),
            template.description()
        );
    }

    println!();
    for name in registry.level_names() {
        let header = registry.header_field_names(Some(name))?;
        println!("  {name} header: {}", header.join(", "));
    }
    Ok(true)
}

/// Parse `NAME=VALUE`, typed by the template's single declared type when
/// there is one, and as STRING otherwise.
fn parse_assignment(assignment: &str, declared: Option<FieldType>) -> C2msResult<Field> {
    let (name, value) = assignment.split_once('=').ok_or_else(|| {
        C2msError::invalid_argument(format!("expected NAME=VALUE, got \"{assignment}\""))
    })?;
    Field::from_text(name.trim(), declared.unwrap_or(FieldType::String), value)
}

fn run_create(config: &EngineConfig, schema_id: &str, fields: &[String], json: bool) -> C2msResult<bool> {
    info!(schema_id, fields = fields.len(), "creating message");
    let factory = message_factory(config)?;
    let template = factory.catalog().find_template(schema_id)?;
    let mut msg = factory.create_message(schema_id)?;

    for assignment in fields {
        let name = assignment.split('=').next().unwrap_or_default().trim();
        let declared = template.field_spec(name).and_then(|s| s.field_type.single());
        msg.add_field(parse_assignment(assignment, declared)?);
    }

    if json {
        println!("{}", factory.to_json(&msg)?);
    } else {
        println!("{}", factory.to_xml(&msg));
    }
    report(&factory.is_compliant(&msg))
}

fn run_validate(config: &EngineConfig, file: &Path) -> C2msResult<bool> {
    let text = std::fs::read_to_string(file).map_err(|e| {
        C2msError::invalid_argument(format!("failed to read '{}': {e}", file.display()))
    })?;
    info!(file = %file.display(), bytes = text.len(), "validating message file");
    let factory = message_factory(config)?;
    let msg = factory.from_data(&text)?;
    println!(
        "{}: {} with {} fields, schema {}",
        file.display(),
        msg.kind(),
        msg.field_count(),
        msg.schema_id().unwrap_or("(none)")
    );
    report(&factory.is_compliant(&msg))
}

fn report(status: &c2ms_contracts::Status) -> C2msResult<bool> {
    if status.is_ok() {
        println!("COMPLIANT");
    } else {
        println!("NOT COMPLIANT {status}");
    }
    Ok(status.is_ok())
}
