use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tool_schema_core::{Aggregate, CommandDef, CommandMetadata, WalkOptions, walk_commands};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// CLI-specific aggregation enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliAggregate {
    None,
    Group,
    Root,
}

impl From<CliAggregate> for Aggregate {
    fn from(mode: CliAggregate) -> Self {
        match mode {
            CliAggregate::None => Self::None,
            CliAggregate::Group => Self::Group,
            CliAggregate::Root => Self::Root,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "tool-schema")]
#[command(about = "Generate tool schemas and argv from command-line definitions")]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tool schemas for a command definition file.
    Schema(SchemaArgs),
    /// Rebuild argv for one command from a JSON input object.
    Construct(ConstructArgs),
    /// Print the tool schemas for this program's own command line.
    DescribeSelf(DescribeSelfArgs),
}

#[derive(Debug, Args)]
struct WalkArgs {
    /// Walk configuration file (YAML or JSON).
    #[arg(long)]
    config: Option<PathBuf>,
    /// How nested subcommands are exposed.
    #[arg(long)]
    aggregate: Option<CliAggregate>,
    /// Display name used in place of the root command name.
    #[arg(long)]
    name: Option<String>,
    /// Only emit subcommand paths matching this regex.
    #[arg(long)]
    include: Option<String>,
    /// Never emit subcommand paths matching this regex.
    #[arg(long)]
    exclude: Option<String>,
    /// Fail on argument types with no JSON Schema mapping.
    #[arg(long)]
    strict_types: bool,
}

impl WalkArgs {
    /// Loads the config file, if any, then applies flag overrides.
    fn options(&self) -> Result<WalkOptions, String> {
        let mut options = match &self.config {
            Some(path) => WalkOptions::load(path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
            None => WalkOptions::default(),
        };
        if let Some(mode) = self.aggregate {
            options.aggregate = mode.into();
        }
        if let Some(name) = &self.name {
            options.name = Some(name.clone());
        }
        if let Some(include) = &self.include {
            options.include = Some(include.clone());
        }
        if let Some(exclude) = &self.exclude {
            options.exclude = Some(exclude.clone());
        }
        if self.strict_types {
            options.strict_types = true;
        }
        Ok(options)
    }
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Command definition file (JSON, or YAML by extension).
    #[arg(long)]
    definition: PathBuf,
    #[command(flatten)]
    walk: WalkArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ConstructArgs {
    /// Command definition file (JSON, or YAML by extension).
    #[arg(long)]
    definition: PathBuf,
    /// Path of the command to invoke, e.g. "my-cli run".
    #[arg(long)]
    path: String,
    /// File holding the JSON input object (default: stdin).
    #[arg(long)]
    input: Option<PathBuf>,
    #[command(flatten)]
    walk: WalkArgs,
}

#[derive(Debug, Args)]
struct DescribeSelfArgs {
    #[command(flatten)]
    walk: WalkArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Schema(args) => run_schema(args),
        Command::Construct(args) => run_construct(args),
        Command::DescribeSelf(args) => run_describe_self(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_schema(args: SchemaArgs) -> Result<(), String> {
    let options = args.walk.options()?;
    let records = walk_definition(&args.definition, &options)?;
    print_output(&records, args.format)
}

fn run_construct(args: ConstructArgs) -> Result<(), String> {
    let options = args.walk.options()?;
    let records = walk_definition(&args.definition, &options)?;
    let record = records
        .iter()
        .find(|record| record.path() == args.path)
        .ok_or_else(|| {
            let known: Vec<&str> = records.iter().map(CommandMetadata::path).collect();
            format!(
                "No command '{}' in '{}' (available: {})",
                args.path,
                args.definition.display(),
                known.join(", ")
            )
        })?;

    let raw = match &args.input {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            buf
        }
    };
    let inputs: Value = if raw.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&raw).map_err(|err| format!("Invalid JSON input: {err}"))?
    };

    let argv = record
        .construct_from_value(&inputs)
        .map_err(|err| err.to_string())?;
    debug!(path = record.path(), argc = argv.len(), "Constructed argv");

    let rendered = serde_json::to_string(&argv)
        .map_err(|err| format!("Failed to serialize argv: {err}"))?;
    println!("{rendered}");
    Ok(())
}

fn run_describe_self(args: DescribeSelfArgs) -> Result<(), String> {
    let options = args.walk.options()?;
    let mut cmd = Cli::command();
    cmd.build();
    let records = walk_commands(&cmd, &options).map_err(|err| err.to_string())?;
    print_output(&records, args.format)
}

fn walk_definition(path: &Path, options: &WalkOptions) -> Result<Vec<CommandMetadata>, String> {
    let definition = CommandDef::load(path)
        .map_err(|err| format!("Failed to load definition '{}': {err}", path.display()))?;
    info!(
        definition = %path.display(),
        root = %definition.name,
        aggregate = %options.aggregate,
        "Loaded command definition"
    );
    walk_commands(&definition, options).map_err(|err| err.to_string())
}

fn print_output<T: Serialize>(value: &T, format: OutputFormat) -> Result<(), String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| format!("Failed to serialize JSON: {err}"))?,
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|err| format!("Failed to serialize YAML: {err}"))?,
    };
    println!("{rendered}");
    Ok(())
}
