mod config;
mod output;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use protoflag_args::bind;
use protoflag_core::{FlagTree, SchemaSet, compile};
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::output::{OutputFormat, ValueFormat, format_message, format_tree};

#[derive(Debug, Parser)]
#[command(name = "protoflag", version)]
#[command(about = "Compile message schemas into nested CLI flags and parse command lines")]
struct Cli {
    /// YAML config file (defaults to .protoflag.yml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile every message of a schema file (or one) and report errors.
    Check(CheckArgs),
    /// Show the flag tree compiled from a message.
    Inspect(InspectArgs),
    /// Bind the tokens after `--` against a message and print the result.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (JSON, or YAML by extension).
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Only compile this fully qualified message.
    #[arg(long)]
    message: Option<String>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Schema file (JSON, or YAML by extension).
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Fully qualified root message.
    #[arg(long)]
    message: Option<String>,
    /// Output format (default: table).
    #[arg(long)]
    format: Option<OutputFormat>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Schema file (JSON, or YAML by extension).
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Fully qualified root message.
    #[arg(long)]
    message: Option<String>,
    /// Output format (default: json).
    #[arg(long)]
    format: Option<ValueFormat>,
    /// Tokens to bind, given after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = CliConfig::discover(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Check(args) => run_check(args, &config),
        Command::Inspect(args) => run_inspect(args, &config),
        Command::Parse(args) => run_parse(args, &config),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_schema(path: &Path) -> Result<SchemaSet, String> {
    let schema = SchemaSet::load(path)
        .map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))?;
    debug!(
        path = %path.display(),
        messages = schema.messages.len(),
        enums = schema.enums.len(),
        "Loaded schema"
    );
    Ok(schema)
}

fn compile_root(schema: &SchemaSet, message: &str) -> Result<FlagTree, String> {
    compile(schema, message).map_err(|err| format!("Failed to compile '{message}': {err}"))
}

fn run_check(args: CheckArgs, config: &CliConfig) -> Result<(), String> {
    let path = config.schema_path(args.schema)?;
    let schema = load_schema(&path)?;

    let targets: Vec<String> = match args.message {
        Some(message) => vec![message],
        None => schema.message_names().into_iter().map(str::to_string).collect(),
    };
    if targets.is_empty() {
        return Err(format!("Schema '{}' declares no messages", path.display()));
    }

    let mut failures = 0usize;
    for message in &targets {
        match compile(&schema, message) {
            Ok(tree) => println!(
                "ok    {message} (depth {}, {} field(s))",
                tree.depth(),
                tree.nodes.len()
            ),
            Err(err) => {
                failures += 1;
                println!("FAIL  {message}: {err}");
            }
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} message(s) failed to compile",
            targets.len()
        ));
    }
    Ok(())
}

fn run_inspect(args: InspectArgs, config: &CliConfig) -> Result<(), String> {
    let schema = load_schema(&config.schema_path(args.schema)?)?;
    let message = config.root_message(args.message)?;
    let format = args
        .format
        .or(config.inspect_format)
        .unwrap_or(OutputFormat::Table);

    let tree = compile_root(&schema, &message)?;
    print!("{}", ensure_newline(format_tree(&tree, format)?));
    Ok(())
}

fn run_parse(args: ParseArgs, config: &CliConfig) -> Result<(), String> {
    let schema = load_schema(&config.schema_path(args.schema)?)?;
    let message = config.root_message(args.message)?;
    let format = args
        .format
        .or(config.parse_format)
        .unwrap_or(ValueFormat::Json);

    let tree = compile_root(&schema, &message)?;
    let value = bind(&tree, &args.tokens).map_err(|err| format!("Invalid arguments: {err}"))?;
    print!("{}", ensure_newline(format_message(&value, format)?));
    Ok(())
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
