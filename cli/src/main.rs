use std::fs;
use std::path::{Path, PathBuf};

use argtree_core::{CommandDefinition, CommandTree};
use argtree_parser::{ArgumentParser, ParseOutcome, ParserConfig, TupleChars};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, debug};

/// Output format for parse results.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argtree")]
#[command(about = "Parse command-line input against a command tree definition")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse input against a definition and print the resulting values.
    Parse(ParseArgs),
    /// Validate one or more definition files.
    Validate(ValidateArgs),
    /// Write the default parser configuration to a YAML file.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Definition file (JSON, or YAML with a .yaml/.yml extension).
    definition: PathBuf,
    /// Parser configuration file (YAML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tuple delimiters, overriding the configuration file.
    #[arg(long)]
    tuple_chars: Option<TupleChars>,
    /// Output format for the parsed values.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Treat the input words as one raw string instead of escaping each.
    #[arg(long)]
    raw: bool,
    /// Input to parse.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    input: Vec<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Output YAML path.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct ParseReport<'a> {
    exit_code: i32,
    arguments: &'a argtree_parser::ParsedArguments,
    #[serde(skip_serializing_if = "Option::is_none")]
    forward_value: Option<&'a str>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Validate(args) => run_validate(args).map(|()| 0),
        Command::InitConfig(args) => run_init_config(args).map(|()| 0),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Parses the input and returns the exit code of the parse.
fn run_parse(args: ParseArgs) -> Result<i32, String> {
    let tree = load_tree(&args.definition)?;
    let mut config = match &args.config {
        Some(path) => ParserConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ParserConfig::default(),
    };
    if let Some(tuple_chars) = args.tuple_chars {
        config.tuple_chars = tuple_chars;
    }

    let input = if args.raw {
        args.input.join(" ")
    } else {
        ArgumentParser::join_args(&args.input)
    };
    debug!(input = %input, "parsing");

    let mut parser = ArgumentParser::with_config(tree, config).map_err(|e| e.to_string())?;
    let outcome = parser.parse(&input).map_err(|e| e.to_string())?;

    for error in &outcome.errors {
        eprintln!("{error}\n");
    }
    println!("{}", format_outcome(&outcome, args.format)?);
    Ok(outcome.exit_code)
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut failures = Vec::new();
    for path in &args.inputs {
        if let Err(err) = load_tree(path) {
            failures.push(err);
        }
    }
    if !failures.is_empty() {
        return Err(failures.join("\n"));
    }
    println!("Validated {} definition file(s).", args.inputs.len());
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    ParserConfig::default()
        .save(&args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;
    println!("Wrote default configuration to '{}'.", args.output.display());
    Ok(())
}

fn load_tree(path: &Path) -> Result<CommandTree, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let definition: CommandDefinition = if is_yaml {
        serde_yaml::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?
    };

    definition
        .into_tree()
        .map_err(|err| format!("Invalid definition '{}': {err}", path.display()))
}

fn format_outcome(outcome: &ParseOutcome, format: CliOutputFormat) -> Result<String, String> {
    let report = ParseReport {
        exit_code: outcome.exit_code,
        arguments: &outcome.arguments,
        forward_value: outcome.forward_value(),
    };
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(&report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}
