use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use policy_cli::command::{error_response, CommandAction, CommandHandler, CommandRequest};
use policy_cli::session::run_session;
use policy_cli::{load_engine, ConfigOverrides, LoadedEngine, ResolvedConfig};
use policy_protocol::{serialize_json, serialize_json_pretty};
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "policy-tool")]
#[command(about = "Browse, cross-reference and plan digital policy initiatives", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Directory holding the three data files (overrides POLICY_TOOL_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Policy data file
    #[arg(long, global = true)]
    policies: Option<PathBuf>,

    /// Expert directory file
    #[arg(long, global = true)]
    experts: Option<PathBuf>,

    /// Special considerations file
    #[arg(long, global = true)]
    considerations: Option<PathBuf>,

    /// TOML config with a [data] table and engine sections (overrides POLICY_TOOL_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config: self.config.clone(),
            data_dir: self.data_dir.clone(),
            policies: self.policies.clone(),
            experts: self.experts.clone(),
            considerations: self.considerations.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a JSON Command API request
    Command(CommandArgs),

    /// Filter policies by free text, keywords, dimension and phase
    Search(SearchArgs),

    /// Policies related to one policy key
    Related(RelatedArgs),

    /// Catalog totals per dimension
    Stats(StatsArgs),

    /// Read JSON-lines operations from stdin and stream state events
    Session,
}

#[derive(Args)]
struct CommandArgs {
    /// Inline JSON request (mutually exclusive with --file)
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to file containing the JSON request
    #[arg(long)]
    file: Option<PathBuf>,

    /// Pretty-print JSON response
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Free-text term matched against title, description and examples
    term: Option<String>,

    /// Keyword filter (repeatable)
    #[arg(long = "keyword", short = 'k')]
    keywords: Vec<String>,

    /// Restrict to one dimension
    #[arg(long)]
    dimension: Option<String>,

    /// Restrict to one phase
    #[arg(long)]
    phase: Option<String>,

    /// Maximum number of results
    #[arg(long, short = 'n', default_value_t = 20)]
    limit: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RelatedArgs {
    /// Policy key: "Dimension|Phase|PolicyId"
    key: String,

    /// Maximum number of related policies
    #[arg(long, short = 'n')]
    limit: Option<usize>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StatsArgs {
    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout carries JSON for these; keep info chatter out of the way.
    let json_output = match &cli.command {
        Commands::Command(_) | Commands::Session => true,
        Commands::Search(args) => args.json,
        Commands::Related(args) => args.json,
        Commands::Stats(args) => args.json,
    };
    if json_output && !cli.verbose {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let overrides = cli.overrides();
    let loaded = match prepare(&overrides).await {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!("{err:#}");
            if let Commands::Command(args) = &cli.command {
                print_json(&error_response(&err, None, 0), args.pretty)?;
            } else {
                eprintln!("Error: {err:#}");
            }
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Command(args) => run_command(args, loaded)?,
        Commands::Search(args) => run_search(args, loaded)?,
        Commands::Related(args) => run_related(args, loaded)?,
        Commands::Stats(args) => run_stats(args, loaded)?,
        Commands::Session => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            run_session(loaded.engine, input, io::stdout().lock()).await?;
        }
    }

    Ok(())
}

async fn prepare(overrides: &ConfigOverrides) -> Result<LoadedEngine> {
    let config = ResolvedConfig::resolve(overrides)?;
    if let Some(path) = &config.config_path {
        log::debug!("Using config {}", path.display());
    }
    let loaded = load_engine(&config).await?;
    for note in loaded.degraded_notes() {
        log::warn!("{note}");
    }
    Ok(loaded)
}

/// Request-level failures are reported in the envelope; the exit code stays 0.
fn run_command(args: CommandArgs, loaded: LoadedEngine) -> Result<()> {
    let handler = CommandHandler::new(loaded);
    let response = match read_request(&args) {
        Ok(request) => handler.execute(request),
        Err(err) => error_response(&err, None, 0),
    };
    print_json(&response, args.pretty)
}

fn read_request(args: &CommandArgs) -> Result<CommandRequest> {
    let raw = read_payload(args)?;
    serde_json::from_str(&raw).context("Invalid JSON passed to --json/--file")
}

fn read_payload(args: &CommandArgs) -> Result<String> {
    if let Some(raw) = &args.json {
        return Ok(raw.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read JSON from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Command request is empty. Provide --json, --file, or pipe JSON via stdin.");
    }

    Ok(buffer)
}

fn run_search(args: SearchArgs, loaded: LoadedEngine) -> Result<()> {
    let payload = json!({
        "dimension": args.dimension,
        "phase": args.phase,
        "search_term": args.term.unwrap_or_default(),
        "keywords": args.keywords,
        "limit": args.limit,
    });
    let data = execute(loaded, CommandAction::Filter, payload, args.json)?;
    let Some(policies) = data.as_ref().and_then(Value::as_array) else {
        return Ok(());
    };

    if policies.is_empty() {
        println!("No matching policies.");
    }
    for (i, policy) in policies.iter().enumerate() {
        println!(
            "{}. {} ({})",
            i + 1,
            policy["title"].as_str().unwrap_or_default(),
            policy["key"].as_str().unwrap_or_default()
        );
        if let Some(keywords) = policy["keywords"].as_array().filter(|k| !k.is_empty()) {
            let keywords: Vec<&str> = keywords.iter().filter_map(Value::as_str).collect();
            println!("   Keywords: {}", keywords.join(", "));
        }
    }
    Ok(())
}

fn run_related(args: RelatedArgs, loaded: LoadedEngine) -> Result<()> {
    let payload = json!({ "key": args.key, "limit": args.limit });
    let data = execute(loaded, CommandAction::Related, payload, args.json)?;
    let Some(related) = data.as_ref().and_then(Value::as_array) else {
        return Ok(());
    };

    if related.is_empty() {
        println!("No related policies.");
    }
    for (i, policy) in related.iter().enumerate() {
        let shared: Vec<&str> = policy["shared_keywords"]
            .as_array()
            .map(|k| k.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        println!(
            "{}. {} (score: {:.2})",
            i + 1,
            policy["title"].as_str().unwrap_or_default(),
            policy["score"].as_f64().unwrap_or_default()
        );
        println!("   Key: {}", policy["key"].as_str().unwrap_or_default());
        println!("   Shared: {}", shared.join(", "));
    }
    Ok(())
}

fn run_stats(args: StatsArgs, loaded: LoadedEngine) -> Result<()> {
    let data = execute(loaded, CommandAction::Stats, json!({}), args.json)?;
    let Some(stats) = data else {
        return Ok(());
    };

    println!("Dimensions: {}", stats["total_dimensions"]);
    println!("Policies:   {}", stats["total_policies"]);
    println!("Experts:    {}", stats["total_experts"]);
    if let Some(per_dimension) = stats["policies_per_dimension"].as_object() {
        for (dimension, count) in per_dimension {
            println!("  {dimension}: {count}");
        }
    }
    Ok(())
}

/// Runs one request for a human-facing subcommand.
///
/// Returns the response data when the caller should render it; `None` when
/// the JSON envelope was already printed.
fn execute(
    loaded: LoadedEngine,
    action: CommandAction,
    payload: Value,
    json_output: bool,
) -> Result<Option<Value>> {
    let response = CommandHandler::new(loaded).execute(CommandRequest { action, payload });

    if json_output {
        print_json(&response, true)?;
        return Ok(None);
    }
    if response.is_error() {
        eprintln!(
            "Error: {}",
            response.message.as_deref().unwrap_or("Unknown error")
        );
        if let Some(hint) = response.error.as_ref().and_then(|e| e.hint.as_deref()) {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
    for hint in &response.hints {
        eprintln!("{}", hint.text);
    }
    Ok(Some(response.data))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serialize_json_pretty(value)?
    } else {
        serialize_json(value)?
    };
    println!("{output}");
    Ok(())
}
