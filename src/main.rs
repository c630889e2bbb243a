use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cogent_config::PipelineDef;
use cogent_executor::{PipelineExecutor, TracingNotifier};
use cogent_registry::Registry;
use cogent_resolver::PipelineResolver;

/// Cogent - composable sequence analysis pipelines
#[derive(Parser)]
#[command(name = "cogent")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.cogent)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Log filter, e.g. `info` or `cogent_registry=debug` (overrides RUST_LOG)
  #[arg(long, global = true)]
  log_level: Option<String>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List available apps
  Apps {
    /// Only list apps whose qualified name contains this text
    #[arg(default_value = "")]
    filter: String,

    /// Print the listing as JSON
    #[arg(long)]
    json: bool,
  },

  /// Run a pipeline over one or more inputs
  Run {
    /// Pipeline file, or the name of a pipeline in <data-dir>/pipelines
    pipeline: String,

    /// Input for the first app. Without it, each non-empty stdin line is
    /// one input
    #[arg(long)]
    input: Option<String>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.log_level.as_deref());

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".cogent"),
  };

  let registry = cogent_builtin::registry().context("failed to install built-in apps")?;

  match cli.command {
    Some(Commands::Apps { filter, json }) => list_apps(&registry, &filter, json)?,
    Some(Commands::Run { pipeline, input }) => {
      run_pipeline(&registry, &data_dir, &pipeline, input)?;
    }
    None => {
      println!("cogent - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing(level: Option<&str>) {
  let filter = match level {
    Some(level) => EnvFilter::new(level),
    None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
  };

  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();
}

fn list_apps(registry: &Registry, filter: &str, json: bool) -> Result<()> {
  let listing = registry.available_apps(filter);
  if json {
    println!("{}", serde_json::to_string_pretty(&listing)?);
  } else {
    print!("{}", listing);
  }
  Ok(())
}

fn run_pipeline(
  registry: &Registry,
  data_dir: &Path,
  pipeline: &str,
  input: Option<String>,
) -> Result<()> {
  let path = pipeline_path(data_dir, pipeline);
  let def = PipelineDef::from_path(&path)
    .with_context(|| format!("failed to load pipeline: {}", path.display()))?;

  eprintln!("Loaded pipeline: {}", def.name);

  let chain = PipelineResolver::new(registry)
    .resolve(def)
    .context("failed to resolve pipeline")?;

  eprintln!("Resolved pipeline: {}", chain);

  let inputs = match input {
    Some(input) => vec![parse_input(&input)],
    None => read_inputs_from_stdin()?,
  };
  if inputs.is_empty() {
    bail!("no inputs given; pass --input or pipe inputs on stdin");
  }

  let executor = PipelineExecutor::with_notifier(TracingNotifier);
  let mut results = Vec::with_capacity(inputs.len());
  for input in inputs {
    let result = executor
      .run(&chain, input)
      .context("pipeline execution failed")?;
    results.push(result);
  }

  let completed = results.iter().filter(|r| r.is_completed()).count();
  eprintln!("Completed {} of {} inputs", completed, results.len());

  println!("{}", serde_json::to_string_pretty(&results)?);

  Ok(())
}

/// An existing path is used as is; anything else names a pipeline in the
/// data directory.
fn pipeline_path(data_dir: &Path, pipeline: &str) -> PathBuf {
  let path = PathBuf::from(pipeline);
  if path.exists() {
    return path;
  }
  data_dir.join("pipelines").join(format!("{}.json", pipeline))
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_input(text: &str) -> Value {
  serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn read_inputs_from_stdin() -> Result<Vec<Value>> {
  if io::stdin().is_terminal() {
    return Ok(Vec::new());
  }

  let mut text = String::new();
  io::stdin()
    .read_to_string(&mut text)
    .context("failed to read inputs from stdin")?;

  Ok(
    text
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(parse_input)
      .collect(),
  )
}
