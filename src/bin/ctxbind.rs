use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use ctxbind::host::{JsonFileStore, LogNotifier, MemoryMacroRegistry, MemoryVariableStore};
use ctxbind::{RefreshKind, SyncEngine, build_skeleton, resolve, suggest};
use serde_json::Value;
use tracing::error;

/// Inspection harness for context bindings: resolve a path, list
/// suggestions, dump the skeleton, or run one synchronization pass against a
/// context snapshot.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Settings file (created with defaults when absent)
    #[arg(long = "settings", value_name = "PATH", default_value = "ctxbind_settings.json")]
    settings: PathBuf,
    /// Context snapshot to read (a JSON file)
    #[arg(long = "context", value_name = "PATH")]
    context: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one path against the context
    Resolve { path: String },
    /// List valid continuations of a partial path
    Suggest { partial: Option<String> },
    /// Dump the context's structural skeleton as JSON
    Skeleton,
    /// Run one synchronization pass and print what was published
    Refresh,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = match args.logging {
        Some(LogLevel::Error) => Some(tracing::Level::ERROR),
        Some(LogLevel::Warn) => Some(tracing::Level::WARN),
        Some(LogLevel::Info) => Some(tracing::Level::INFO),
        Some(LogLevel::Debug) => Some(tracing::Level::DEBUG),
        Some(LogLevel::Trace) => Some(tracing::Level::TRACE),
        None => None,
    };
    ctxbind::logging::init_with(None, level)?;

    let context = load_context(&args.context)?;
    if let Err(e) = run(&args, &context) {
        error!("Error: {e}");
        return Err(color_eyre::eyre::eyre!("{e}"));
    }
    Ok(())
}

fn run(args: &Args, context: &Value) -> anyhow::Result<()> {
    match &args.command {
        Command::Resolve { path } => match resolve(context, path) {
            Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
            None => println!("(not found)"),
        },
        Command::Suggest { partial } => {
            let skeleton = build_skeleton(context);
            for key in suggest(&skeleton, partial.as_deref().unwrap_or("")) {
                println!("{key}");
            }
        }
        Command::Skeleton => {
            let skeleton = build_skeleton(context);
            println!("{}", serde_json::to_string_pretty(&skeleton)?);
        }
        Command::Refresh => {
            let store = JsonFileStore::new(&args.settings);
            let settings = store
                .load()
                .map_err(|e| anyhow::anyhow!("cannot load settings: {e}"))?;
            let macros = Arc::new(MemoryMacroRegistry::default());
            let variables = Arc::new(MemoryVariableStore::default());
            let engine = SyncEngine::new(macros.clone(), variables.clone(), Arc::new(LogNotifier));

            let published = engine.refresh(&settings, context, RefreshKind::Manual);
            println!(
                "published {published} of {} mapping(s) in {} mode",
                settings.mappings.len(),
                settings.creation_mode,
            );
            for (name, entry) in macros.snapshot() {
                println!("macro    {name} = {} ({})", entry.value, entry.description);
            }
            for (name, value) in variables.snapshot() {
                println!("variable {name} = {value}");
            }
        }
    }
    Ok(())
}

fn load_context(path: &PathBuf) -> Result<Value> {
    let file = File::open(path)
        .map_err(|e| color_eyre::eyre::eyre!("cannot open context file {}: {e}", path.display()))?;
    Ok(serde_json::from_reader(file)?)
}
