mod boot;
mod cli;
mod repl;

use std::path::Path;
use std::process::ExitCode;

use nate_config::NateConfig;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

use crate::cli::Args;

const DEFAULT_DIRECTIVE: &str = "nate=info";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Load environment variables from a .env file (KEY=VALUE lines) in the
/// current directory. Variables already set win.
fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

fn load_dotenv_from(path: &Path) {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}

fn parse_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {directive:?} ({e}); using {DEFAULT_DIRECTIVE}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    })
}

/// Install the stderr subscriber. The returned handle swaps the filter once
/// the config file has been read.
fn init_logging(directive: &str) -> FilterHandle {
    let (filter, handle) = reload::Layer::new(parse_filter(directive));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

/// Filter from `[logging].level`, unless `--log-level` already picked one.
fn config_directive(args: &Args, config: &NateConfig) -> Option<String> {
    args.log_level
        .is_none()
        .then(|| format!("nate={}", config.logging.level.as_directive()))
}

fn main() -> ExitCode {
    // Environment edits must happen before the runtime spawns workers.
    load_dotenv();
    let args = cli::parse();

    let logging = init_logging(args.log_level.as_deref().unwrap_or(DEFAULT_DIRECTIVE));

    let config = match nate_config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Config load failed: {e}");
            eprintln!("nate: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(directive) = config_directive(&args, &config) {
        if let Err(e) = logging.reload(parse_filter(&directive)) {
            eprintln!("nate: cannot apply log level {directive:?}: {e}");
        }
    }

    tracing::info!("Nate v{} starting...", env!("CARGO_PKG_VERSION"));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {e}");
            eprintln!("nate: {e}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(run(args, config))
}

async fn run(args: Args, config: NateConfig) -> ExitCode {
    let (mut session, gateway) = match boot::start(&args, config) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            eprintln!("nate: {e}");
            return ExitCode::FAILURE;
        }
    };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    if let Err(e) = repl::run(&mut session, &gateway, stdin.lock(), &mut stdout).await {
        tracing::error!("REPL error: {e}");
        eprintln!("nate: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(calls = session.tracker().call_count(), "Shutdown complete");
    ExitCode::SUCCESS
}
