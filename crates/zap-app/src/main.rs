mod cli;
mod commands;

use std::process::ExitCode;

use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;
use zap_config::schema::{LogLevel, ZapConfig};

const DEFAULT_DIRECTIVE: &str = "zap=info";

/// Build the log filter: `--log-level`, else the config level, else `zap=info`.
fn log_filter(cli_directive: Option<&str>, config_level: Option<LogLevel>) -> EnvFilter {
    let directive = match (cli_directive, config_level) {
        (Some(directive), _) => directive.to_string(),
        (None, Some(level)) => format!("zap={}", level.as_directive()),
        (None, None) => DEFAULT_DIRECTIVE.to_string(),
    };
    let directive: Directive = directive.parse().unwrap_or_else(|e| {
        eprintln!("invalid log directive {directive:?} ({e}), using {DEFAULT_DIRECTIVE}");
        DEFAULT_DIRECTIVE
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into())
    });
    EnvFilter::from_default_env().add_directive(directive)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Config is read before logging so its level can seed the filter.
    let loaded = zap_config::load_config(args.config.as_deref());
    let config_level = loaded.as_ref().ok().map(|c| c.logging.level);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(args.log_level.as_deref(), config_level))
        .init();

    tracing::debug!("zap v{} starting", env!("CARGO_PKG_VERSION"));

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        ZapConfig::default()
    });
    if let Some(ref path) = args.config {
        tracing::debug!("Using config override: {}", path.display());
    }
    tracing::trace!(config = %zap_config::config_to_json(&config), "config loaded");

    match commands::run(args.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("zap: {e}");
            ExitCode::FAILURE
        }
    }
}
