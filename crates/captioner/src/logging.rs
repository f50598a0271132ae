//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem for structured logging with support for
//! both human-readable and JSON output formats.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `level` - Default level for captioner's own crates and HTTP tracing.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
///
/// # Notes
///
/// - Log output goes to stderr (stdout is reserved for data output)
/// - The RUST_LOG environment variable overrides the level entirely
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    if json_format {
        // JSON format for machine parsing
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        // Pretty format for humans
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging with configuration from Config.
///
/// `--verbose` forces at least debug; `--json-logs` forces JSON output.
pub fn init_from_config(
    config: &captioner_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let level = effective_level(&config.logging.level, verbose_override);
    let json_format = json_logs_override || config.logging.format == "json";
    init(level, json_format);
}

fn effective_level(configured: &str, verbose: bool) -> &str {
    match configured {
        "trace" => "trace",
        _ if verbose => "debug",
        "error" | "warn" | "info" | "debug" => configured,
        _ => "info",
    }
}

/// ONNX Runtime is chatty at info; keep it at warn unless asked.
fn default_directives(level: &str) -> String {
    format!("warn,captioner={level},captioner_core={level},tower_http={level}")
}
