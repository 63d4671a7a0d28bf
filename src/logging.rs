use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize JSON logging.
///
/// When `quiet` is true only error-level events are emitted, otherwise
/// info and above. `RUST_LOG` directives are honoured on top of that.
/// With a `log_file`, events are appended there instead of stderr, which
/// the full-screen display cannot share.
pub fn init_logging(quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let directive = if quiet { "papi_timer=error" } else { "papi_timer=info" };
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(Mutex::new(file))
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .try_init()?;
        }
    }
    Ok(())
}
