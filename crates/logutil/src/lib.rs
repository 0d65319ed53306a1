//! Utilities for logging.

use std::io;

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Structured, one JSON object per line.
    Json,
    /// Multi-line, human readable.
    Pretty,
    /// Single line, human readable.
    #[default]
    Compact,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }
}

/// Configure the global logger.
///
/// `RUST_LOG` takes precedence over `default_level` when set.
pub fn configure_global_logger(
    default_level: Level,
    format: LogFormat,
) -> Result<(), SetGlobalDefaultError> {
    let builder = subscriber_builder(default_level);

    match format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.json().with_current_span(false).finish())
        }
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish()),
        LogFormat::Compact => tracing::subscriber::set_global_default(builder.compact().finish()),
    }
}

/// Install a test writer at debug level. Safe to call from every test, only
/// the first call has an effect.
pub fn init_test() {
    let _ = tracing::subscriber::set_global_default(
        subscriber_builder(Level::DEBUG)
            .with_test_writer()
            .compact()
            .finish(),
    );
}

fn subscriber_builder(default_level: Level) -> SubscriberBuilder<
    tracing_subscriber::fmt::format::DefaultFields,
    tracing_subscriber::fmt::format::Format,
    EnvFilter,
    fn() -> io::Stderr,
> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_writer(io::stderr as fn() -> io::Stderr)
        .with_env_filter(filter)
        .with_thread_ids(true)
}
