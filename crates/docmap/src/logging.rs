use crate::config::{ConfigError, LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. A second call fails with
/// `ConfigError::Logging` and leaves the first subscriber in place.
pub fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_new(&config.level).map_err(|err| ConfigError::Invalid {
        field: "logging.level",
        reason: err.to_string(),
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|err| ConfigError::Logging(err.to_string()))
}
