mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{LogSettings, RelaySettings, ServerSettings, Settings};

/// Prefix for environment overrides, e.g. `FRAMERELAY_SERVER__PORT=9100`.
pub const ENV_PREFIX: &str = "FRAMERELAY";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct, or an error if a source is malformed or a
/// value is out of range
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    let settings = Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        relay: RelaySettings {
            buffer_capacity: partial
                .relay
                .as_ref()
                .and_then(|r| r.buffer_capacity)
                .unwrap_or(default.relay.buffer_capacity),
        },
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
    };

    if settings.relay.buffer_capacity == 0 {
        return Err(ConfigError::Message(
            "relay.buffer_capacity must be at least 1".to_string(),
        ));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests;
