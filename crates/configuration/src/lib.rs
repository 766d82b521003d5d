use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use settings::{Config, Defaults, GatewayConfig, LogFormat, LoggingConfig, RefreshConfig};

/// Base name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "coincidence";

/// Prefix for environment overrides, e.g. `COINCIDENCE__GATEWAY__BASE_URL`.
pub const ENV_PREFIX: &str = "COINCIDENCE";

/// Loads the application configuration.
///
/// Sources are layered from lowest to highest precedence: built-in defaults, the
/// TOML file (`path` if given, otherwise an optional `coincidence.toml`), then
/// `COINCIDENCE__*` environment variables. The result is validated before it
/// is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).format(config::FileFormat::Toml),
        None => config::File::with_name(CONFIG_FILE_NAME)
            .format(config::FileFormat::Toml)
            .required(false),
    };

    let builder = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;
    tracing::debug!(
        file = ?path,
        base_url = %config.gateway.base_url,
        debounce_ms = config.refresh.debounce_ms,
        "Configuration loaded."
    );

    Ok(config)
}

/// Checks the invariants serde cannot express.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = url::Url::parse(&config.gateway.base_url).map_err(|e| {
        ConfigError::ValidationError(format!(
            "gateway.base_url '{}' is not a valid URL: {}",
            config.gateway.base_url, e
        ))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "gateway.base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if config.refresh.debounce_ms == 0 {
        return Err(ConfigError::ValidationError(
            "refresh.debounce_ms must be greater than zero".to_string(),
        ));
    }
    if config.refresh.min_variables < 2 {
        return Err(ConfigError::ValidationError(
            "refresh.min_variables must be at least 2".to_string(),
        ));
    }
    Ok(())
}
