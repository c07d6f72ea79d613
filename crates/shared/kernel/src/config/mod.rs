use ::config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of structured environment overrides (`SPROUT__SERVER__PORT`, ...).
pub const ENV_PREFIX: &str = "SPROUT";
/// Bare variable that overrides `server.port`, as hosting platforms set it.
pub const PORT_VAR: &str = "PORT";
const DEFAULT_CONFIG_PATH: &str = "server";

#[sprout_derive::sprout_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: ::config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Invalid PORT value{}: {message}", format_context(.context))]
    InvalidPort { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Loads configuration from the file at `path` (default `server`, any extension the
/// `config` crate understands), then the process environment.
///
/// Precedence, lowest to highest:
/// 1. The config file, if it exists. A missing file is not an error; every field has a
///    default.
/// 2. `SPROUT__*` variables, with `__` separating nested keys
///    (`SPROUT__STORAGE__DATA_DIR` sets `storage.data_dir`).
/// 3. `PORT`, when set and non-blank, sets `server.port`.
///
/// # Errors
///
/// Fails if the file exists but is malformed, or if a value cannot be converted to the
/// target field type (e.g. `PORT=abc`).
///
/// # Example
///
/// ```rust
/// use sprout_kernel::config::load_config;
/// use sprout_kernel::domain::config::ApiConfig;
///
/// let cfg: ApiConfig = load_config(Some("does-not-exist")).unwrap();
/// assert!(cfg.server.port > 0);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_config_from(path, std::env::vars().collect())
}

/// [`load_config`] with an explicit environment instead of the process one.
pub fn load_config_from<T>(
    path: Option<impl AsRef<Path>>,
    env: HashMap<String, String>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), |p| p.as_ref().to_path_buf());
    let port = port_override(&env)?;

    info!(path = %path.display(), "Loading configuration");

    Config::builder()
        .add_source(File::from(path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(env)),
        )
        .set_override_option("server.port", port)
        .context("Failed to apply PORT override")?
        .build()
        .context("Failed to build configuration")?
        .try_deserialize::<T>()
        .context("Failed to deserialize configuration")
}

fn port_override(env: &HashMap<String, String>) -> Result<Option<i64>, ConfigError> {
    let Some(raw) = env.get(PORT_VAR).map(|raw| raw.trim()).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<u16>().map(|port| Some(i64::from(port))).map_err(|e| ConfigError::InvalidPort {
        message: format!("'{raw}': {e}").into(),
        context: None,
    })
}
