//! Configuration loader
//!
//! Loads `ClientConfig` from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If any `KEEPER_*` variable is set, the configuration is built from the
//!    environment on top of the defaults
//! 2. Otherwise the file named by `KEEPER_CONFIG` is loaded, or the first
//!    file found by [`probe_config_paths`]
//! 3. With no variables and no file, the defaults are used
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `KEEPER_NAMESPACE`: Namespace prefix (`/` for none)
//! - `KEEPER_RETRY_MAX_ATTEMPTS`: Total attempts including the first
//! - `KEEPER_RETRY_BACKOFF`: `fixed`, `linear` or `exponential`
//! - `KEEPER_RETRY_BASE_DELAY_MS`: Base delay in milliseconds
//! - `KEEPER_RETRY_MAX_DELAY_MS`: Upper bound for one delay in milliseconds
//! - `KEEPER_RETRY_JITTER`: `none`, `full` or `equal`
//! - `KEEPER_RETRY_MAX_TOTAL_MS`: Total retry budget in milliseconds (`0` for
//!   unbounded)
//! - `KEEPER_BACKGROUND_MAX_CONCURRENT`: Background operation limit
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./keeper.json` or `./keeper.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use keeper_common::CommonError;
use keeper_domain::constants::{
    ENV_BACKGROUND_MAX_CONCURRENT, ENV_CONFIG_PATH, ENV_NAMESPACE, ENV_RETRY_BACKOFF,
    ENV_RETRY_BASE_DELAY_MS, ENV_RETRY_JITTER, ENV_RETRY_MAX_ATTEMPTS, ENV_RETRY_MAX_DELAY_MS,
    ENV_RETRY_MAX_TOTAL_MS,
};
use keeper_domain::{BackoffKind, ClientConfig, JitterKind, KeeperResult};

const ENV_VARS: [&str; 8] = [
    ENV_NAMESPACE,
    ENV_RETRY_MAX_ATTEMPTS,
    ENV_RETRY_BACKOFF,
    ENV_RETRY_BASE_DELAY_MS,
    ENV_RETRY_MAX_DELAY_MS,
    ENV_RETRY_JITTER,
    ENV_RETRY_MAX_TOTAL_MS,
    ENV_BACKGROUND_MAX_CONCURRENT,
];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns a configuration error if:
/// - A `KEEPER_*` variable has an invalid value
/// - The configured or probed file cannot be read or parsed
/// - The resulting configuration fails validation
pub fn load() -> KeeperResult<ClientConfig> {
    if let Some(config) = config_from_env()? {
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    let explicit = std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
    if explicit.is_none() && probe_config_paths().is_none() {
        tracing::debug!("No configuration source found, using defaults");
        return Ok(ClientConfig::default());
    }
    load_from_file(explicit)
}

/// Load configuration from environment variables
///
/// Unset variables keep their default values, but at least one `KEEPER_*`
/// variable must be present.
///
/// # Errors
/// Returns a configuration error if no variable is set or a value is
/// invalid.
pub fn load_from_env() -> KeeperResult<ClientConfig> {
    config_from_env()?.ok_or_else(|| {
        CommonError::config("No KEEPER_* environment variables are set").into()
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, the file named by `KEEPER_CONFIG` is used, then
/// [`probe_config_paths`]. Format is detected by file extension.
///
/// # Errors
/// Returns a configuration error if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> KeeperResult<ClientConfig> {
    let config_path = match path.or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from))
    {
        Some(p) => {
            if !p.exists() {
                return Err(CommonError::config(format!(
                    "Config file not found: {}",
                    p.display()
                ))
                .into());
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CommonError::config("No config file found in any of the standard locations")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CommonError::config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> KeeperResult<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let parsed = match extension {
        "toml" => toml::from_str(contents).map_err(|e| {
            CommonError::serialization_format("toml", format!("Invalid TOML format: {e}"))
        }),
        "json" => serde_json::from_str(contents).map_err(|e| {
            CommonError::serialization_format("json", format!("Invalid JSON format: {e}"))
        }),
        _ => Err(CommonError::config(format!("Unsupported config format: {extension}"))),
    };
    Ok(parsed?)
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./keeper.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("keeper.json"),
        dir.join("keeper.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Build a configuration from the environment, or `None` if no variable is
/// set
fn config_from_env() -> KeeperResult<Option<ClientConfig>> {
    if !ENV_VARS.iter().any(|key| std::env::var_os(key).is_some()) {
        return Ok(None);
    }

    let mut config = ClientConfig::default();

    if let Ok(namespace) = std::env::var(ENV_NAMESPACE) {
        let trimmed = namespace.trim();
        config.namespace = (!trimmed.is_empty() && trimmed != "/").then(|| trimmed.to_string());
    }

    let retry = &mut config.retry;
    if let Some(attempts) = env_parse::<u32>(ENV_RETRY_MAX_ATTEMPTS)? {
        retry.max_attempts = attempts;
    }
    if let Some(backoff) = env_parse::<BackoffKind>(ENV_RETRY_BACKOFF)? {
        retry.backoff = backoff;
    }
    if let Some(ms) = env_parse::<u64>(ENV_RETRY_BASE_DELAY_MS)? {
        retry.base_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = env_parse::<u64>(ENV_RETRY_MAX_DELAY_MS)? {
        retry.max_delay = Duration::from_millis(ms);
    }
    if let Some(jitter) = env_parse::<JitterKind>(ENV_RETRY_JITTER)? {
        retry.jitter = jitter;
    }
    if let Some(ms) = env_parse::<u64>(ENV_RETRY_MAX_TOTAL_MS)? {
        retry.max_total_time = (ms > 0).then(|| Duration::from_millis(ms));
    }

    if let Some(limit) = env_parse::<usize>(ENV_BACKGROUND_MAX_CONCURRENT)? {
        config.background.max_concurrent = Some(limit);
    }

    config.validate()?;
    Ok(Some(config))
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns a configuration error naming `key` if the value does not parse.
fn env_parse<T>(key: &str) -> KeeperResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            CommonError::config_field(key, format!("Invalid value {raw:?} for {key}: {e}")).into()
        }),
        Err(_) => Ok(None),
    }
}
