//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SENSOR_BRINGUP";

/// Config file name
const CONFIG_FILE_NAME: &str = "sensor-bringup.toml";

/// Per-user config directory name
const APP_DIR_NAME: &str = "sensor-bringup";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "SENSOR_BRINGUP_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `SENSOR_BRINGUP_CONFIG` environment variable (explicit path)
    /// 2. `./sensor-bringup.toml` (current directory)
    /// 3. `~/.config/sensor-bringup/sensor-bringup.toml` (XDG on Linux/macOS)
    /// 4. `%APPDATA%\sensor-bringup\sensor-bringup.toml` (Windows)
    /// 5. Built-in defaults (no file required)
    ///
    /// Environment variables override file values; the result is validated.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = if let Some(ref path) = config_path {
            load_from_file(path)?
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self { config_path, config })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader from built-in defaults, ignoring any config file.
    ///
    /// Environment overrides still apply and are validated like a file would be.
    pub fn with_defaults() -> ConfigResult<Self> {
        let mut config = Config::default();
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: None,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Save the current configuration to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        save_to_file(&self.config, path.as_ref())
    }
}

/// Resolve the configuration file path using standard locations.
fn resolve_config_path() -> Option<PathBuf> {
    // 1. Explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Current directory
    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. XDG config directory (Linux/macOS) or APPDATA (Windows)
    if let Some(config_dir) = get_config_dir() {
        let app_config = config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
        if app_config.exists() {
            return Some(app_config);
        }
    }

    None
}

/// Get the platform-specific config directory.
fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Save configuration to a file.
fn save_to_file(config: &Config, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse `SENSOR_BRINGUP_<key>` if it is set.
fn env_value<T: FromStr>(key: &str, what: &str) -> ConfigResult<Option<T>> {
    let var = format!("{}_{}", ENV_PREFIX, key);
    match std::env::var(&var) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::env_parse(var, format!("Invalid {what}"))),
        Err(_) => Ok(None),
    }
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern: `SENSOR_BRINGUP_<SECTION>_<KEY>`
/// For example:
/// - `SENSOR_BRINGUP_POLICY_RETRY_DELAY_MS=750`
/// - `SENSOR_BRINGUP_SUITE_DATA_LINE=21`
/// - `SENSOR_BRINGUP_LOGGING_LEVEL=debug`
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    // Policy overrides
    if let Some(v) = env_value("POLICY_MAX_ATTEMPTS", "attempt count")? {
        config.policy.max_attempts = v;
    }
    if let Some(v) = env_value("POLICY_BUS_SETTLE_MS", "delay")? {
        config.policy.bus_settle_ms = v;
    }
    if let Some(v) = env_value("POLICY_DEVICE_SETTLE_MS", "delay")? {
        config.policy.device_settle_ms = v;
    }
    if let Some(v) = env_value("POLICY_RETRY_DELAY_MS", "delay")? {
        config.policy.retry_delay_ms = v;
    }

    // Suite overrides
    if let Some(v) = env_value("SUITE_DATA_LINE", "line identifier")? {
        config.suite.data_line = v;
    }
    if let Some(v) = env_value("SUITE_CLOCK_LINE", "line identifier")? {
        config.suite.clock_line = v;
    }
    if let Some(v) = env_value("SUITE_SENSOR_PRESENT", "boolean")? {
        config.suite.sensor_present = v;
    }
    if let Some(v) = env_value("SUITE_REAL_DELAYS", "boolean")? {
        config.suite.real_delays = v;
    }

    // Logging overrides
    if let Ok(val) = std::env::var(format!("{}_LOGGING_LEVEL", ENV_PREFIX)) {
        config.logging.level = val;
    }
    if let Some(v) = env_value("LOGGING_FORMAT", "log format")? {
        config.logging.format = v;
    }

    Ok(())
}
