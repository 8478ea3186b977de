//! # Configuration Utilities
//!
//! TOML configuration for the `stego` binary and the worker service.
//! Every section and key is optional; missing values fall back to defaults.
//!
//! ```toml
//! [codec]
//! default_bit_depth = 1
//!
//! [service]
//! max_concurrent_tasks = 4
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{bail, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::processing::bits::BitDepth;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error
///
/// # Example
/// ```ignore
/// let config: StegoConfig = load_config("config/stego.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    pub codec: CodecConfig,
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
}

/// Encoding defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Bit depth used when the caller does not pick one (1 or 2)
    pub default_bit_depth: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_bit_depth: 1,
        }
    }
}

/// Worker dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Maximum number of encode/decode jobs running at once
    pub max_concurrent_tasks: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        match self.level.parse::<LevelFilter>() {
            Ok(level) => Ok(level),
            Err(_) => bail!("unknown log level '{}'", self.level),
        }
    }
}

impl StegoConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &str) -> Result<Self> {
        let config: StegoConfig = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the codec or service cannot run with.
    pub fn validate(&self) -> Result<()> {
        BitDepth::try_from(self.codec.default_bit_depth)?;
        if self.service.max_concurrent_tasks == 0 {
            bail!("service.max_concurrent_tasks must be at least 1");
        }
        self.logging.level_filter()?;
        Ok(())
    }
}
