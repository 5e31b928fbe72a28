// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for revgate.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. TOML files (in the order they are added)
//! 3. REVGATE_* env vars
//! 4. programmatic overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! REVGATE_CACHE__TTL_SECS=60            → cache.ttl_secs = 60
//! REVGATE_NOTIFY__ASSUME_FOCUSED=false  → notify.assume_focused = false
//! ```

pub mod loader;


use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::logging::LogConfig;

use loader::ConfigLoader;

/// Complete gate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Content cache retention options.
    pub cache: CacheConfig,
    /// Change-notification options.
    pub notify: NotifyConfig,
    /// Logging options.
    pub logging: LoggingConfig,
}

impl GateConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or does not match the `GateConfig` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match
    /// the `GateConfig` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validate the configuration after deserialization.
    ///
    /// # Errors
    ///
    /// Returns an error if a retention window is zero.
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_secs == 0 {
            anyhow::bail!("cache.ttl_secs must be greater than zero");
        }
        if self.cache.sweep_interval_secs == 0 {
            anyhow::bail!("cache.sweep_interval_secs must be greater than zero");
        }
        Ok(())
    }
}

/// Retention options for the virtual content cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Seconds an unpinned entry survives without being re-read.
    pub ttl_secs: u64,
    /// Seconds between periodic eviction sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 180,
            sweep_interval_secs: 300,
        }
    }
}

impl CacheConfig {
    /// TTL window as a [`Duration`].
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Sweep interval as a [`Duration`].
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Change-notification options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifyConfig {
    /// Whether the UI is assumed focused at startup. When false, the first
    /// notification pass suspends until a focus-regained signal arrives.
    pub assume_focused: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            assume_focused: true,
        }
    }
}

/// Logging options, convertible to [`LogConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Console `EnvFilter` directive.
    pub console_filter: String,
    /// File `EnvFilter` directive.
    pub file_filter: String,
    /// Optional log file path.
    pub log_file: Option<PathBuf>,
    /// Whether console output includes the module path.
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_filter: "info".to_string(),
            file_filter: "debug".to_string(),
            log_file: None,
            show_target: false,
        }
    }
}

impl LoggingConfig {
    /// Build the [`LogConfig`] for [`crate::logging::init_logging`].
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig::builder()
            .with_console_filter(self.console_filter.clone())
            .with_file_filter(self.file_filter.clone())
            .maybe_with_log_file(
                self.log_file
                    .as_ref()
                    .map(|p| p.display().to_string()),
            )
            .with_show_target(self.show_target)
            .build()
    }
}
