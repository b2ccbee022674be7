//! Configuration for the memory sweep

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Run configuration, threaded explicitly into every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Print the full success/failure lists and error detail
    #[serde(default)]
    pub verbose_output: bool,

    /// Append a timestamped record of the run to the log file
    #[serde(default)]
    pub log_enabled: bool,

    /// Purge the standby page list after bounding the file cache
    #[serde(default = "default_purge_standby")]
    pub purge_standby: bool,

    /// Pause after each successful working-set trim (milliseconds)
    #[serde(default = "default_trim_delay_ms")]
    pub trim_delay_ms: u64,

    /// Log file location; defaults to log.txt beside the executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            verbose_output: false,
            log_enabled: false,
            purge_standby: default_purge_standby(),
            trim_delay_ms: default_trim_delay_ms(),
            log_path: None,
        }
    }
}

fn default_purge_standby() -> bool {
    true
}

fn default_trim_delay_ms() -> u64 {
    10
}

impl SweepConfig {
    /// Load config from TOML file
    pub fn load(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Effective log path: the configured override, else `log.txt` beside
    /// the executable, else `log.txt` in the working directory.
    pub fn resolved_log_path(&self) -> PathBuf {
        if let Some(path) = &self.log_path {
            return path.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("log.txt")))
            .unwrap_or_else(|| PathBuf::from("log.txt"))
    }
}
