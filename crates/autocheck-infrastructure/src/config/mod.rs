use anyhow::{Context, Result};
use autocheck_domain::schedule::TimeOfDay;
use autocheck_domain::shared::DomainError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

mod layout;
mod timings;

pub use layout::{default_layout, SecretRef, TabLayout};
pub use timings::RunnerTimings;

pub const CONFIG_FILE_NAME: &str = "autocheck.json";
const APP_DIR_NAME: &str = "autocheck";

/// Log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(DomainError::InvalidInput(format!("Unknown log level: {}", other))),
        }
    }
}

/// Scheduled-check timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleConfig {
    pub target_time: TimeOfDay,
    pub poll_interval_secs: u64,
    pub progress_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let timings = RunnerTimings::default();
        Self {
            target_time: timings.scheduled_at,
            poll_interval_secs: timings.wait_poll.as_secs(),
            progress_interval_secs: timings.wait_progress.as_secs(),
        }
    }
}

/// Persistent configuration, stored as pretty JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub schedule: ScheduleConfig,
    pub shutdown_grace_secs: u64,
    /// Replaces the builtin tab layout when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Vec<TabLayout>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            schedule: ScheduleConfig::default(),
            shutdown_grace_secs: RunnerTimings::default().shutdown_grace.as_secs(),
            tabs: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str::<AppConfig>(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        } else {
            AppConfig::default()
        };

        config.validate()?;

        info!("📁 Config loaded from: {:?}", path);
        info!(
            "⏰ Scheduled check at {} (poll {}s, progress {}s)",
            config.schedule.target_time,
            config.schedule.poll_interval_secs,
            config.schedule.progress_interval_secs
        );

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!("💾 Config saved to: {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.schedule.poll_interval_secs == 0 {
            return Err(DomainError::Validation(
                "schedule.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.schedule.progress_interval_secs == 0 {
            return Err(DomainError::Validation(
                "schedule.progress_interval_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(tabs) = &self.tabs {
            if tabs.is_empty() {
                return Err(DomainError::Validation(
                    "tabs override must list at least one tab".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn timings(&self) -> RunnerTimings {
        RunnerTimings {
            scheduled_at: self.schedule.target_time,
            wait_poll: Duration::from_secs(self.schedule.poll_interval_secs),
            wait_progress: Duration::from_secs(self.schedule.progress_interval_secs),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        }
    }

    /// Configured tab layout, or the builtin one
    pub fn layout(&self) -> Vec<TabLayout> {
        self.tabs.clone().unwrap_or_else(default_layout)
    }

    /// `<config dir>/autocheck/autocheck.json`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Failed to get config dir"))?;
        Ok(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// `<data dir>/autocheck/logs`
    pub fn default_log_dir() -> Result<PathBuf> {
        let dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Failed to get data dir"))?;
        Ok(dir.join(APP_DIR_NAME).join("logs"))
    }
}
