//! Configuration management for talk2type.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, lazy validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        AudioConfig, BehaviourConfig, LoggingConfig, TriggerConfig, WhisperConfig,
        DEFAULT_AUTO_PASTE,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use talk2type_core::{KeyIdentity, OrchestratorConfig};
use tracing::{debug, info, instrument, warn};

const DEFAULT_MODEL_FILE: &str = "ggml-base.en.bin";
const RECORDINGS_DIR_NAME: &str = "recordings";

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Trigger key and activation policy.
    #[serde(default)]
    pub trigger: TriggerConfig,
    /// Whisper model configuration.
    pub whisper: WhisperConfig,
    /// Audio capture and recordings directory.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Application behavior settings.
    #[serde(default)]
    pub behavior: BehaviourConfig,
    /// Log filter and optional log file.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    ///
    /// Note: This does NOT validate the model path exists. Call
    /// `validate_model_path()` before building the transcriber.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            Self::create_default()
        }
    }

    /// Read and parse the configuration file at `path`.
    #[track_caller]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Defaults with the model and recordings stored under `data_dir`.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        Config {
            trigger: TriggerConfig::default(),
            whisper: WhisperConfig::with_model_path(
                data_dir.join("models").join(DEFAULT_MODEL_FILE),
            ),
            audio: AudioConfig {
                recordings_dir: Some(data_dir.join(RECORDINGS_DIR_NAME)),
                ..AudioConfig::default()
            },
            behavior: BehaviourConfig {
                auto_paste: DEFAULT_AUTO_PASTE,
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Validate that the Whisper model file exists at the configured path.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_model_path(&self) -> AppResult<()> {
        if !self.whisper.model_path.exists() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Whisper model not found at: {:?}. Download a model or set whisper.model_path.",
                    self.whisper.model_path
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Where recordings are saved; the data directory when not configured.
    #[track_caller]
    pub fn recordings_dir(&self) -> AppResult<PathBuf> {
        match &self.audio.recordings_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join(RECORDINGS_DIR_NAME)),
        }
    }

    /// Orchestrator settings for the registered hotkey `identity`.
    #[track_caller]
    pub fn orchestrator_config(&self, identity: KeyIdentity) -> AppResult<OrchestratorConfig> {
        let mut config = OrchestratorConfig::new(
            identity,
            self.trigger.activation_policy(),
            self.recordings_dir()?,
        );
        config.debounce = self.trigger.debounce();
        config.sample_rate = self.audio.sample_rate;
        Ok(config)
    }

    /// Save configuration to the default location.
    #[track_caller]
    #[instrument]
    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "talk2type", "Talk2Type").ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn create_default() -> AppResult<Self> {
        let proj_dirs = Self::project_dirs()?;
        let config = Self::with_data_dir(proj_dirs.data_dir());

        config.save()?;

        warn!(
            model_path = ?config.whisper.model_path,
            "Default config created. Whisper model must be downloaded before recording."
        );

        Ok(config)
    }
}
