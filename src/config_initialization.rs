//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::ClipEncoding;
use crate::ports::ConfigPort;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "snipkit.toml";

/// Effective tool settings after all layers are applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Executable name or path of the external media tool
    pub ffmpeg_program: PathBuf,
    /// Value passed to the tool's `-v`
    pub ffmpeg_log_level: String,
    /// Dither algorithm for `paletteuse`
    pub dither: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub threads: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_program: PathBuf::from("ffmpeg"),
            ffmpeg_log_level: "warning".to_string(),
            dither: "sierra2_4a".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            threads: 4,
        }
    }
}

impl ToolSettings {
    /// Environment variables and the setting each one overrides
    pub const ENV_KEYS: [(&'static str, &'static str); 6] = [
        ("SNIPKIT_FFMPEG", "ffmpeg_program"),
        ("SNIPKIT_FFMPEG_LOG_LEVEL", "ffmpeg_log_level"),
        ("SNIPKIT_DITHER", "dither"),
        ("SNIPKIT_VIDEO_CODEC", "video_codec"),
        ("SNIPKIT_AUDIO_CODEC", "audio_codec"),
        ("SNIPKIT_THREADS", "threads"),
    ];

    /// Set one setting from its textual form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), DomainError> {
        match key {
            "ffmpeg_program" => self.ffmpeg_program = PathBuf::from(value),
            "ffmpeg_log_level" => self.ffmpeg_log_level = value.to_string(),
            "dither" => self.dither = value.to_string(),
            "video_codec" => self.video_codec = value.to_string(),
            "audio_codec" => self.audio_codec = value.to_string(),
            "threads" => {
                self.threads = value.trim().parse().map_err(|e| {
                    DomainError::ConfigError(format!("Invalid thread count '{}': {}", value, e))
                })?
            }
            other => {
                return Err(DomainError::ConfigError(format!(
                    "Unknown setting: {}",
                    other
                )))
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.ffmpeg_program.as_os_str().is_empty() {
            return Err(DomainError::ConfigError(
                "ffmpeg_program cannot be empty".to_string(),
            ));
        }
        for (name, value) in [
            ("video_codec", &self.video_codec),
            ("audio_codec", &self.audio_codec),
            ("dither", &self.dither),
            ("ffmpeg_log_level", &self.ffmpeg_log_level),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::ConfigError(format!("{} cannot be empty", name)));
            }
        }
        if self.threads == 0 {
            return Err(DomainError::ConfigError(
                "threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Clip encoding parameters with an optional frame-rate override
    pub fn clip_encoding(&self, fps: Option<u32>) -> ClipEncoding {
        ClipEncoding {
            video_codec: self.video_codec.clone(),
            audio_codec: self.audio_codec.clone(),
            threads: self.threads as usize,
            fps,
        }
    }
}

/// Settings given directly on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub ffmpeg_program: Option<PathBuf>,
    pub dither: Option<String>,
}

impl SettingsOverrides {
    fn apply(&self, settings: &mut ToolSettings) -> usize {
        let mut applied = 0;
        if let Some(program) = &self.ffmpeg_program {
            info!("CLI override: ffmpeg_program = {}", program.display());
            settings.ffmpeg_program = program.clone();
            applied += 1;
        }
        if let Some(dither) = &self.dither {
            info!("CLI override: dither = {}", dither);
            settings.dither = dither.clone();
            applied += 1;
        }
        applied
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub async fn initialize_configuration_hierarchy(
    config: &dyn ConfigPort,
    config_file: Option<&Path>,
    overrides: &SettingsOverrides,
) -> Result<ToolSettings> {
    debug!("Initializing configuration hierarchy");

    // Step 1: defaults are loaded by the adapter
    // Step 2: config file, explicit or from the working directory
    match config_file {
        Some(path) => config
            .load_config(path)
            .await
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                info!("Loading configuration from: {}", default_path.display());
                config.load_config(default_path).await?;
            } else {
                debug!("No config file loaded");
            }
        }
    }

    // Step 3: environment
    let env_overrides = config.apply_environment().await?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }
    config.validate_config().await?;

    // Step 4: CLI
    let mut settings = config.settings().await;
    let cli_overrides = overrides.apply(&mut settings);
    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }
    settings.validate()?;

    debug!("Configuration hierarchy initialized: {:?}", settings);
    Ok(settings)
}
