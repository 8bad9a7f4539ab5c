// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config_initialization::ToolSettings;
use crate::domain::errors::*;
use crate::ports::*;

/// Top-level layout of a config file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    snipkit: Option<SettingsLayer>,
}

/// The keys a config file may set; absent keys keep their current value
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsLayer {
    ffmpeg_program: Option<PathBuf>,
    ffmpeg_log_level: Option<String>,
    dither: Option<String>,
    video_codec: Option<String>,
    audio_codec: Option<String>,
    threads: Option<u32>,
}

impl SettingsLayer {
    fn apply(self, settings: &mut ToolSettings) {
        if let Some(value) = self.ffmpeg_program {
            settings.ffmpeg_program = value;
        }
        if let Some(value) = self.ffmpeg_log_level {
            settings.ffmpeg_log_level = value;
        }
        if let Some(value) = self.dither {
            settings.dither = value;
        }
        if let Some(value) = self.video_codec {
            settings.video_codec = value;
        }
        if let Some(value) = self.audio_codec {
            settings.audio_codec = value;
        }
        if let Some(value) = self.threads {
            settings.threads = value;
        }
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    settings: Arc<RwLock<ToolSettings>>,
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter holding the defaults
    pub fn new() -> Self {
        Self {
            settings: Arc::new(RwLock::new(ToolSettings::default())),
        }
    }

    /// Layer a TOML document over the current settings
    fn deserialize_config(&self, toml_content: &str) -> Result<(), DomainError> {
        let parsed: ConfigFile = toml::from_str(toml_content)
            .map_err(|e| DomainError::ConfigError(format!("Failed to parse TOML config: {}", e)))?;

        if let Some(layer) = parsed.snipkit {
            let mut settings = self.write_settings()?;
            layer.apply(&mut settings);
        }
        Ok(())
    }

    /// Apply overrides from any variable source
    fn apply_environment_from<F>(&self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = self.write_settings()?;
        let mut applied = 0;
        for (variable, key) in ToolSettings::ENV_KEYS {
            if let Some(value) = lookup(variable) {
                info!("Found environment override: {} = {}", variable, value);
                settings.set(key, &value)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    fn write_settings(&self) -> Result<std::sync::RwLockWriteGuard<'_, ToolSettings>, DomainError> {
        self.settings
            .write()
            .map_err(|_| DomainError::ConfigError("Configuration lock poisoned".to_string()))
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigPort for TomlConfigAdapter {
    async fn load_config(&self, file_path: &Path) -> Result<(), DomainError> {
        if !file_path.exists() {
            return Err(DomainError::FsFail(format!(
                "Config file does not exist: {}",
                file_path.display()
            )));
        }

        let content = std::fs::read_to_string(file_path)
            .map_err(|e| DomainError::FsFail(format!("Failed to read config file: {}", e)))?;

        self.deserialize_config(&content)?;
        debug!("Loaded config file {}", file_path.display());

        Ok(())
    }

    async fn apply_environment(&self) -> Result<usize, DomainError> {
        self.apply_environment_from(|variable| std::env::var(variable).ok())
    }

    async fn settings(&self) -> ToolSettings {
        match self.settings.read() {
            Ok(settings) => settings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn validate_config(&self) -> Result<(), DomainError> {
        self.settings().await.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_defaults() {
        let adapter = TomlConfigAdapter::new();
        assert_eq!(adapter.settings().await, ToolSettings::default());
    }

    #[tokio::test]
    async fn test_file_layers_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snipkit.toml");
        std::fs::write(
            &path,
            "[snipkit]\nffmpeg_program = \"/opt/bin/ffmpeg\"\nthreads = 8\n",
        )
        .unwrap();

        let adapter = TomlConfigAdapter::new();
        adapter.load_config(&path).await.unwrap();

        let settings = adapter.settings().await;
        assert_eq!(settings.ffmpeg_program, PathBuf::from("/opt/bin/ffmpeg"));
        assert_eq!(settings.threads, 8);
        assert_eq!(settings.video_codec, "libx264");
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let adapter = TomlConfigAdapter::new();
        let result = adapter.deserialize_config("[snipkit]\ncrf = 18\n");
        assert!(matches!(result, Err(DomainError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let adapter = TomlConfigAdapter::new();
        let result = adapter.load_config(Path::new("/nonexistent/snipkit.toml")).await;
        assert!(matches!(result, Err(DomainError::FsFail(_))));
    }

    #[tokio::test]
    async fn test_environment_wins_over_file() {
        let adapter = TomlConfigAdapter::new();
        adapter
            .deserialize_config("[snipkit]\ndither = \"bayer\"\nthreads = 2\n")
            .unwrap();

        let env: HashMap<&str, &str> = [("SNIPKIT_DITHER", "none"), ("SNIPKIT_THREADS", "6")]
            .into_iter()
            .collect();
        let applied = adapter
            .apply_environment_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(applied, 2);
        let settings = adapter.settings().await;
        assert_eq!(settings.dither, "none");
        assert_eq!(settings.threads, 6);
        assert!(adapter.validate_config().await.is_ok());
    }

    #[tokio::test]
    async fn test_bad_environment_value() {
        let adapter = TomlConfigAdapter::new();
        let result = adapter.apply_environment_from(|key| {
            (key == "SNIPKIT_THREADS").then(|| "many".to_string())
        });
        assert!(result.is_err());
    }
}
