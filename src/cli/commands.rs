//! Command implementations shared by the binaries

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::adapters::TomlConfigAdapter;
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::{ExtractClipCli, GifCli, GlobalArgs};
use crate::config_initialization::{
    initialize_configuration_hierarchy, SettingsOverrides, ToolSettings,
};
use crate::error::SnipkitError;
use crate::utils::Utils;

/// Run extract-clip
pub async fn extract_clip(cli: ExtractClipCli) -> Result<()> {
    let settings = load_settings(&cli.global, &SettingsOverrides::default()).await?;
    let container =
        DefaultAppContainer::new(settings).context("Failed to initialize the media library")?;

    let report = container
        .clip_interactor()
        .execute(cli.args.into_request())
        .await
        .map_err(SnipkitError::from)?;

    info!(
        "Clip written to {} ({}, {}) in {}",
        report.output.display(),
        report.range.duration,
        Utils::format_file_size(report.file_size),
        Utils::format_duration(Duration::from_secs_f64(report.elapsed_seconds))
    );

    if cli.global.json {
        print_report(&report)?;
    }
    Ok(())
}

/// Run mp4-to-gif
pub async fn mp4_to_gif(cli: GifCli) -> Result<()> {
    let settings = load_settings(&cli.global, &cli.args.overrides()).await?;
    let container =
        DefaultAppContainer::new(settings).context("Failed to initialize the media library")?;

    let request = cli.args.into_request()?;
    let report = container.gif_interactor().execute(request).await?;

    debug!(
        "Conversion finished with the {} in {}",
        report.backend,
        Utils::format_duration(Duration::from_secs_f64(report.elapsed_seconds))
    );

    if cli.global.json {
        print_report(&report)?;
    }
    Ok(())
}

async fn load_settings(global: &GlobalArgs, overrides: &SettingsOverrides) -> Result<ToolSettings> {
    let config = TomlConfigAdapter::new();
    initialize_configuration_hierarchy(&config, global.config.as_deref(), overrides).await
}

fn print_report<T: Serialize>(report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
