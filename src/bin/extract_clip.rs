//! extract-clip
//!
//! Extracts a sub-clip of a video file, re-encoded as H.264/AAC.
//!
//! ```bash
//! extract-clip talk.mp4 --start 12 --duration 7
//! extract-clip talk.mp4 -s 90 -d 30 -o highlight.mp4 --fps 30
//! ```

use anyhow::{Context, Result};
use clap::Parser;

use snipkit::cli::{commands, ExtractClipCli};
use snipkit::utils::logging::{init_logging, LoggingConfig};

fn main() -> Result<()> {
    let cli = ExtractClipCli::parse();
    init_logging(&LoggingConfig::from_flags(&cli.global.log_level, cli.global.log_json));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(commands::extract_clip(cli))
}
