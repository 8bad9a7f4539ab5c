//! mp4-to-gif
//!
//! Converts a video file to an animated GIF. Uses ffmpeg's two-pass palette
//! pipeline when ffmpeg is installed and falls back to the in-process media
//! library otherwise.
//!
//! ```bash
//! mp4-to-gif talk.mp4 -o talk.gif --width 640 --height 360 -s 74 -d 4 -f 15
//! ```

use anyhow::{Context, Result};
use clap::Parser;

use snipkit::cli::{commands, GifCli};
use snipkit::utils::logging::{init_logging, LoggingConfig};

fn main() -> Result<()> {
    let cli = GifCli::parse();
    init_logging(&LoggingConfig::from_flags(&cli.global.log_level, cli.global.log_json));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(commands::mp4_to_gif(cli))
}
