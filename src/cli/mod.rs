//! Command-line front ends for the two snipkit tools
//!
//! Each binary parses its own top-level struct; both share the global
//! logging, configuration and report flags.

use std::path::PathBuf;

use clap::{Args, Parser};

pub mod args;
pub mod commands;

pub use args::{ClipArgs, GifArgs};

/// Flags accepted by both tools
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (default: ./snipkit.toml when present)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Print the final report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,
}

/// Extract a sub-clip from a video file
#[derive(Parser, Debug)]
#[command(name = "extract-clip")]
#[command(about = "Extract a time-bounded clip from a video file")]
#[command(version)]
pub struct ExtractClipCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub args: ClipArgs,
}

/// Convert a video file to an animated GIF
#[derive(Parser, Debug)]
#[command(name = "mp4-to-gif")]
#[command(about = "Convert a video to an animated GIF with a two-pass palette")]
#[command(version)]
pub struct GifCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub args: GifArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definitions_are_consistent() {
        ExtractClipCli::command().debug_assert();
        GifCli::command().debug_assert();
    }

    #[test]
    fn test_extract_clip_defaults() {
        let cli = ExtractClipCli::try_parse_from(["extract-clip", "clip.mp4"]).unwrap();
        assert_eq!(cli.args.start, 0.0);
        assert_eq!(cli.args.duration, 7.0);
        assert!(cli.args.output.is_none());
        assert!(cli.args.fps.is_none());
        assert_eq!(cli.global.log_level, "info");
        assert!(!cli.global.json);
    }

    #[test]
    fn test_extract_clip_accepts_negative_start() {
        let cli =
            ExtractClipCli::try_parse_from(["extract-clip", "clip.mp4", "-s", "-3", "-d", "2.5"])
                .unwrap();
        assert_eq!(cli.args.start, -3.0);
        assert_eq!(cli.args.duration, 2.5);
    }

    #[test]
    fn test_non_finite_times_rejected() {
        assert!(ExtractClipCli::try_parse_from(["extract-clip", "clip.mp4", "-d", "inf"]).is_err());
        assert!(ExtractClipCli::try_parse_from(["extract-clip", "clip.mp4", "-s", "NaN"]).is_err());
        assert!(
            GifCli::try_parse_from(["mp4-to-gif", "in.mp4", "-o", "out.gif", "-d", "inf"]).is_err()
        );
        assert!(
            GifCli::try_parse_from(["mp4-to-gif", "in.mp4", "-o", "out.gif", "-s", "-inf"]).is_err()
        );
    }

    #[test]
    fn test_zero_fps_rejected() {
        assert!(ExtractClipCli::try_parse_from(["extract-clip", "clip.mp4", "--fps", "0"]).is_err());
        assert!(GifCli::try_parse_from(["mp4-to-gif", "in.mp4", "-o", "out.gif", "-f", "0"]).is_err());
    }

    #[test]
    fn test_gif_defaults() {
        let cli = GifCli::try_parse_from(["mp4-to-gif", "in.mp4", "-o", "out.gif"]).unwrap();
        assert_eq!(cli.args.width, 1280);
        assert_eq!(cli.args.height, 720);
        assert_eq!(cli.args.fps, 15);
        assert!(cli.args.start.is_none());
        assert!(cli.args.duration.is_none());
        assert!(!cli.args.force_fallback);
    }

    #[test]
    fn test_gif_output_required() {
        assert!(GifCli::try_parse_from(["mp4-to-gif", "in.mp4"]).is_err());
    }

    #[test]
    fn test_global_flags_after_positional() {
        let cli = GifCli::try_parse_from([
            "mp4-to-gif",
            "in.mp4",
            "-o",
            "out.gif",
            "--json",
            "--log-level",
            "debug",
            "--force-fallback",
        ])
        .unwrap();
        assert!(cli.global.json);
        assert_eq!(cli.global.log_level, "debug");
        assert!(cli.args.force_fallback);
    }
}
