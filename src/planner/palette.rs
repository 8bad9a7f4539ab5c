//! Two-pass palette pipeline for GIF output
//!
//! Pass one builds a palette from the trimmed, resampled and scaled stream.
//! Pass two re-applies the same trim and filters and maps every frame onto
//! that palette with dithering.

use std::path::Path;

use crate::domain::model::{FrameSize, SeekWindow};
use crate::planner::command::FfmpegCommand;

/// Parameters shared by both passes
#[derive(Debug, Clone, Copy)]
pub struct PaletteJob<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub size: FrameSize,
    pub window: SeekWindow,
    pub fps: u32,
}

/// Tool-level knobs that do not depend on the job
#[derive(Debug, Clone, Copy)]
pub struct PaletteOptions<'a> {
    pub program: &'a Path,
    pub log_level: &'a str,
    pub dither: &'a str,
}

/// The two commands of the palette pipeline, in execution order
#[derive(Debug, Clone, PartialEq)]
pub struct PalettePipeline {
    pub palettegen: FfmpegCommand,
    pub paletteuse: FfmpegCommand,
}

impl PalettePipeline {
    /// Plan both passes; the palette image is written to `palette`
    pub fn plan(job: &PaletteJob<'_>, options: &PaletteOptions<'_>, palette: &Path) -> Self {
        let chain = base_filter_chain(job.fps, job.size);

        let palettegen = FfmpegCommand::new(options.program)
            .log_level(options.log_level)
            .input_with_window(job.input, job.window)
            .video_filter(format!("{},palettegen", chain))
            .overwrite_output(palette);

        let paletteuse = FfmpegCommand::new(options.program)
            .log_level(options.log_level)
            .input_with_window(job.input, job.window)
            .input(palette)
            .filter_complex(format!(
                "{}[x];[x][1:v]paletteuse=dither={}",
                chain, options.dither
            ))
            .overwrite_output(job.output);

        Self {
            palettegen,
            paletteuse,
        }
    }

    /// Stage names paired with their commands
    pub fn stages(&self) -> [(&'static str, &FfmpegCommand); 2] {
        [("palettegen", &self.palettegen), ("paletteuse", &self.paletteuse)]
    }
}

fn base_filter_chain(fps: u32, size: FrameSize) -> String {
    format!(
        "fps={},scale={}:{}:flags=lanczos",
        fps, size.width, size.height
    )
}
