//! Command planning for the external media tool

pub mod command;
pub mod palette;

pub use command::FfmpegCommand;
pub use palette::{PaletteJob, PaletteOptions, PalettePipeline};
