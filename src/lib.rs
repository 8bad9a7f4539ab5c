//! snipkit
//!
//! Library behind the `extract-clip` and `mp4-to-gif` command-line tools.
//! The domain layer owns range clamping, output naming and backend
//! selection; adapters drive the external `ffmpeg` executable and libav
//! through `ffmpeg-next`.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{FrameSize, SeekWindow, TimeRange, TimeSpec};
pub use error::{SnipkitError, SnipkitResult};
