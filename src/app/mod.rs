// Application layer - Use case interactors

pub mod clip_interactor;
pub mod container;
pub mod gif_interactor;

// Re-export interactors
pub use clip_interactor::{ClipInteractor, ClipReport, ClipRequest};
pub use container::{AppContainer, DefaultAppContainer};
pub use gif_interactor::{ConversionReport, ConversionRequest, GifInteractor};
