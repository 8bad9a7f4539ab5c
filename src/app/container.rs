use std::sync::Arc;

use crate::adapters::{
    FfmpegCliAdapter, LibavMediaAdapter, LocalFsAdapter, TracingLogAdapter,
};
use crate::app::{clip_interactor::ClipInteractor, gif_interactor::GifInteractor};
use crate::config_initialization::ToolSettings;
use crate::domain::errors::DomainError;
use crate::ports::{FsPort, LogPort, MediaLibraryPort, MediaToolPort};

pub trait AppContainer: Send + Sync {
    fn clip_interactor(&self) -> Arc<ClipInteractor>;
    fn gif_interactor(&self) -> Arc<GifInteractor>;
}

pub struct DefaultAppContainer {
    clip_interactor: Arc<ClipInteractor>,
    gif_interactor: Arc<GifInteractor>,
}

impl DefaultAppContainer {
    /// Wire the production adapters around the effective settings
    pub fn new(settings: ToolSettings) -> Result<Self, DomainError> {
        let tool_port = Arc::new(FfmpegCliAdapter::new(settings.ffmpeg_program.clone()));
        let media_port = Arc::new(LibavMediaAdapter::new()?);
        let fs_port = Arc::new(LocalFsAdapter::new());
        let log_port = Arc::new(TracingLogAdapter::new());

        let clip_interactor = Arc::new(ClipInteractor::new(
            Arc::clone(&media_port) as Arc<dyn MediaLibraryPort>,
            Arc::clone(&fs_port) as Arc<dyn FsPort>,
            Arc::clone(&log_port) as Arc<dyn LogPort>,
            settings.clone(),
        ));

        let gif_interactor = Arc::new(GifInteractor::new(
            Arc::clone(&tool_port) as Arc<dyn MediaToolPort>,
            Arc::clone(&media_port) as Arc<dyn MediaLibraryPort>,
            Arc::clone(&fs_port) as Arc<dyn FsPort>,
            Arc::clone(&log_port) as Arc<dyn LogPort>,
            settings,
        ));

        Ok(Self {
            clip_interactor,
            gif_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn clip_interactor(&self) -> Arc<ClipInteractor> {
        Arc::clone(&self.clip_interactor)
    }

    fn gif_interactor(&self) -> Arc<GifInteractor> {
        Arc::clone(&self.gif_interactor)
    }
}
