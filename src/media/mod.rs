// Playback attachment
//
// The workflow hands a finished generation to playback and never hears back:
// - Processor: ffmpeg-based implementation that muxes the subtitles and opens a player
// - Commands: command builders for the media tools involved

pub mod commands;
pub mod processor;

use std::sync::Arc;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::selection::MediaRef;

/// Starts a playback session for a video with generated subtitles attached.
///
/// Fire-and-forget: implementations report problems through logging only.
#[cfg_attr(test, mockall::automock)]
pub trait PlaybackAttachment: Send + Sync {
    fn attach(&self, video: &MediaRef, subtitles: &MediaRef);
}

impl<T: PlaybackAttachment + ?Sized> PlaybackAttachment for Arc<T> {
    fn attach(&self, video: &MediaRef, subtitles: &MediaRef) {
        (**self).attach(video, subtitles)
    }
}

/// Factory for creating playback instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default playback implementation (FFmpeg-based)
    pub fn create_playback(config: MediaConfig) -> Arc<FfmpegPlayback> {
        Arc::new(FfmpegPlayback::new(config))
    }
}
