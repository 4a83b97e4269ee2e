use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::error::{AutosubError, Result};
use crate::selection::MediaRef;
use super::{MediaCommandBuilder, PlaybackAttachment};

/// Playback through ffmpeg and an external player
pub struct FfmpegPlayback {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
    sessions: Mutex<Vec<JoinHandle<()>>>,
}

impl FfmpegPlayback {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Check if ffmpeg is available
    pub async fn check_availability(&self) -> Result<()> {
        self.command_builder
            .version_check()
            .execute()
            .await
            .map_err(|e| AutosubError::Media(format!("Media processor not available: {}", e)))?;

        info!("Media processor is available");
        Ok(())
    }

    /// Where the subtitled copy of `video` is written
    pub fn output_path_for(&self, video: &Path) -> PathBuf {
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());

        Path::new(&self.config.output_dir).join(format!("{}_subtitled.mkv", stem))
    }

    /// Wait for every playback session started so far
    pub async fn wait_for_sessions(&self) {
        let sessions = match self.sessions.lock() {
            Ok(mut sessions) => std::mem::take(&mut *sessions),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        for session in sessions {
            if let Err(e) = session.await {
                warn!("Playback session ended abnormally: {}", e);
            }
        }
    }

    async fn run_session(
        command_builder: MediaCommandBuilder,
        config: MediaConfig,
        video: PathBuf,
        subtitles: PathBuf,
        output: PathBuf,
    ) -> Result<()> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(
            "Attaching {} to {} -> {}",
            subtitles.display(),
            video.display(),
            output.display()
        );
        command_builder
            .attach_subtitle_track(&video, &subtitles, &output, &config.subtitle_options)
            .execute()
            .await?;

        if !config.launch_player {
            info!("Subtitled video ready: {}", output.display());
            return Ok(());
        }

        info!("Starting playback with {}", config.player_path);
        MediaCommandBuilder::play(&config.player_path, &config.player_args, &output)
            .execute()
            .await
    }
}

impl PlaybackAttachment for FfmpegPlayback {
    fn attach(&self, video: &MediaRef, subtitles: &MediaRef) {
        let video = video.to_path();
        let output = self.output_path_for(&video);
        let command_builder = self.command_builder.clone();
        let config = self.config.clone();
        let subtitles = subtitles.to_path();

        debug!("Scheduling playback session for {}", video.display());
        let session = tokio::spawn(async move {
            let run = Self::run_session(command_builder, config, video, subtitles, output);
            if let Err(e) = run.await {
                warn!("Playback failed: {}", e);
            }
        });

        match self.sessions.lock() {
            Ok(mut sessions) => sessions.push(session),
            Err(poisoned) => poisoned.into_inner().push(session),
        }
    }
}
