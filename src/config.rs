use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{AutosubError, Result};
use crate::workflow::DEFAULT_SUBTITLE_TYPES;

fn default_timeout_secs() -> u64 {
    300
}

fn default_launch_player() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub picker: PickerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the subtitle generation service
    pub endpoint: String,
    /// Seconds to wait for a generation result before giving up
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory receiving generated subtitle files
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Player used to open the subtitled video
    pub player_path: String,
    /// Arguments passed to the player before the media path
    pub player_args: Vec<String>,
    /// Open the player once the subtitles are attached
    #[serde(default = "default_launch_player")]
    pub launch_player: bool,
    /// Directory receiving subtitled videos
    pub output_dir: String,
    /// Additional ffmpeg options appended when attaching the subtitle track
    /// Example: ["-metadata:s:s:0", "title=Generated"]
    pub subtitle_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerConfig {
    /// Video file extensions accepted by the video picker
    pub video_extensions: Vec<String>,
    /// Content kinds requested from the subtitle picker
    pub subtitle_content_types: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            timeout_secs: default_timeout_secs(),
            output_dir: ".autosub/generated".to_string(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            player_path: "ffplay".to_string(),
            player_args: vec!["-autoexit".to_string()],
            launch_player: default_launch_player(),
            output_dir: ".autosub/playback".to_string(),
            subtitle_options: vec![],
        }
    }
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            video_extensions: ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "3gp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            subtitle_content_types: DEFAULT_SUBTITLE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AutosubError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AutosubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| AutosubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
