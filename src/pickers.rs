// Command-line pickers
//
// The pickers answer from values given on the command line instead of
// opening a selection screen. A value that is absent or does not qualify is
// reported as a closed picker (Cancelled), just like dismissing a dialog.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::languages;
use crate::launcher::{AsyncOperation, AsyncRequest, Outcome, RequestPayload, ResultValue};
use crate::selection::MediaRef;

/// Extensions matching a content kind offered to the subtitle picker
fn extensions_for(content_type: &str) -> &'static [&'static str] {
    match content_type {
        "application/x-subrip" => &["srt"],
        "text/plain" => &["txt", "srt"],
        "text/vtt" => &["vtt"],
        _ => &[],
    }
}

fn has_extension(path: &Path, accepted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| accepted.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn unexpected(request: &AsyncRequest, picker: &str) -> Outcome {
    Outcome::Failed(format!("{} cannot be served by the {} picker", request.kind, picker))
}

pub struct VideoPicker {
    choice: Option<PathBuf>,
    extensions: Vec<String>,
}

impl VideoPicker {
    pub fn new(choice: Option<PathBuf>, extensions: Vec<String>) -> Self {
        Self { choice, extensions }
    }
}

#[async_trait]
impl AsyncOperation for VideoPicker {
    async fn run(&self, request: AsyncRequest) -> Outcome {
        if request.payload != RequestPayload::SelectVideo {
            return unexpected(&request, "video");
        }

        let Some(path) = &self.choice else {
            info!("No video selected");
            return Outcome::Cancelled;
        };

        let accepted: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        if !has_extension(path, &accepted) {
            warn!("Not a supported video file: {}", path.display());
            return Outcome::Cancelled;
        }

        match tokio::fs::canonicalize(path).await {
            Ok(resolved) => {
                debug!("Selected video: {}", resolved.display());
                Outcome::Success(ResultValue::Video(MediaRef::from(resolved)))
            }
            Err(e) => {
                warn!("Video {} is not accessible: {}", path.display(), e);
                Outcome::Cancelled
            }
        }
    }
}

pub struct SubtitlePicker {
    choice: Option<PathBuf>,
}

impl SubtitlePicker {
    pub fn new(choice: Option<PathBuf>) -> Self {
        Self { choice }
    }
}

#[async_trait]
impl AsyncOperation for SubtitlePicker {
    async fn run(&self, request: AsyncRequest) -> Outcome {
        let RequestPayload::SelectSubtitle { accepted_types } = &request.payload else {
            return unexpected(&request, "subtitle");
        };

        let Some(path) = &self.choice else {
            info!("No subtitle selected");
            return Outcome::Cancelled;
        };

        let accepted: Vec<&str> = accepted_types
            .iter()
            .flat_map(|content_type| extensions_for(content_type).iter().copied())
            .collect();
        if !has_extension(path, &accepted) {
            warn!(
                "Subtitle {} does not match accepted types {:?}",
                path.display(),
                accepted_types
            );
            return Outcome::Cancelled;
        }

        // Resolve to an absolute path and prove it can be read, so the
        // locator stays usable after this call returns.
        let resolved = match tokio::fs::canonicalize(path).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Subtitle {} is not accessible: {}", path.display(), e);
                return Outcome::Cancelled;
            }
        };
        if let Err(e) = tokio::fs::File::open(&resolved).await {
            warn!("Subtitle {} is not readable: {}", resolved.display(), e);
            return Outcome::Cancelled;
        }

        debug!("Selected subtitle: {}", resolved.display());
        Outcome::Success(ResultValue::Subtitle(MediaRef::from(resolved)))
    }
}

pub struct LanguagePicker {
    choice: Option<String>,
}

impl LanguagePicker {
    pub fn new(choice: Option<String>) -> Self {
        Self { choice }
    }
}

#[async_trait]
impl AsyncOperation for LanguagePicker {
    async fn run(&self, request: AsyncRequest) -> Outcome {
        let RequestPayload::SelectLanguage { current } = &request.payload else {
            return unexpected(&request, "language");
        };
        debug!("Language picker opened with current selection {:?}", current);

        let Some(code) = &self.choice else {
            info!("No language selected");
            return Outcome::Cancelled;
        };

        match languages::find(code) {
            Some(language) => {
                debug!("Selected language: {} ({})", language.display_name, language.code);
                Outcome::Success(ResultValue::Language(language.code.to_string()))
            }
            None => {
                warn!("Unknown language code: {}", code);
                Outcome::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::DEFAULT_SUBTITLE_TYPES;

    fn subtitle_request() -> AsyncRequest {
        AsyncRequest::new(RequestPayload::SelectSubtitle {
            accepted_types: DEFAULT_SUBTITLE_TYPES.iter().map(|t| t.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn test_video_picker_accepts_existing_video() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.MP4");
        std::fs::write(&video, b"not really a video").unwrap();

        let picker = VideoPicker::new(Some(video.clone()), vec!["mp4".to_string()]);
        let outcome = picker.run(AsyncRequest::new(RequestPayload::SelectVideo)).await;

        let expected = std::fs::canonicalize(&video).unwrap();
        assert_eq!(outcome, Outcome::Success(ResultValue::Video(MediaRef::from(expected))));
    }

    #[tokio::test]
    async fn test_video_picker_cancels_on_missing_or_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"text").unwrap();

        let request = || AsyncRequest::new(RequestPayload::SelectVideo);
        let extensions = vec!["mp4".to_string()];

        let picker = VideoPicker::new(None, extensions.clone());
        assert_eq!(picker.run(request()).await, Outcome::Cancelled);

        let picker = VideoPicker::new(Some(notes), extensions.clone());
        assert_eq!(picker.run(request()).await, Outcome::Cancelled);

        let picker = VideoPicker::new(Some(dir.path().join("gone.mp4")), extensions);
        assert_eq!(picker.run(request()).await, Outcome::Cancelled);
    }

    #[tokio::test]
    async fn test_subtitle_picker_honours_accepted_types() {
        let dir = tempfile::tempdir().unwrap();
        let srt = dir.path().join("clip.srt");
        let vtt = dir.path().join("clip.vtt");
        std::fs::write(&srt, b"1\n").unwrap();
        std::fs::write(&vtt, b"WEBVTT\n").unwrap();

        let picker = SubtitlePicker::new(Some(srt.clone()));
        let expected = std::fs::canonicalize(&srt).unwrap();
        assert_eq!(
            picker.run(subtitle_request()).await,
            Outcome::Success(ResultValue::Subtitle(MediaRef::from(expected)))
        );

        let picker = SubtitlePicker::new(Some(vtt));
        assert_eq!(picker.run(subtitle_request()).await, Outcome::Cancelled);

        let picker = SubtitlePicker::new(Some(srt));
        let only_vtt = AsyncRequest::new(RequestPayload::SelectSubtitle {
            accepted_types: vec!["text/vtt".to_string()],
        });
        assert_eq!(picker.run(only_vtt).await, Outcome::Cancelled);
    }

    #[tokio::test]
    async fn test_language_picker() {
        let request = || AsyncRequest::new(RequestPayload::SelectLanguage { current: None });

        let picker = LanguagePicker::new(Some("HI".to_string()));
        assert_eq!(
            picker.run(request()).await,
            Outcome::Success(ResultValue::Language("hi".to_string()))
        );

        let picker = LanguagePicker::new(Some("klingon".to_string()));
        assert_eq!(picker.run(request()).await, Outcome::Cancelled);

        let picker = LanguagePicker::new(None);
        assert_eq!(picker.run(request()).await, Outcome::Cancelled);
    }

    #[tokio::test]
    async fn test_pickers_drive_workflow_to_ready() {
        use crate::media::MockPlaybackAttachment;
        use crate::launcher::RequestKind;
        use crate::workflow::{WorkflowEngine, WorkflowState};
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mkv");
        std::fs::write(&video, b"video").unwrap();

        let mut playback = MockPlaybackAttachment::new();
        playback.expect_attach().never();
        let mut engine = WorkflowEngine::new(Box::new(playback));
        engine.register(
            RequestKind::SelectVideo,
            Arc::new(VideoPicker::new(Some(video), vec!["mkv".to_string()])),
        );
        engine.register(
            RequestKind::SelectSubtitle,
            Arc::new(SubtitlePicker::new(Some(dir.path().join("missing.srt")))),
        );
        engine.register(
            RequestKind::SelectLanguage,
            Arc::new(LanguagePicker::new(Some("ja".to_string()))),
        );

        engine.pick_video().unwrap();
        engine.pick_subtitle().unwrap();
        engine.pick_language().unwrap();
        engine.settle().await;
        engine.set_title("Clip").unwrap();

        assert_eq!(engine.state(), &WorkflowState::Gathering);
        assert!(engine.selection().video.is_some());
        assert!(engine.selection().subtitle.is_none());
        assert_eq!(engine.selection().language.as_deref(), Some("ja"));
        assert!(!engine.is_ready());
    }

    #[tokio::test]
    async fn test_picker_rejects_foreign_payload() {
        let picker = LanguagePicker::new(Some("en".to_string()));
        let outcome = picker.run(AsyncRequest::new(RequestPayload::SelectVideo)).await;
        assert!(matches!(outcome, Outcome::Failed(_)));
    }
}
