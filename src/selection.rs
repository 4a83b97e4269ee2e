use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;

/// Opaque locator for a media resource (a video, a subtitle file, a generated result).
///
/// The workflow never looks inside a locator; only the boundary adapters that
/// produced it or consume it know how to resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn new<S: Into<String>>(locator: S) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the locator as a local filesystem path
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl From<&Path> for MediaRef {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().to_string())
    }
}

impl From<PathBuf> for MediaRef {
    fn from(path: PathBuf) -> Self {
        Self::from(path.as_path())
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs gathered so far by one workflow instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub video: Option<MediaRef>,
    pub subtitle: Option<MediaRef>,
    pub language: Option<String>,
    pub title: Option<String>,
}

impl SelectionState {
    pub fn is_empty(&self) -> bool {
        self.video.is_none()
            && self.subtitle.is_none()
            && self.language.is_none()
            && self.title.is_none()
    }
}

/// Payload handed to the generation boundary once every input is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub subtitle: MediaRef,
    pub title: String,
    pub language: String,
}

/// Readiness check run right before a generation request is issued.
///
/// The checks run in a fixed order and only the first missing input is
/// reported. An empty language code counts as absent, as does an empty title.
pub fn validate(
    selection: &SelectionState,
) -> std::result::Result<GenerationRequest, ValidationError> {
    if selection.video.is_none() {
        return Err(ValidationError::MissingVideo);
    }

    let subtitle = selection
        .subtitle
        .clone()
        .ok_or(ValidationError::MissingSubtitle)?;

    let language = match selection.language.as_deref() {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => return Err(ValidationError::MissingLanguage),
    };

    let title = match selection.title.as_deref() {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => return Err(ValidationError::MissingTitle),
    };

    Ok(GenerationRequest {
        subtitle,
        title,
        language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> SelectionState {
        SelectionState {
            video: Some(MediaRef::new("/videos/clip.mp4")),
            subtitle: Some(MediaRef::new("/subs/clip.srt")),
            language: Some("en".to_string()),
            title: Some("My Clip".to_string()),
        }
    }

    #[test]
    fn test_validate_complete_selection() {
        let request = validate(&complete()).unwrap();
        assert_eq!(request.subtitle, MediaRef::new("/subs/clip.srt"));
        assert_eq!(request.title, "My Clip");
        assert_eq!(request.language, "en");
    }

    #[test]
    fn test_missing_video_reported_first() {
        let selection = SelectionState {
            video: None,
            subtitle: None,
            ..complete()
        };
        assert_eq!(validate(&selection), Err(ValidationError::MissingVideo));
        assert_eq!(validate(&SelectionState::default()), Err(ValidationError::MissingVideo));
    }

    #[test]
    fn test_check_order() {
        let mut selection = complete();
        selection.title = None;
        selection.language = None;
        assert_eq!(validate(&selection), Err(ValidationError::MissingLanguage));

        selection.subtitle = None;
        assert_eq!(validate(&selection), Err(ValidationError::MissingSubtitle));
    }

    #[test]
    fn test_empty_title_and_language_count_as_missing() {
        let mut selection = complete();
        selection.title = Some(String::new());
        assert_eq!(validate(&selection), Err(ValidationError::MissingTitle));

        selection.language = Some(String::new());
        assert_eq!(validate(&selection), Err(ValidationError::MissingLanguage));
    }

    #[test]
    fn test_media_ref_from_path() {
        let media = MediaRef::from(PathBuf::from("/tmp/out.srt"));
        assert_eq!(media.as_str(), "/tmp/out.srt");
        assert_eq!(media.to_path(), PathBuf::from("/tmp/out.srt"));
    }
}
