use thiserror::Error;

use crate::launcher::RequestKind;
use crate::workflow::WorkflowState;

#[derive(Error, Debug)]
pub enum AutosubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, AutosubError>;

/// Contract violations raised by the launcher registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("no handler registered for {0}")]
    NoHandlerRegistered(RequestKind),

    #[error("a {0} request is already in flight")]
    AlreadyInFlight(RequestKind),
}

/// Errors returned by workflow transitions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("workflow instance has terminated ({0})")]
    InstanceTerminated(WorkflowState),

    #[error("{operation} is not valid while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: WorkflowState,
    },

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Missing-input reasons reported by the validation gate, in check order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Select a video first")]
    MissingVideo,

    #[error("No subtitle selected")]
    MissingSubtitle,

    #[error("No language selected")]
    MissingLanguage,

    #[error("Enter a title")]
    MissingTitle,
}
