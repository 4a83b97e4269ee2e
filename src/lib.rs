//! Autosub - Subtitle Generation Workflow
//!
//! Gathers a video, an existing subtitle file, a target language and a title,
//! hands them to an external generation service and attaches the generated
//! subtitles to a playback session.
//!
//! The core is [`workflow::WorkflowEngine`], a state machine built on the
//! per-instance [`launcher::LauncherRegistry`] that correlates asynchronous
//! results back to the request that produced them.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod languages;
pub mod launcher;
pub mod media;
pub mod pickers;
pub mod selection;
pub mod subtitle;
pub mod workflow;
