// Asynchronous launcher architecture
//
// A workflow hands work to external operations (pickers, the generation
// service) and later receives exactly one result per launch:
// - Types: request kinds, correlation ids, payloads and outcomes
// - Registry: per-instance bindings, in-flight tracking and stale-result rejection
//
// Every launched operation runs on its own task and posts its result back into
// the owning instance's channel. The instance drains that channel on its own
// task, so all state transitions stay on one logical thread.

pub mod registry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

pub use registry::*;

use crate::selection::{GenerationRequest, MediaRef};

/// The bounded set of asynchronous operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    SelectVideo,
    SelectSubtitle,
    SelectLanguage,
    RequestGeneration,
}

impl RequestKind {
    pub const ALL: [RequestKind; 4] = [
        RequestKind::SelectVideo,
        RequestKind::SelectSubtitle,
        RequestKind::SelectLanguage,
        RequestKind::RequestGeneration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectVideo => "select-video",
            Self::SelectSubtitle => "select-subtitle",
            Self::SelectLanguage => "select-language",
            Self::RequestGeneration => "request-generation",
        }
    }

    /// Pickers are user-driven and may be reopened at any time
    pub fn is_picker(&self) -> bool {
        !matches!(self, Self::RequestGeneration)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token linking a launched request to its single result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What an operation is asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    SelectVideo,
    SelectSubtitle {
        /// Accepted content kinds (MIME types)
        accepted_types: Vec<String>,
    },
    SelectLanguage {
        current: Option<String>,
    },
    Generate(GenerationRequest),
}

impl RequestPayload {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::SelectVideo => RequestKind::SelectVideo,
            Self::SelectSubtitle { .. } => RequestKind::SelectSubtitle,
            Self::SelectLanguage { .. } => RequestKind::SelectLanguage,
            Self::Generate(_) => RequestKind::RequestGeneration,
        }
    }
}

/// A launched request, alive until its result is observed
#[derive(Debug, Clone)]
pub struct AsyncRequest {
    pub kind: RequestKind,
    pub correlation_id: CorrelationId,
    pub payload: RequestPayload,
    pub launched_at: DateTime<Utc>,
}

impl AsyncRequest {
    pub fn new(payload: RequestPayload) -> Self {
        Self {
            kind: payload.kind(),
            correlation_id: CorrelationId::new(),
            payload,
            launched_at: Utc::now(),
        }
    }
}

/// Value carried by a successful outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultValue {
    Video(MediaRef),
    Subtitle(MediaRef),
    Language(String),
    Generated(MediaRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(ResultValue),
    Cancelled,
    Failed(String),
    /// The kind's wait bound elapsed before the operation answered
    TimedOut,
}

/// The single result produced for an [`AsyncRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncResult {
    pub correlation_id: CorrelationId,
    pub kind: RequestKind,
    pub outcome: Outcome,
}

/// An external asynchronous operation serving one request kind
#[async_trait]
pub trait AsyncOperation: Send + Sync {
    /// Run the request to completion and report its outcome
    async fn run(&self, request: AsyncRequest) -> Outcome;
}

/// Per-kind launch policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindPolicy {
    /// A relaunch replaces the pending request instead of being rejected
    pub supersede: bool,
    /// Bounded wait after which the result becomes [`Outcome::TimedOut`]
    pub timeout: Option<Duration>,
}

impl KindPolicy {
    pub fn for_kind(kind: RequestKind) -> Self {
        Self {
            supersede: kind.is_picker(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
