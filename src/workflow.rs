use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{LaunchError, ValidationError, WorkflowError};
use crate::launcher::{
    AsyncOperation, AsyncResult, CorrelationId, KindPolicy, LauncherRegistry, Outcome,
    RequestKind, RequestPayload, ResultHandler, ResultValue,
};
use crate::media::PlaybackAttachment;
use crate::selection::{validate, MediaRef, SelectionState};

/// Content kinds offered to the subtitle picker unless configured otherwise
pub const DEFAULT_SUBTITLE_TYPES: [&str; 2] = ["application/x-subrip", "text/plain"];

/// Stored state of a workflow instance.
///
/// "Ready" is not stored: it is `Gathering` with a selection that passes
/// validation, see [`WorkflowEngine::is_ready`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Gathering,
    GenerationRequested,
    Completed,
    Failed(String),
    Cancelled,
}

impl WorkflowState {
    /// No further input is accepted once an instance has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_) | Self::Cancelled)
    }

    fn accepts_input(&self) -> bool {
        matches!(self, Self::Idle | Self::Gathering)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Gathering => f.write_str("gathering"),
            Self::GenerationRequested => f.write_str("generation requested"),
            Self::Completed => f.write_str("completed"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Answer to a generation request: either launched, or the first missing input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Launched(CorrelationId),
    NotReady(ValidationError),
}

/// One workflow instance: gathers inputs, requests generation, hands the
/// result to playback.
pub struct WorkflowEngine {
    selection: SelectionState,
    state: WorkflowState,
    registry: LauncherRegistry<WorkflowEngine>,
    playback: Box<dyn PlaybackAttachment>,
    generated: Option<MediaRef>,
    generation_timeout: Option<Duration>,
    subtitle_types: Vec<String>,
}

impl WorkflowEngine {
    pub fn new(playback: Box<dyn PlaybackAttachment>) -> Self {
        Self {
            selection: SelectionState::default(),
            state: WorkflowState::Idle,
            registry: LauncherRegistry::new(),
            playback,
            generated: None,
            generation_timeout: None,
            subtitle_types: DEFAULT_SUBTITLE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Bound the wait for generation results; must be set before registering the generator
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    pub fn with_subtitle_types(mut self, types: Vec<String>) -> Self {
        self.subtitle_types = types;
        self
    }

    /// Bind the operation serving `kind`. Registering a kind again replaces it.
    pub fn register(&mut self, kind: RequestKind, operation: Arc<dyn AsyncOperation>) {
        let handler: ResultHandler<Self> = match kind {
            RequestKind::RequestGeneration => Self::on_generation_result,
            _ => Self::on_selection_result,
        };

        let mut policy = KindPolicy::for_kind(kind);
        if let (RequestKind::RequestGeneration, Some(limit)) = (kind, self.generation_timeout) {
            policy = policy.with_timeout(limit);
        }

        self.registry.register_with_policy(kind, operation, handler, policy);
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Locator of the generated subtitles once the instance has completed
    pub fn generated(&self) -> Option<&MediaRef> {
        self.generated.as_ref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Whether a generation request would be issued right now
    pub fn is_ready(&self) -> bool {
        self.state == WorkflowState::Gathering && validate(&self.selection).is_ok()
    }

    pub fn set_video(&mut self, video: MediaRef) -> Result<(), WorkflowError> {
        self.ensure_accepts_input("set_video")?;
        info!("Video selected: {}", video);
        self.selection.video = Some(video);
        self.enter_gathering();
        Ok(())
    }

    pub fn set_subtitle(&mut self, subtitle: MediaRef) -> Result<(), WorkflowError> {
        self.ensure_accepts_input("set_subtitle")?;
        info!("Subtitle selected: {}", subtitle);
        self.selection.subtitle = Some(subtitle);
        self.enter_gathering();
        Ok(())
    }

    pub fn set_language<S: Into<String>>(&mut self, code: S) -> Result<(), WorkflowError> {
        self.ensure_accepts_input("set_language")?;
        let code = code.into();
        info!("Language selected: {}", code);
        self.selection.language = Some(code);
        self.enter_gathering();
        Ok(())
    }

    pub fn set_title<S: Into<String>>(&mut self, title: S) -> Result<(), WorkflowError> {
        self.ensure_accepts_input("set_title")?;
        let title = title.into();
        debug!("Title set: {}", title);
        self.selection.title = Some(title);
        self.enter_gathering();
        Ok(())
    }

    /// Open the video picker; reopening supersedes a pending one
    pub fn pick_video(&mut self) -> Result<CorrelationId, WorkflowError> {
        self.ensure_accepts_input("pick_video")?;
        Ok(self.registry.launch(RequestPayload::SelectVideo)?)
    }

    pub fn pick_subtitle(&mut self) -> Result<CorrelationId, WorkflowError> {
        self.ensure_accepts_input("pick_subtitle")?;
        let payload = RequestPayload::SelectSubtitle {
            accepted_types: self.subtitle_types.clone(),
        };
        Ok(self.registry.launch(payload)?)
    }

    pub fn pick_language(&mut self) -> Result<CorrelationId, WorkflowError> {
        self.ensure_accepts_input("pick_language")?;
        let payload = RequestPayload::SelectLanguage {
            current: self.selection.language.clone(),
        };
        Ok(self.registry.launch(payload)?)
    }

    /// Validate the selection and, when ready, launch the generation request.
    ///
    /// A missing input is an ordinary outcome and leaves the state untouched.
    pub fn request_generation(&mut self) -> Result<RequestOutcome, WorkflowError> {
        if self.state.is_terminal() {
            return Err(WorkflowError::InstanceTerminated(self.state.clone()));
        }
        if self.registry.in_flight(RequestKind::RequestGeneration).is_some() {
            return Err(LaunchError::AlreadyInFlight(RequestKind::RequestGeneration).into());
        }
        self.ensure_accepts_input("request_generation")?;

        let request = match validate(&self.selection) {
            Ok(request) => request,
            Err(reason) => {
                info!("Generation not ready: {}", reason);
                return Ok(RequestOutcome::NotReady(reason));
            }
        };

        info!(
            "Requesting generation of '{}' in {} from {}",
            request.title, request.language, request.subtitle
        );
        let correlation_id = self.registry.launch(RequestPayload::Generate(request))?;
        self.state = WorkflowState::GenerationRequested;
        Ok(RequestOutcome::Launched(correlation_id))
    }

    /// Abandon the instance. Launched operations keep running but their
    /// results will be discarded.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        if self.state.is_terminal() {
            return Err(WorkflowError::InstanceTerminated(self.state.clone()));
        }
        info!("Workflow cancelled while {}", self.state);
        self.finish(WorkflowState::Cancelled);
        Ok(())
    }

    /// Route a delivered result to the handler bound to its kind.
    ///
    /// Returns false when the result was stale and nothing changed.
    pub fn deliver(&mut self, result: AsyncResult) -> bool {
        match self.registry.accept(result) {
            Some((handler, result)) => {
                handler(self, result);
                true
            }
            None => false,
        }
    }

    /// Wait for and deliver one result. Returns false when nothing is in flight.
    pub async fn process_next(&mut self) -> bool {
        match self.registry.next_result().await {
            Some(result) => {
                self.deliver(result);
                true
            }
            None => false,
        }
    }

    /// Deliver results until no request is in flight
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    fn ensure_accepts_input(&self, operation: &'static str) -> Result<(), WorkflowError> {
        if self.state.is_terminal() {
            return Err(WorkflowError::InstanceTerminated(self.state.clone()));
        }
        if !self.state.accepts_input() {
            return Err(WorkflowError::InvalidTransition {
                operation,
                state: self.state.clone(),
            });
        }
        Ok(())
    }

    fn enter_gathering(&mut self) {
        if self.state == WorkflowState::Idle {
            debug!("Workflow gathering inputs");
            self.state = WorkflowState::Gathering;
        }
    }

    fn finish(&mut self, state: WorkflowState) {
        self.state = state;
        self.selection = SelectionState::default();
        self.registry.forget_in_flight();
    }

    fn on_selection_result(engine: &mut Self, result: AsyncResult) {
        let kind = result.kind;
        let applied = match (kind, result.outcome) {
            (RequestKind::SelectVideo, Outcome::Success(ResultValue::Video(video))) => {
                engine.set_video(video)
            }
            (RequestKind::SelectSubtitle, Outcome::Success(ResultValue::Subtitle(subtitle))) => {
                engine.set_subtitle(subtitle)
            }
            (RequestKind::SelectLanguage, Outcome::Success(ResultValue::Language(code))) => {
                engine.set_language(code)
            }
            (_, Outcome::Success(value)) => {
                warn!("Ignoring {} result carrying {:?}", kind, value);
                return;
            }
            (_, outcome) => {
                info!("{} closed without a selection ({:?})", kind, outcome);
                return;
            }
        };

        if let Err(e) = applied {
            warn!("Could not apply {} result: {}", kind, e);
        }
    }

    fn on_generation_result(engine: &mut Self, result: AsyncResult) {
        if engine.state != WorkflowState::GenerationRequested {
            warn!("Ignoring generation result while {}", engine.state);
            return;
        }

        match result.outcome {
            Outcome::Success(ResultValue::Generated(output)) => {
                let Some(video) = engine.selection.video.clone() else {
                    engine.finish(WorkflowState::Failed("video selection was lost".to_string()));
                    return;
                };
                info!("Generation completed: {}", output);
                engine.playback.attach(&video, &output);
                engine.generated = Some(output);
                engine.finish(WorkflowState::Completed);
            }
            Outcome::Success(value) => {
                let reason = format!("unexpected generation result {:?}", value);
                warn!("{}", reason);
                engine.finish(WorkflowState::Failed(reason));
            }
            Outcome::Failed(reason) => {
                warn!("Generation failed: {}", reason);
                engine.finish(WorkflowState::Failed(reason));
            }
            Outcome::TimedOut => {
                let reason = match engine.generation_timeout {
                    Some(limit) => format!("generation timed out after {:?}", limit),
                    None => "generation timed out".to_string(),
                };
                warn!("{}", reason);
                engine.finish(WorkflowState::Failed(reason));
            }
            Outcome::Cancelled => {
                info!("Generation cancelled by the service; inputs kept for retry");
                engine.state = WorkflowState::Gathering;
            }
        }
    }
}
