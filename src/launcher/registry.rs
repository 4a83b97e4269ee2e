use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::LaunchError;
use super::{
    AsyncOperation, AsyncRequest, AsyncResult, CorrelationId, KindPolicy, Outcome, RequestKind,
    RequestPayload,
};

/// Result handler bound to a request kind, invoked with the owning context
pub type ResultHandler<C> = fn(&mut C, AsyncResult);

struct Binding<C> {
    operation: Arc<dyn AsyncOperation>,
    handler: ResultHandler<C>,
    policy: KindPolicy,
}

/// Per-instance table of launchable operations and their in-flight requests.
///
/// Each registry owns the channel its operations report into, so results can
/// only ever reach the instance that launched them. Once the registry is
/// dropped, late results are discarded by the sending task.
pub struct LauncherRegistry<C> {
    bindings: HashMap<RequestKind, Binding<C>>,
    in_flight: HashMap<RequestKind, CorrelationId>,
    results_tx: mpsc::UnboundedSender<AsyncResult>,
    results_rx: mpsc::UnboundedReceiver<AsyncResult>,
}

impl<C> LauncherRegistry<C> {
    pub fn new() -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        Self {
            bindings: HashMap::new(),
            in_flight: HashMap::new(),
            results_tx,
            results_rx,
        }
    }

    /// Bind an operation and its result handler to `kind` with the kind's default policy
    pub fn register(
        &mut self,
        kind: RequestKind,
        operation: Arc<dyn AsyncOperation>,
        handler: ResultHandler<C>,
    ) {
        self.register_with_policy(kind, operation, handler, KindPolicy::for_kind(kind));
    }

    /// Bind an operation and its result handler to `kind`.
    ///
    /// Registering a kind again replaces the previous binding.
    pub fn register_with_policy(
        &mut self,
        kind: RequestKind,
        operation: Arc<dyn AsyncOperation>,
        handler: ResultHandler<C>,
        policy: KindPolicy,
    ) {
        let binding = Binding {
            operation,
            handler,
            policy,
        };

        if self.bindings.insert(kind, binding).is_some() {
            debug!("Replaced existing binding for {}", kind);
        } else {
            debug!("Registered binding for {}", kind);
        }
    }

    /// Launch an operation without waiting for it.
    ///
    /// Must be called from within a tokio runtime. The returned id is the only
    /// link between this launch and its eventual result.
    pub fn launch(&mut self, payload: RequestPayload) -> Result<CorrelationId, LaunchError> {
        let kind = payload.kind();
        let binding = self
            .bindings
            .get(&kind)
            .ok_or(LaunchError::NoHandlerRegistered(kind))?;

        if let Some(pending) = self.in_flight.get(&kind) {
            if !binding.policy.supersede {
                return Err(LaunchError::AlreadyInFlight(kind));
            }
            debug!("Superseding pending {} request {}", kind, pending);
        }

        let request = AsyncRequest::new(payload);
        let correlation_id = request.correlation_id;
        let operation = Arc::clone(&binding.operation);
        let timeout = binding.policy.timeout;
        let results = self.results_tx.clone();

        info!("Launching {} request {}", kind, correlation_id);
        debug!("Request payload: {:?}", request.payload);

        tokio::spawn(async move {
            // The operation runs in its own task so a panic still yields a result
            let task = tokio::spawn(async move { operation.run(request).await });
            let abort = task.abort_handle();

            let joined = match timeout {
                Some(limit) => match tokio::time::timeout(limit, task).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        abort.abort();
                        Ok(Outcome::TimedOut)
                    }
                },
                None => task.await,
            };

            let outcome = joined.unwrap_or_else(|e| {
                warn!("{} request {} aborted: {}", kind, correlation_id, e);
                Outcome::Failed(format!("{} operation aborted: {}", kind, e))
            });

            let result = AsyncResult {
                correlation_id,
                kind,
                outcome,
            };

            if results.send(result).is_err() {
                debug!("Discarding {} result {}: instance has ended", kind, correlation_id);
            }
        });

        self.in_flight.insert(kind, correlation_id);
        Ok(correlation_id)
    }

    /// The currently tracked request of `kind`, if any
    pub fn in_flight(&self, kind: RequestKind) -> Option<CorrelationId> {
        self.in_flight.get(&kind).copied()
    }

    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Accept a delivered result if it matches the tracked request of its kind.
    ///
    /// A matching result stops being tracked and is returned together with the
    /// handler bound to its kind. Anything else is stale and dropped.
    pub fn accept(&mut self, result: AsyncResult) -> Option<(ResultHandler<C>, AsyncResult)> {
        if self.in_flight.get(&result.kind) != Some(&result.correlation_id) {
            warn!(
                "Discarding stale {} result {}",
                result.kind, result.correlation_id
            );
            return None;
        }

        self.in_flight.remove(&result.kind);
        let handler = self.bindings.get(&result.kind)?.handler;
        Some((handler, result))
    }

    /// Wait for the next result posted by a launched operation.
    ///
    /// Returns `None` right away when nothing is in flight.
    pub async fn next_result(&mut self) -> Option<AsyncResult> {
        if self.in_flight.is_empty() {
            return None;
        }
        self.results_rx.recv().await
    }

    /// Stop tracking every in-flight request so their results become stale
    pub fn forget_in_flight(&mut self) {
        if !self.in_flight.is_empty() {
            debug!("Forgetting {} in-flight request(s)", self.in_flight.len());
        }
        self.in_flight.clear();
    }
}

impl<C> Default for LauncherRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
