//! Debounced re-analysis of the active document
//!
//! Edit and focus triggers restart a quiescence timer; only when the timer
//! elapses does a pass run. Passes carry a generation number so that a slow
//! pass finishing after a newer trigger never overwrites fresher results.

use crate::error::{FuncLocError, Result};
use crate::models::FunctionMetric;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;
use tower_lsp::lsp_types::Url;
use tracing::{debug, trace};

/// Quiet period after the last trigger before a pass runs.
pub const QUIESCENCE_WINDOW: Duration = Duration::from_millis(250);

/// Why a pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The active document's text changed.
    Edit,
    /// The active document was (re)focused.
    FocusChange,
    /// Explicit user request; skips the quiescence window.
    Manual,
}

/// Metrics of one document snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    /// Version of the snapshot that was measured.
    pub version: i32,
    pub metrics: Vec<FunctionMetric>,
}

/// The analysis pipeline driven by the scheduler.
#[async_trait]
pub trait Pipeline: Send + Sync + 'static {
    /// Measure the current snapshot of `uri`.
    ///
    /// Fails with [`FuncLocError::NoActiveDocument`] when the document is no
    /// longer open.
    async fn measure(&self, uri: &Url) -> Result<Measurement>;

    /// Hand a finished, still-current pass to the rendering sink.
    async fn publish(&self, uri: &Url, measurement: Measurement);
}

/// Result of a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Results were published.
    Published { functions: usize },
    /// A newer trigger arrived while measuring; results were dropped.
    Superseded,
}

#[derive(Default)]
struct State {
    active: Option<Url>,
    pending: Option<AbortHandle>,
    closed: bool,
}

impl State {
    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// Owns the active-document reference and the pending timer.
///
/// The state lock is never held across an await; it only serializes the
/// short bookkeeping done by each trigger.
pub struct UpdateScheduler {
    pipeline: Arc<dyn Pipeline>,
    generation: Arc<AtomicU64>,
    state: Mutex<State>,
}

impl UpdateScheduler {
    pub fn new(pipeline: Arc<dyn Pipeline>) -> Self {
        Self {
            pipeline,
            generation: Arc::new(AtomicU64::new(0)),
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn active_document(&self) -> Option<Url> {
        self.lock().active.clone()
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.lock()
            .pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Make `uri` the active document and start a fresh debounce cycle.
    ///
    /// `None` means no document is in view; pending work is dropped.
    pub fn switch_document(&self, uri: Option<Url>) {
        {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.cancel_pending();
            debug!(
                "Active document: {}",
                uri.as_ref().map_or("<none>", |u| u.as_str())
            );
            state.active = uri;
        }
        // Invalidate passes still running for the previous document
        self.next_generation();
        self.schedule(Trigger::FocusChange);
    }

    /// Register a trigger for the active document.
    ///
    /// Cancels the pending timer and arms a new one. Manual triggers run
    /// without waiting. Without an active document this is a no-op.
    pub fn schedule(&self, trigger: Trigger) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.cancel_pending();
        let Some(uri) = state.active.clone() else {
            trace!("Ignoring {:?} trigger: no active document", trigger);
            return;
        };

        let generation = self.next_generation();
        let delay = match trigger {
            Trigger::Manual => Duration::ZERO,
            Trigger::Edit | Trigger::FocusChange => QUIESCENCE_WINDOW,
        };
        let pipeline = Arc::clone(&self.pipeline);
        let latest = Arc::clone(&self.generation);

        trace!("{:?} trigger for {} (generation {})", trigger, uri, generation);
        let timer = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            // Detach the pass so later triggers cancel only the timer,
            // never an in-flight provider call.
            tokio::spawn(async move {
                if let Err(e) = run_pass(pipeline.as_ref(), &uri, generation, &latest).await {
                    debug!("Pass for {} skipped: {}", uri, e);
                }
            });
        });
        state.pending = Some(timer.abort_handle());
    }

    /// Run a pass now and wait for it.
    ///
    /// Cancels any pending timer so the debounced run does not repeat this
    /// work.
    pub async fn run_now(&self) -> Result<PassOutcome> {
        let (uri, generation) = {
            let mut state = self.lock();
            state.cancel_pending();
            if state.closed {
                return Err(FuncLocError::NoActiveDocument);
            }
            let uri = state.active.clone().ok_or(FuncLocError::NoActiveDocument)?;
            (uri, self.next_generation())
        };
        run_pass(self.pipeline.as_ref(), &uri, generation, &self.generation).await
    }

    /// Cancel the pending timer, if any. Safe to call repeatedly.
    pub fn cancel(&self) {
        self.lock().cancel_pending();
    }

    /// Stop for good: cancel the timer, forget the active document and
    /// discard results of passes still in flight.
    pub fn shutdown(&self) {
        {
            let mut state = self.lock();
            state.cancel_pending();
            state.active = None;
            state.closed = true;
        }
        self.next_generation();
        debug!("Update scheduler shut down");
    }
}

impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_pass(
    pipeline: &dyn Pipeline,
    uri: &Url,
    generation: u64,
    latest: &AtomicU64,
) -> Result<PassOutcome> {
    let measurement = pipeline.measure(uri).await?;
    if latest.load(Ordering::SeqCst) != generation {
        debug!(
            "Discarding stale pass for {} (generation {})",
            uri, generation
        );
        return Ok(PassOutcome::Superseded);
    }
    let functions = measurement.metrics.len();
    pipeline.publish(uri, measurement).await;
    Ok(PassOutcome::Published { functions })
}
