//! Frame capture with a deadline.
//!
//! [`capture_frames`] attaches a listener to a page, navigates it, and waits
//! until the [`FrameCollector`] reports completion or the deadline passes.
//! Whichever finishes first wins; the other future is dropped.
//!
//! # Completion
//!
//! | Policy | Completes when |
//! |--------|----------------|
//! | [`CompletionPolicy::FrameCount`] | Three candidate frames were kept, whatever their family |
//! | [`CompletionPolicy::AllFamilies`] | Each [`Family`] was seen at least once |
//!
//! Frames arriving after completion are ignored.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::browser::FrameSource;
use crate::error::{Error, Result};

use super::frame::{Family, FrameSchema};

// ============================================================================
// Constants
// ============================================================================

/// Candidate frames needed under [`CompletionPolicy::FrameCount`].
pub const REQUIRED_FRAMES: usize = 3;

/// Default capture deadline.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// CompletionPolicy
// ============================================================================

/// When a capture is considered complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    /// Exactly [`REQUIRED_FRAMES`] candidate frames.
    ///
    /// Duplicates of one family count too, so a family may go unseen.
    #[default]
    FrameCount,

    /// At least one frame of every family.
    AllFamilies,
}

impl CompletionPolicy {
    /// Progress units required for completion.
    #[inline]
    #[must_use]
    pub const fn expected(self) -> usize {
        match self {
            Self::FrameCount => REQUIRED_FRAMES,
            Self::AllFamilies => Family::ALL.len(),
        }
    }
}

// ============================================================================
// CaptureOptions
// ============================================================================

/// Capture configuration.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Deadline for the whole listen-navigate-collect sequence.
    pub timeout: Duration,
    /// Completion policy.
    pub policy: CompletionPolicy,
    /// Frame schema.
    pub schema: FrameSchema,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CAPTURE_TIMEOUT,
            policy: CompletionPolicy::default(),
            schema: FrameSchema::default(),
        }
    }
}

impl CaptureOptions {
    /// Sets the deadline.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the completion policy.
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: CompletionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the frame schema.
    #[inline]
    #[must_use]
    pub fn with_schema(mut self, schema: FrameSchema) -> Self {
        self.schema = schema;
        self
    }
}

// ============================================================================
// FrameCollector
// ============================================================================

/// Mutable collector state.
#[derive(Default)]
struct CollectorState {
    payloads: Vec<Value>,
    seen: [bool; 3],
    done: Option<oneshot::Sender<()>>,
    complete: bool,
}

/// Accumulates candidate frames in arrival order and signals completion.
pub struct FrameCollector {
    schema: FrameSchema,
    policy: CompletionPolicy,
    state: Mutex<CollectorState>,
}

impl FrameCollector {
    /// Creates a collector and the receiver fired on completion.
    #[must_use]
    pub fn new(schema: FrameSchema, policy: CompletionPolicy) -> (Self, oneshot::Receiver<()>) {
        let (done_tx, done_rx) = oneshot::channel();
        let collector = Self {
            schema,
            policy,
            state: Mutex::new(CollectorState {
                done: Some(done_tx),
                ..Default::default()
            }),
        };
        (collector, done_rx)
    }

    /// Offers one raw frame. Returns `true` if it was kept.
    pub fn offer(&self, raw: &str) -> bool {
        if !self.schema.is_candidate(raw) {
            trace!(len = raw.len(), "Ignoring non-board frame");
            return false;
        }

        let payload: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Discarding unparsable board frame");
                return false;
            }
        };

        let mut state = self.state.lock();
        if state.complete {
            return false;
        }

        let family = self.schema.classify(&payload).map(|(family, _)| family);
        if let Some(family) = family {
            state.seen[family.index()] = true;
        }
        state.payloads.push(payload);

        debug!(
            family = family.map(|f| f.to_string()).unwrap_or_default(),
            received = state.payloads.len(),
            "Board frame captured"
        );

        if self.progress_of(&state) >= self.policy.expected() {
            state.complete = true;
            if let Some(done) = state.done.take() {
                let _ = done.send(());
            }
        }

        true
    }

    /// Returns completion progress in units of [`CompletionPolicy::expected`].
    #[inline]
    #[must_use]
    pub fn progress(&self) -> usize {
        self.progress_of(&self.state.lock())
    }

    /// Returns the number of frames kept so far.
    #[inline]
    #[must_use]
    pub fn received(&self) -> usize {
        self.state.lock().payloads.len()
    }

    /// Returns `true` once completion was signaled.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.lock().complete
    }

    /// Takes the kept frames, in arrival order.
    #[must_use]
    pub fn take_payloads(&self) -> Vec<Value> {
        std::mem::take(&mut self.state.lock().payloads)
    }

    fn progress_of(&self, state: &CollectorState) -> usize {
        match self.policy {
            CompletionPolicy::FrameCount => state.payloads.len(),
            CompletionPolicy::AllFamilies => state.seen.iter().filter(|seen| **seen).count(),
        }
    }
}

// ============================================================================
// capture_frames
// ============================================================================

/// Listens on `source`, navigates it to `url`, and collects board frames.
///
/// The listener is attached before navigation starts.
///
/// # Errors
///
/// - [`Error::CaptureTimeout`] if completion is not reached in time
/// - Any error from listening or navigating
pub async fn capture_frames<S>(source: &S, url: &str, options: &CaptureOptions) -> Result<Vec<Value>>
where
    S: FrameSource + ?Sized,
{
    let (collector, done) = FrameCollector::new(options.schema.clone(), options.policy);
    let collector = Arc::new(collector);

    let sink = Arc::clone(&collector);
    let collect = async {
        source
            .listen(Arc::new(move |raw: &str| {
                sink.offer(raw);
            }))
            .await?;
        source.navigate(url).await?;
        done.await?;
        Ok::<_, Error>(())
    };

    match timeout(options.timeout, collect).await {
        Ok(Ok(())) => {
            let payloads = collector.take_payloads();
            info!(url = %url, frames = payloads.len(), "Board frames captured");
            Ok(payloads)
        }
        Ok(Err(e)) => Err(e),
        Err(_) => {
            let received = collector.progress();
            warn!(url = %url, received, "Timed out waiting for board frames");
            Err(Error::capture_timeout(
                received,
                options.policy.expected(),
                options.timeout.as_millis() as u64,
            ))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
