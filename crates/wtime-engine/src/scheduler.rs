//! The refresh loop.
//!
//! [`Refresher::tick`] is the whole per-tick computation: read the clock,
//! derive a fresh snapshot, diff it against the last one. [`start`] runs that
//! once immediately and then once per [`REFRESH_PERIOD`], aligned to the
//! clock source's whole seconds, on a tokio task and hands every change to a
//! [`ChangeSink`]; [`stop`] cancels the task and waits for it to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::ClockSource;
use crate::config::{DerivationConfig, EngineConfig};
use crate::error::Result;
use crate::snapshot::{diff, ChangeNotification, DerivedSnapshot};

pub const REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// Receives change notifications on the host side.
pub trait ChangeSink: Send + 'static {
    /// Deliver one change. Returns `false` once the host is no longer
    /// listening, which ends the refresh loop.
    fn publish(&mut self, change: ChangeNotification) -> bool;
}

impl ChangeSink for mpsc::UnboundedSender<ChangeNotification> {
    fn publish(&mut self, change: ChangeNotification) -> bool {
        self.send(change).is_ok()
    }
}

/// Holds the previous snapshot and computes one tick at a time.
pub struct Refresher {
    timezone_id: String,
    config: DerivationConfig,
    clock: Arc<dyn ClockSource>,
    previous: Option<DerivedSnapshot>,
}

impl Refresher {
    /// # Errors
    /// Returns `EngineError::InvalidTimezone` if the configured zone is unknown.
    pub fn new(config: &EngineConfig, clock: Arc<dyn ClockSource>) -> Result<Self> {
        let (tz, derivation) = config.resolve()?;
        Ok(Self {
            timezone_id: tz.name().to_string(),
            config: derivation,
            clock,
            previous: None,
        })
    }

    /// Evaluate once and return the values that changed since the last
    /// successful tick. The first tick reports every value.
    ///
    /// # Errors
    /// Clock failures are returned as-is; the previous snapshot is kept so
    /// the next successful tick diffs against the last published values.
    pub fn tick(&mut self) -> Result<Vec<ChangeNotification>> {
        let local = self.clock.now_local(&self.timezone_id)?;
        let snapshot = DerivedSnapshot::derive(&local, &self.config);
        let changes = diff(self.previous.as_ref(), &snapshot);
        self.previous = Some(snapshot);
        Ok(changes)
    }

    /// The most recent snapshot, if any tick has succeeded.
    pub fn current(&self) -> Option<&DerivedSnapshot> {
        self.previous.as_ref()
    }

    /// Time until the clock source reaches its next whole second. A full
    /// period when the clock cannot be read.
    pub fn until_next_second(&self) -> Duration {
        match self.clock.now_utc() {
            Ok(now) => {
                let nanos = u64::from(now.timestamp_subsec_nanos().min(999_999_999));
                Duration::from_nanos(1_000_000_000 - nanos)
            }
            Err(_) => REFRESH_PERIOD,
        }
    }
}

/// Handle to a running refresh loop. Dropping it also stops the loop.
pub struct RefreshHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// `true` once `stop` was requested or the loop has exited on its own
    /// (for example because the sink closed).
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled() || self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the loop and wait until it has exited. No notification is
    /// published after this returns.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("refresh task ended abnormally: {e}");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Validate `config` and start ticking on the current tokio runtime.
///
/// # Errors
/// Returns `EngineError::InvalidTimezone` immediately for an unknown zone;
/// nothing is spawned in that case.
pub fn start<S: ChangeSink>(
    config: &EngineConfig,
    clock: Arc<dyn ClockSource>,
    sink: S,
) -> Result<RefreshHandle> {
    let refresher = Refresher::new(config, clock)?;
    let token = CancellationToken::new();
    let task = tokio::spawn(run(refresher, sink, token.clone()));
    info!(timezone = %config.timezone_id, "refresh loop started");
    Ok(RefreshHandle {
        token,
        task: Some(task),
    })
}

/// Stop a loop started with [`start`].
pub async fn stop(handle: RefreshHandle) {
    handle.stop().await;
}

async fn run<S: ChangeSink>(mut refresher: Refresher, mut sink: S, token: CancellationToken) {
    if deliver(&mut refresher, &mut sink, &token) {
        // First tick is immediate; the rest land on whole seconds of the clock source.
        let first = Instant::now() + refresher.until_next_second();
        let mut ticker = time::interval_at(first, REFRESH_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if !deliver(&mut refresher, &mut sink, &token) {
                break;
            }
        }
    }

    info!("refresh loop stopped");
}

/// Run one tick and hand its changes to `sink`. Returns `false` once the loop
/// should end.
fn deliver<S: ChangeSink>(
    refresher: &mut Refresher,
    sink: &mut S,
    token: &CancellationToken,
) -> bool {
    match refresher.tick() {
        Ok(changes) => {
            debug!(changes = changes.len(), "tick");
            for change in changes {
                if token.is_cancelled() {
                    return false;
                }
                if !sink.publish(change) {
                    info!("change sink closed");
                    return false;
                }
            }
            true
        }
        Err(e) if e.is_transient() => {
            warn!("tick skipped: {e}");
            true
        }
        Err(e) => {
            error!("tick failed: {e}");
            true
        }
    }
}
