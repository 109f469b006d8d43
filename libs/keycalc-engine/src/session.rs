//! Session - single-threaded event loop around a [`Calculator`]
//!
//! All inputs, error reverts and snapshot requests go through one queue and
//! are applied by one task, so the calculator is never touched concurrently.
//!
//! When an input opens an error window, the session schedules a one-shot
//! revert: a spawned task sleeps for `error_revert_ms` and then enqueues the
//! window's ticket. The task handle is the cancellation handle; it is aborted
//! when the session stops.
//!
//! # Example
//!
//! ```rust
//! use keycalc_engine::{Action, Calculator, Session, SessionConfig};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread()
//! #     .enable_all()
//! #     .build()
//! #     .unwrap();
//! # rt.block_on(async {
//! let (session, handle) = Session::new(Calculator::new(), SessionConfig::default());
//! let task = tokio::spawn(session.run());
//!
//! for key in ["7", "*", "6", "="] {
//!     handle.dispatch(keycalc_engine::action_for_key(key).unwrap()).unwrap();
//! }
//! assert_eq!(handle.snapshot().await.unwrap().display, "42");
//!
//! handle.shutdown();
//! let calculator = task.await.unwrap();
//! assert_eq!(calculator.display(), "42");
//! # });
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::engine::{Calculator, ErrorTicket, Snapshot};
use crate::error::{CalcError, Result};
use crate::keymap::Action;

fn default_error_revert_ms() -> u64 {
    2000
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Delay before an error display reverts to the all-clear state
    #[serde(default = "default_error_revert_ms")]
    pub error_revert_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            error_revert_ms: default_error_revert_ms(),
        }
    }
}

impl SessionConfig {
    pub fn error_revert(&self) -> Duration {
        Duration::from_millis(self.error_revert_ms)
    }
}

#[derive(Debug)]
enum Event {
    Input(Action),
    Revert(ErrorTicket),
    Flush(oneshot::Sender<Snapshot>),
}

/// Owns the calculator and processes its event queue
pub struct Session {
    calculator: Calculator,
    config: SessionConfig,
    events: mpsc::UnboundedReceiver<Event>,
    /// Weak so that the session ends once every handle is dropped
    scheduler: mpsc::WeakUnboundedSender<Event>,
    snapshots: watch::Sender<Snapshot>,
    shutdown: CancellationToken,
    pending_revert: Option<JoinHandle<()>>,
}

/// Cloneable front end used by the presentation layer
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<Event>,
    snapshots: watch::Receiver<Snapshot>,
    shutdown: CancellationToken,
}

impl Session {
    pub fn new(calculator: Calculator, config: SessionConfig) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(calculator.snapshot());
        let shutdown = CancellationToken::new();

        let session = Self {
            calculator,
            config,
            events: rx,
            scheduler: tx.downgrade(),
            snapshots: snapshot_tx,
            shutdown: shutdown.clone(),
            pending_revert: None,
        };
        let handle = SessionHandle {
            events: tx,
            snapshots: snapshot_rx,
            shutdown,
        };
        (session, handle)
    }

    /// Process events until shutdown or until every handle is dropped
    ///
    /// Returns the final calculator state.
    pub async fn run(mut self) -> Calculator {
        debug!(error_revert_ms = self.config.error_revert_ms, "Session started");

        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                event = self.events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            self.handle_event(event);
        }

        if let Some(task) = self.pending_revert.take() {
            task.abort();
            debug!("Pending error revert cancelled");
        }
        debug!("Session stopped");
        self.calculator
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Input(action) => {
                let before = self.calculator.error_ticket();
                self.calculator.apply(action);
                match self.calculator.error_ticket() {
                    Some(ticket) if before != Some(ticket) => self.schedule_revert(ticket),
                    _ => {},
                }
            },
            Event::Revert(ticket) => {
                if self.calculator.revert_error(ticket) {
                    self.pending_revert = None;
                }
            },
            Event::Flush(reply) => {
                let _ = reply.send(self.calculator.snapshot());
                return;
            },
        }

        let snapshot = self.calculator.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn schedule_revert(&mut self, ticket: ErrorTicket) {
        if let Some(previous) = self.pending_revert.take() {
            previous.abort();
        }

        let delay = self.config.error_revert();
        let scheduler = self.scheduler.clone();
        info!(?ticket, delay_ms = self.config.error_revert_ms, "Error revert scheduled");

        self.pending_revert = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(events) = scheduler.upgrade() {
                let _ = events.send(Event::Revert(ticket));
            }
        }));
    }
}

impl SessionHandle {
    /// Queue one input
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.events
            .send(Event::Input(action))
            .map_err(|_| CalcError::SessionClosed)
    }

    /// Queue several inputs in order
    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = Action>) -> Result<()> {
        actions.into_iter().try_for_each(|action| self.dispatch(action))
    }

    /// Snapshot after every previously dispatched input has been applied
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.events
            .send(Event::Flush(tx))
            .map_err(|_| CalcError::SessionClosed)?;
        rx.await.map_err(|_| CalcError::SessionClosed)
    }

    /// Receiver notified whenever the snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Stop the session; queued events are discarded
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
