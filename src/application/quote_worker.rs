//! Single-consumer quote worker.
//!
//! Every input change is submitted as a task stamped with a fresh generation.
//! The worker only ever runs the newest task: queued tasks are drained to the
//! latest, and a task still in flight is dropped as soon as a newer one
//! arrives. Results are published only while their generation is current, so
//! a superseded search can never overwrite fresher state. Submitting marks
//! the new generation as searching immediately, before the worker picks it
//! up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::quote_service::{Quote, QuoteRequest, QuoteService};
use crate::shared::config::WorkerConfig;
use crate::shared::errors::{AppError, QuoteError};

/// Monotonically increasing request generation
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next generation, superseding all earlier ones
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

#[derive(Debug, Clone)]
pub enum QuoteOutcome {
    Quoted(Box<Quote>),
    Rejected(QuoteError),
}

impl QuoteOutcome {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            QuoteOutcome::Quoted(quote) => Some(quote),
            QuoteOutcome::Rejected(_) => None,
        }
    }
}

/// Observable worker state
#[derive(Debug, Clone, Default)]
pub struct QuoteState {
    /// Generation of the request `is_searching` and `outcome` refer to
    pub generation: u64,
    pub is_searching: bool,
    /// Last applied result; kept while a newer search runs
    pub outcome: Option<QuoteOutcome>,
}

#[derive(Debug)]
struct QuoteTask {
    generation: u64,
    request: QuoteRequest,
}

pub struct QuoteWorker {
    service: Arc<QuoteService>,
    generation: Arc<RequestGeneration>,
    state: Arc<watch::Sender<QuoteState>>,
    debounce: Duration,
}

/// Move the observable state to `generation` as searching, never backwards
fn mark_searching(state: &watch::Sender<QuoteState>, generation: u64) {
    state.send_if_modified(|state| {
        if generation < state.generation || (generation == state.generation && state.is_searching) {
            return false;
        }
        state.generation = generation;
        state.is_searching = true;
        true
    });
}

impl QuoteWorker {
    /// Spawn the worker on the current tokio runtime
    pub fn spawn(service: Arc<QuoteService>, config: &WorkerConfig) -> QuoteHandle {
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let (state, state_rx) = watch::channel(QuoteState::default());
        let state = Arc::new(state);
        let generation = Arc::new(RequestGeneration::new());

        let worker = Self {
            service,
            generation: generation.clone(),
            state: state.clone(),
            debounce: Duration::from_millis(config.debounce_ms),
        };
        let join = tokio::spawn(worker.run(receiver));

        QuoteHandle {
            sender,
            generation,
            publisher: Arc::downgrade(&state),
            state: state_rx,
            join,
        }
    }

    async fn run(self, mut receiver: mpsc::Receiver<QuoteTask>) {
        info!("🚀 Quote worker started");
        let mut pending: Option<QuoteTask> = None;

        loop {
            let task = match pending.take() {
                Some(task) => task,
                None => match receiver.recv().await {
                    Some(task) => task,
                    None => break,
                },
            };
            let mut task = Self::drain_to_newest(task, &mut receiver);

            if !self.debounce.is_zero() {
                tokio::time::sleep(self.debounce).await;
                task = Self::drain_to_newest(task, &mut receiver);
            }

            if !self.generation.is_current(task.generation) {
                debug!("Skipping stale request {}", task.generation);
                continue;
            }
            self.publish_searching(task.generation);

            let quote = self.service.quote(&task.request);
            tokio::pin!(quote);

            tokio::select! {
                result = &mut quote => self.publish(task.generation, result),
                newer = receiver.recv() => match newer {
                    Some(newer) => {
                        debug!("Request {} superseded by {}", task.generation, newer.generation);
                        pending = Some(newer);
                    }
                    None => {
                        let result = (&mut quote).await;
                        self.publish(task.generation, result);
                        break;
                    }
                },
            }
        }

        info!("Quote worker stopped");
    }

    fn drain_to_newest(mut task: QuoteTask, receiver: &mut mpsc::Receiver<QuoteTask>) -> QuoteTask {
        while let Ok(newer) = receiver.try_recv() {
            debug!("Dropping queued request {}", task.generation);
            task = newer;
        }
        task
    }

    fn publish_searching(&self, generation: u64) {
        mark_searching(&self.state, generation);
    }

    fn publish(&self, generation: u64, result: Result<Quote, QuoteError>) {
        let outcome = match result {
            Ok(quote) => QuoteOutcome::Quoted(Box::new(quote)),
            Err(e) => {
                debug!("Request {} rejected: {}", generation, e);
                QuoteOutcome::Rejected(e)
            }
        };

        // Checked under the state lock so a concurrent submit cannot be overwritten
        let applied = self.state.send_if_modified(|state| {
            if !self.generation.is_current(generation) {
                return false;
            }
            *state = QuoteState {
                generation,
                is_searching: false,
                outcome: Some(outcome),
            };
            true
        });
        if !applied {
            debug!("Discarding stale result for request {}", generation);
        }
    }
}

/// Caller side of a running [`QuoteWorker`]
pub struct QuoteHandle {
    sender: mpsc::Sender<QuoteTask>,
    generation: Arc<RequestGeneration>,
    /// Owned by the worker, so state watchers see it close when the worker stops
    publisher: Weak<watch::Sender<QuoteState>>,
    state: watch::Receiver<QuoteState>,
    join: JoinHandle<()>,
}

impl QuoteHandle {
    /// Enqueue a request, superseding everything submitted before it.
    /// Returns the request's generation.
    pub async fn submit(&self, request: QuoteRequest) -> Result<u64, AppError> {
        let publisher = self.publisher.upgrade().ok_or(AppError::WorkerStopped)?;
        let generation = self.generation.issue();
        mark_searching(&publisher, generation);
        drop(publisher);
        self.sender
            .send(QuoteTask { generation, request })
            .await
            .map_err(|_| AppError::WorkerStopped)?;
        Ok(generation)
    }

    pub fn subscribe(&self) -> watch::Receiver<QuoteState> {
        self.state.clone()
    }

    pub fn current(&self) -> QuoteState {
        self.state.borrow().clone()
    }

    /// Wait for the result of `generation`. `None` once a newer request
    /// supersedes it or the worker stops.
    pub async fn wait_for(&self, generation: u64) -> Option<QuoteOutcome> {
        let mut state = self.subscribe();
        let ready = state
            .wait_for(|s| {
                s.generation > generation
                    || (s.generation == generation && !s.is_searching && s.outcome.is_some())
            })
            .await
            .ok()?;
        if ready.generation == generation {
            ready.outcome.clone()
        } else {
            None
        }
    }

    /// Stop accepting requests and wait for the worker to finish
    pub async fn shutdown(self) -> Result<(), AppError> {
        drop(self.sender);
        self.join.await.map_err(|_| AppError::WorkerStopped)
    }
}
