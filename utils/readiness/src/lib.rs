//! One-shot readiness latch.
//!
//! A latch starts `Pending` and moves exactly once to either `Ready` or
//! `Failed`. Waiters suspend on a `tokio::sync::watch` channel instead of
//! polling, and every wait can be bounded by a timeout and raced against a
//! `CancellationToken`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    Pending,
    Ready,
    Failed(String),
}

impl ReadinessState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    fn into_result(self) -> Result<(), ReadinessError> {
        match self {
            Self::Ready => Ok(()),
            Self::Failed(reason) => Err(ReadinessError::Failed(reason)),
            Self::Pending => Err(ReadinessError::Closed),
        }
    }
}

/// Why a wait ended without the latch becoming ready.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("initialization failed: {0}")]
    Failed(String),

    #[error("not ready after {0:?}")]
    TimedOut(Duration),

    #[error("wait cancelled")]
    Cancelled,

    #[error("readiness source dropped before completing")]
    Closed,
}

/// Something that becomes ready (or fails) once.
#[async_trait]
pub trait Readiness: Send + Sync {
    fn state(&self) -> ReadinessState;

    fn is_ready(&self) -> bool {
        self.state() == ReadinessState::Ready
    }

    /// Suspend until the state is terminal.
    async fn wait_ready(&self) -> Result<(), ReadinessError>;
}

#[derive(Debug)]
pub struct ReadinessLatch {
    tx: watch::Sender<ReadinessState>,
}

impl Default for ReadinessLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessLatch {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReadinessState::Pending);
        Self { tx }
    }

    /// Move to `Ready`. Returns false if the latch was already terminal.
    pub fn mark_ready(&self) -> bool {
        self.transition(ReadinessState::Ready)
    }

    /// Move to `Failed`. Returns false if the latch was already terminal.
    pub fn mark_failed(&self, reason: impl Into<String>) -> bool {
        self.transition(ReadinessState::Failed(reason.into()))
    }

    fn transition(&self, next: ReadinessState) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_terminal() {
                return false;
            }
            *state = next;
            true
        })
    }

    pub async fn wait_timeout(&self, timeout: Duration) -> Result<(), ReadinessError> {
        match tokio::time::timeout(timeout, self.wait_ready()).await {
            Ok(result) => result,
            Err(_) => Err(ReadinessError::TimedOut(timeout)),
        }
    }

    /// Like [`wait_timeout`](Self::wait_timeout), but also gives up when
    /// `cancel` fires.
    pub async fn wait_or_cancel(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), ReadinessError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ReadinessError::Cancelled),
            res = self.wait_timeout(timeout) => res,
        }
    }
}

#[async_trait]
impl Readiness for ReadinessLatch {
    fn state(&self) -> ReadinessState {
        self.tx.borrow().clone()
    }

    async fn wait_ready(&self) -> Result<(), ReadinessError> {
        let mut rx = self.tx.subscribe();
        let state = {
            let guard = rx
                .wait_for(ReadinessState::is_terminal)
                .await
                .map_err(|_| ReadinessError::Closed)?;
            (*guard).clone()
        };
        state.into_result()
    }
}
