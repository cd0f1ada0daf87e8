//! Error taxonomy for the inspection store.
//!
//! Query paths recover [`LookupError`] into sentinel strings; mutation paths
//! return it. Bootstrap failures are sticky: once recorded, every query
//! reports [`StoreError::BootstrapFailed`].

use std::time::Duration;

use homeinspect_backend_client::ClientError;
use homeinspect_protocol::CommentId;
use homeinspect_protocol::ResultId;
use homeinspect_protocol::SectionId;
use homeinspect_protocol::SubSectionId;
use homeinspect_utils_readiness::ReadinessError;
use thiserror::Error;

/// An id that does not resolve to a live entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no section at position {0}")]
    SectionPosition(usize),

    #[error("section {0} not found")]
    Section(SectionId),

    #[error("subsection {0} not found")]
    SubSection(SubSectionId),

    #[error("comment {0} not found")]
    Comment(CommentId),

    #[error("result {0} not found")]
    Result(ResultId),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not initialized yet")]
    NotReady,

    #[error("bootstrap failed: {0}")]
    BootstrapFailed(String),

    #[error("bootstrap did not finish within {0:?}")]
    BootstrapTimeout(Duration),

    #[error("wait for bootstrap was cancelled")]
    Cancelled,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<ReadinessError> for StoreError {
    fn from(err: ReadinessError) -> Self {
        match err {
            ReadinessError::Failed(reason) => Self::BootstrapFailed(reason),
            ReadinessError::TimedOut(after) => Self::BootstrapTimeout(after),
            ReadinessError::Cancelled => Self::Cancelled,
            ReadinessError::Closed => Self::NotReady,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
