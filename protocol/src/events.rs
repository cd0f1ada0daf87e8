//! Change notifications emitted by the inspection store.
//!
//! UI adapters subscribe to these and re-render whatever the affected entity
//! id points at; the events never carry full entity snapshots.

use serde::Serialize;
use strum_macros::AsRefStr;
use strum_macros::IntoStaticStr;

use crate::models::CommentId;
use crate::models::ResultId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, AsRefStr, IntoStaticStr)]
#[serde(tag = "event", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StoreEvent {
    /// Bootstrap finished and the hierarchy is queryable.
    HierarchyLoaded {
        sections: usize,
        subsections: usize,
        comments: usize,
    },
    /// Bootstrap failed; the store stays unusable for this session.
    BootstrapFailed { reason: String },
    ResultAdded {
        result_id: ResultId,
        comment_id: CommentId,
    },
    ResultRemoved {
        result_id: ResultId,
        comment_id: CommentId,
    },
    SeverityChanged { result_id: ResultId, severity: u8 },
    NoteChanged { result_id: ResultId },
    PhotoChanged { result_id: ResultId },
    FlagsChanged { result_id: ResultId },
    /// The backend acknowledged a submitted result.
    ResultSubmitted { result_id: ResultId, accepted: bool },
}

impl StoreEvent {
    /// Stable snake_case event name.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Id of the entity the event concerns: the result id for result events,
    /// `None` for store-wide events.
    pub fn entity_id(&self) -> Option<ResultId> {
        match self {
            Self::HierarchyLoaded { .. } | Self::BootstrapFailed { .. } => None,
            Self::ResultAdded { result_id, .. }
            | Self::ResultRemoved { result_id, .. }
            | Self::SeverityChanged { result_id, .. }
            | Self::NoteChanged { result_id }
            | Self::PhotoChanged { result_id }
            | Self::FlagsChanged { result_id }
            | Self::ResultSubmitted { result_id, .. } => Some(*result_id),
        }
    }
}

impl std::fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.entity_id() {
            Some(id) => write!(f, "{} #{id}", self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}
