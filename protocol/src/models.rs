//! Domain entities for a single inspection session.
//!
//! Sections, subsections and comments are reference data loaded once from the
//! backend. Results are user findings attached to comments and are the only
//! entities created and destroyed during a session.

use serde::Deserialize;
use serde::Serialize;

pub type SectionId = i64;
pub type SubSectionId = i64;
pub type CommentId = i64;
pub type VariantId = i64;

/// Slot number of a result in the store's result ledger.
pub type ResultId = usize;

/// Inspection id carried by results that the backend has not accepted yet.
pub const PLACEHOLDER_INSPECTION_ID: i64 = -1;

/// Severity assigned to a freshly created result.
pub const INITIAL_SEVERITY: u8 = 1;

/// Id reserved for the sentinel comment.
pub const SENTINEL_COMMENT_ID: CommentId = 0;

/// Text of the sentinel comment.
pub const SENTINEL_COMMENT_TEXT: &str = "ERROR, COMMENT WITH ID 0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub name: Option<String>,
    /// Subsections in the order the backend listed them.
    pub subsection_ids: Vec<SubSectionId>,
}

impl Section {
    pub fn new(id: SectionId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            subsection_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSection {
    pub id: SubSectionId,
    pub name: Option<String>,
    /// Owning section, as reported by the backend (`sec_id`).
    pub section_id: SectionId,
    /// Comments in the order the backend listed them.
    pub comment_ids: Vec<CommentId>,
    /// Finding-type variants. Rendered ahead of the comments in the same row
    /// space, so they offset comment row positions.
    pub variant_ids: Vec<VariantId>,
}

impl SubSection {
    pub fn new(id: SubSectionId, name: Option<String>, section_id: SectionId) -> Self {
        Self {
            id,
            name,
            section_id,
            comment_ids: Vec::new(),
            variant_ids: Vec::new(),
        }
    }

    /// Display name, or the empty string when the backend sent none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub subsection_id: SubSectionId,
    /// Display order within the subsection.
    pub rank: i64,
    pub text: String,
    pub default_flags: Vec<i8>,
    pub active: bool,
    /// Result currently attached to this comment, if any.
    pub result_id: Option<ResultId>,
}

impl Comment {
    /// The placeholder comment occupying id 0.
    pub fn sentinel() -> Self {
        Self {
            id: SENTINEL_COMMENT_ID,
            subsection_id: -1,
            rank: -1,
            text: SENTINEL_COMMENT_TEXT.to_string(),
            default_flags: Vec::new(),
            active: false,
            result_id: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_COMMENT_ID
    }
}

/// A finding the inspector attached to a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionResult {
    pub id: ResultId,
    /// Negative until the backend assigns a permanent inspection id.
    pub inspection_id: i64,
    pub comment_id: CommentId,
    pub variant_id: Option<VariantId>,
    pub severity: u8,
    pub note: String,
    pub photo_path: Option<String>,
    pub flags: Vec<i8>,
}

impl InspectionResult {
    pub fn new(id: ResultId, inspection_id: i64, comment_id: CommentId) -> Self {
        Self {
            id,
            inspection_id,
            comment_id,
            variant_id: None,
            severity: INITIAL_SEVERITY,
            note: String::new(),
            photo_path: None,
            flags: Vec::new(),
        }
    }

    /// Whether the backend has accepted this result yet.
    pub fn is_synced(&self) -> bool {
        self.inspection_id >= 0
    }
}
