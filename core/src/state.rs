//! The synchronous heart of the store: catalog plus result ledger.
//!
//! `InspectionState` has no locking and no I/O. [`crate::InspectionStore`]
//! wraps it in a mutex and adds bootstrap, events and backend sync.

use homeinspect_protocol::CommentId;
use homeinspect_protocol::InspectionResult;
use homeinspect_protocol::ResultId;
use homeinspect_protocol::SectionId;
use homeinspect_protocol::SubSectionId;
use homeinspect_protocol::models::PLACEHOLDER_INSPECTION_ID;

use crate::catalog::Catalog;
use crate::error::LookupError;
use crate::ledger::ResultLedger;

/// Returned by [`InspectionState::subsection_text`] when nothing matches.
pub const NOT_FOUND_TEXT: &str = "Not Found";

/// Severity after one tap on the severity control.
///
/// Cycles 1 → 2 → 1. A third severity level exists in the product vocabulary
/// but this formula never produces it; kept as-is pending product review.
pub fn next_severity(current: u8) -> u8 {
    (current % 2) + 1
}

/// Inspection id for a newly created result. Always the offline placeholder
/// until the backend can hand out inspection ids.
pub fn next_inspection_id() -> i64 {
    PLACEHOLDER_INSPECTION_ID
}

#[derive(Debug, Clone, Default)]
pub struct InspectionState {
    catalog: Catalog,
    ledger: ResultLedger,
}

impl InspectionState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ledger: ResultLedger::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &ResultLedger {
        &self.ledger
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Name of the subsection listed at `subsection_position` in the section
    /// at `section_position`, or [`NOT_FOUND_TEXT`].
    pub fn subsection_text(&self, section_position: usize, subsection_position: usize) -> String {
        self.catalog
            .subsection_at(section_position, subsection_position)
            .map(|subsection| subsection.display_name().to_string())
            .unwrap_or_else(|| NOT_FOUND_TEXT.to_string())
    }

    /// Map a table row to a comment id.
    ///
    /// Variant rows are listed before comment rows, so the comment index is
    /// `row - variant_count`. Rows that land on a variant, and positions out
    /// of range, yield `None`.
    pub fn comment_id(
        &self,
        section_position: usize,
        subsection_position: usize,
        row: usize,
    ) -> Option<CommentId> {
        let subsection = self
            .catalog
            .subsection_at(section_position, subsection_position)?;
        let index = row.checked_sub(subsection.variant_ids.len())?;
        subsection.comment_ids.get(index).copied()
    }

    pub fn lookup_comment_text(&self, comment_id: CommentId) -> Result<&str, LookupError> {
        self.catalog
            .comment(comment_id)
            .map(|comment| comment.text.as_str())
            .ok_or(LookupError::Comment(comment_id))
    }

    /// Comment text, or a descriptive message when the id is unknown.
    pub fn comment_text(&self, comment_id: CommentId) -> String {
        match self.lookup_comment_text(comment_id) {
            Ok(text) => text.to_string(),
            Err(_) => format!(
                "Error getting text for comment: Id {comment_id} out of range ({})",
                self.catalog.comment_count()
            ),
        }
    }

    pub fn section_for_subsection(
        &self,
        subsection_id: SubSectionId,
    ) -> Result<SectionId, LookupError> {
        self.catalog
            .subsection(subsection_id)
            .map(|subsection| subsection.section_id)
            .ok_or(LookupError::SubSection(subsection_id))
    }

    pub fn result(&self, result_id: ResultId) -> Option<&InspectionResult> {
        self.ledger.get(result_id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Attach a new result to `comment_id`, replacing any previous link.
    pub fn add_result(&mut self, comment_id: CommentId) -> Result<ResultId, LookupError> {
        if self.catalog.comment(comment_id).is_none() {
            return Err(LookupError::Comment(comment_id));
        }
        let result_id = self.ledger.allocate(comment_id, next_inspection_id());
        self.catalog.link_result(comment_id, Some(result_id));
        Ok(result_id)
    }

    /// Delete a result, unlink it from its comment and free its id. Returns
    /// the comment the result belonged to.
    pub fn remove_result(&mut self, result_id: ResultId) -> Result<CommentId, LookupError> {
        let removed = self
            .ledger
            .release(result_id)
            .ok_or(LookupError::Result(result_id))?;

        let still_linked = self
            .catalog
            .comment(removed.comment_id)
            .is_some_and(|comment| comment.result_id == Some(result_id));
        if still_linked {
            self.catalog.link_result(removed.comment_id, None);
        }
        Ok(removed.comment_id)
    }

    pub fn change_severity(&mut self, result_id: ResultId) -> Result<u8, LookupError> {
        let result = self.result_mut(result_id)?;
        result.severity = next_severity(result.severity);
        Ok(result.severity)
    }

    pub fn change_note(&mut self, result_id: ResultId, note: String) -> Result<String, LookupError> {
        let result = self.result_mut(result_id)?;
        result.note = note;
        Ok(result.note.clone())
    }

    pub fn change_photo(
        &mut self,
        result_id: ResultId,
        photo_path: String,
    ) -> Result<String, LookupError> {
        let result = self.result_mut(result_id)?;
        result.photo_path = Some(photo_path.clone());
        Ok(photo_path)
    }

    pub fn change_flags(
        &mut self,
        result_id: ResultId,
        flags: Vec<i8>,
    ) -> Result<Vec<i8>, LookupError> {
        let result = self.result_mut(result_id)?;
        result.flags = flags;
        Ok(result.flags.clone())
    }

    fn result_mut(&mut self, result_id: ResultId) -> Result<&mut InspectionResult, LookupError> {
        self.ledger
            .get_mut(result_id)
            .ok_or(LookupError::Result(result_id))
    }
}
