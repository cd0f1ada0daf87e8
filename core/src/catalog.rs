//! Immutable reference data for a session: sections, subsections, comments.
//!
//! Entities are keyed by id in hash maps, so gaps or unusual id bases in the
//! backend data do not break lookups. Sections additionally keep a display
//! order (ascending id) because the UI addresses them by position.

use std::collections::HashMap;

use homeinspect_protocol::Comment;
use homeinspect_protocol::CommentId;
use homeinspect_protocol::ResultId;
use homeinspect_protocol::Section;
use homeinspect_protocol::SectionId;
use homeinspect_protocol::SubSection;
use homeinspect_protocol::SubSectionId;
use homeinspect_protocol::models::VariantId;
use homeinspect_protocol::wire::CommentPayload;
use homeinspect_protocol::wire::HierarchyPayload;
use homeinspect_protocol::wire::SubSectionPayload;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sections: HashMap<SectionId, Section>,
    section_order: Vec<SectionId>,
    subsections: HashMap<SubSectionId, SubSection>,
    comments: HashMap<CommentId, Comment>,
}

impl Catalog {
    /// An empty catalog holding only the sentinel comment.
    pub fn with_sentinel() -> Self {
        let sentinel = Comment::sentinel();
        let mut comments = HashMap::new();
        comments.insert(sentinel.id, sentinel);
        Self {
            comments,
            ..Self::default()
        }
    }

    /// Build the catalog from a hierarchy response.
    ///
    /// Entities keep the backend's listing order inside their parent. The
    /// first occurrence of an id wins; repeats are skipped and logged, and a
    /// skipped section takes its subsections with it.
    pub fn from_payload(payload: &HierarchyPayload) -> Self {
        let mut catalog = Self::with_sentinel();

        for section_json in &payload.data {
            let section_id = section_json.id;
            if catalog.sections.contains_key(&section_id) {
                tracing::warn!(section_id, "duplicate section id in hierarchy, skipping");
                continue;
            }
            catalog
                .sections
                .insert(section_id, Section::new(section_id, section_json.name.clone()));

            for subsection_json in &section_json.subsections {
                catalog.insert_subsection(section_id, subsection_json);
            }
        }

        catalog.section_order = catalog.sections.keys().copied().collect();
        catalog.section_order.sort_unstable();

        tracing::debug!(
            sections = catalog.sections.len(),
            subsections = catalog.subsections.len(),
            comments = catalog.comments.len(),
            "parsed hierarchy"
        );
        catalog
    }

    fn insert_subsection(&mut self, parent: SectionId, json: &SubSectionPayload) {
        let subsection_id = json.id;
        if self.subsections.contains_key(&subsection_id) {
            tracing::warn!(subsection_id, "duplicate subsection id in hierarchy, skipping");
            return;
        }

        self.subsections.insert(
            subsection_id,
            SubSection::new(subsection_id, json.name.clone(), json.sec_id),
        );
        if let Some(section) = self.sections.get_mut(&parent) {
            section.subsection_ids.push(subsection_id);
        }

        for comment_json in &json.comments {
            self.insert_comment(subsection_id, comment_json);
        }
    }

    fn insert_comment(&mut self, parent: SubSectionId, json: &CommentPayload) {
        let comment_id = json.id;
        if self.comments.contains_key(&comment_id) {
            tracing::warn!(comment_id, "duplicate comment id in hierarchy, skipping");
            return;
        }

        self.comments.insert(
            comment_id,
            Comment {
                id: comment_id,
                subsection_id: json.subsec_id,
                rank: json.rank,
                text: json.comment.clone().unwrap_or_default(),
                // The backend does not send default flags yet.
                default_flags: Vec::new(),
                active: json.active,
                result_id: None,
            },
        );
        if let Some(subsection) = self.subsections.get_mut(&parent) {
            subsection.comment_ids.push(comment_id);
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn subsection_count(&self) -> usize {
        self.subsections.len()
    }

    /// Number of comments, sentinel included.
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Sections in display order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.section_order
            .iter()
            .filter_map(|id| self.sections.get(id))
    }

    pub fn section_at(&self, position: usize) -> Option<&Section> {
        self.section_order
            .get(position)
            .and_then(|id| self.sections.get(id))
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    pub fn subsection(&self, id: SubSectionId) -> Option<&SubSection> {
        self.subsections.get(&id)
    }

    /// The subsection listed at `subsection_position` within the section at
    /// `section_position`.
    pub fn subsection_at(
        &self,
        section_position: usize,
        subsection_position: usize,
    ) -> Option<&SubSection> {
        let section = self.section_at(section_position)?;
        let subsection_id = section.subsection_ids.get(subsection_position)?;
        self.subsections.get(subsection_id)
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.get(&id)
    }

    /// Comment ids in ascending order, sentinel first.
    pub fn comment_ids(&self) -> Vec<CommentId> {
        let mut ids: Vec<CommentId> = self.comments.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn link_result(&mut self, comment_id: CommentId, result_id: Option<ResultId>) -> bool {
        match self.comments.get_mut(&comment_id) {
            Some(comment) => {
                comment.result_id = result_id;
                true
            }
            None => false,
        }
    }

    /// The backend never sends variants, so tests attach them by hand.
    #[cfg(test)]
    pub(crate) fn set_variants(&mut self, subsection_id: SubSectionId, variant_ids: Vec<VariantId>) {
        if let Some(subsection) = self.subsections.get_mut(&subsection_id) {
            subsection.variant_ids = variant_ids;
        }
    }
}
