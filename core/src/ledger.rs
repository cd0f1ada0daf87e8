//! Slot allocator for results.
//!
//! A result id is its slot number. Removing a result leaves a hole and pushes
//! the id on a reuse stack; the next allocation pops that stack (LIFO) before
//! minting a fresh id, so ids stay within `[0, next_id)`.

use homeinspect_protocol::CommentId;
use homeinspect_protocol::InspectionResult;
use homeinspect_protocol::ResultId;

#[derive(Debug, Clone, Default)]
pub struct ResultLedger {
    slots: Vec<Option<InspectionResult>>,
    reusable: Vec<ResultId>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id that would be minted when no hole is available.
    pub fn next_id(&self) -> ResultId {
        self.slots.len()
    }

    /// Freed ids awaiting reuse; the last element is handed out first.
    pub fn reusable_ids(&self) -> &[ResultId] {
        &self.reusable
    }

    pub fn allocate(&mut self, comment_id: CommentId, inspection_id: i64) -> ResultId {
        match self.reusable.pop() {
            Some(id) => {
                self.slots[id] = Some(InspectionResult::new(id, inspection_id, comment_id));
                id
            }
            None => {
                let id = self.slots.len();
                self.slots
                    .push(Some(InspectionResult::new(id, inspection_id, comment_id)));
                id
            }
        }
    }

    /// Empty the slot and queue its id for reuse. `None` if the slot is
    /// already a hole or out of range.
    pub fn release(&mut self, id: ResultId) -> Option<InspectionResult> {
        let removed = self.slots.get_mut(id)?.take()?;
        self.reusable.push(id);
        Some(removed)
    }

    pub fn get(&self, id: ResultId) -> Option<&InspectionResult> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ResultId) -> Option<&mut InspectionResult> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }

    pub fn live(&self) -> impl Iterator<Item = &InspectionResult> {
        self.slots.iter().flatten()
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }
}
