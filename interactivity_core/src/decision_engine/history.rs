//! Novelty history: the ordered record of types already chosen in a module.

use serde::{Deserialize, Serialize};
use storyboard_rules::InteractivityTypeId;

/// Interaction types chosen so far in one module, oldest first.
///
/// This is the only state carried from one scene decision to the next. It is passed
/// in and handed back explicitly rather than kept inside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoveltyHistory {
    chosen: Vec<InteractivityTypeId>,
}

impl NoveltyHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history from ids in insertion order.
    pub fn from_ids(ids: impl IntoIterator<Item = InteractivityTypeId>) -> Self {
        Self {
            chosen: ids.into_iter().collect(),
        }
    }

    /// The last `size` entries, oldest first.
    pub fn window(&self, size: usize) -> &[InteractivityTypeId] {
        let start = self.chosen.len().saturating_sub(size);
        &self.chosen[start..]
    }

    /// How recently `id` was used inside the last `size` entries.
    ///
    /// `Some(0)` means it was the most recent choice; `None` means it is absent
    /// from the window.
    pub fn recency(&self, id: InteractivityTypeId, size: usize) -> Option<usize> {
        self.window(size).iter().rev().position(|c| *c == id)
    }

    /// Append a choice. `None` (no interaction) leaves the history untouched.
    pub fn record(mut self, choice: Option<InteractivityTypeId>) -> Self {
        self.push(choice);
        self
    }

    /// In-place variant of [`NoveltyHistory::record`].
    pub fn push(&mut self, choice: Option<InteractivityTypeId>) {
        if let Some(id) = choice {
            self.chosen.push(id);
        }
    }

    /// All recorded choices, oldest first.
    pub fn as_slice(&self) -> &[InteractivityTypeId] {
        &self.chosen
    }

    /// Number of recorded choices.
    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    /// Whether nothing has been chosen yet.
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }
}

impl From<Vec<InteractivityTypeId>> for NoveltyHistory {
    fn from(chosen: Vec<InteractivityTypeId>) -> Self {
        Self { chosen }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InteractivityTypeId::*;

    #[test]
    fn test_window_takes_most_recent() {
        let history = NoveltyHistory::from_ids([Hotspot, Matching, Reflection, Sequencing]);
        assert_eq!(history.window(3), &[Matching, Reflection, Sequencing]);
        assert_eq!(history.window(10).len(), 4);
        assert!(NoveltyHistory::new().window(3).is_empty());
    }

    #[test]
    fn test_recency_counts_from_most_recent() {
        let history = NoveltyHistory::from_ids([Hotspot, Matching, Reflection]);
        assert_eq!(history.recency(Reflection, 3), Some(0));
        assert_eq!(history.recency(Matching, 3), Some(1));
        assert_eq!(history.recency(Hotspot, 3), Some(2));
        assert_eq!(history.recency(Flashcards, 3), None);
    }

    #[test]
    fn test_recency_uses_latest_occurrence() {
        let history = NoveltyHistory::from_ids([Hotspot, Matching, Hotspot]);
        assert_eq!(history.recency(Hotspot, 3), Some(0));
    }

    #[test]
    fn test_entries_outside_window_are_ignored() {
        let history = NoveltyHistory::from_ids([Hotspot, Matching, Reflection, Sequencing]);
        assert_eq!(history.recency(Hotspot, 3), None);
    }

    #[test]
    fn test_record_skips_none() {
        let history = NoveltyHistory::new()
            .record(Some(CaseStudy))
            .record(None)
            .record(Some(Flashcards));
        assert_eq!(history.as_slice(), &[CaseStudy, Flashcards]);
    }
}
