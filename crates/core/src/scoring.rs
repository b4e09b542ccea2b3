//! Weighted completion scoring for a single topic.

use crate::model::{Checklist, ChecklistProgress, ItemKey};

/// Points awarded per unit of item weight.
pub const SCORE_SCALE: f64 = 100.0;

/// Completion statistics for the checklists of one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TopicStats {
    pub total_items: usize,
    pub completed_items: usize,
    pub completion_percentage: f64,
    pub total_score: f64,
}

impl TopicStats {
    /// True when the topic has items and every one of them is completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_items > 0 && self.completed_items == self.total_items
    }
}

/// Score every (checklist, item) pair against the progress map.
///
/// The score is additive over completed items and is not normalized; the
/// percentage is 0 for a topic without items.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_topic<'a>(
    checklists: impl IntoIterator<Item = &'a Checklist>,
    progress: &ChecklistProgress,
) -> TopicStats {
    let mut stats = TopicStats::default();

    for checklist in checklists {
        for item in &checklist.items {
            stats.total_items += 1;
            if progress.is_completed(ItemKey::new(checklist.id, item.id)) {
                stats.completed_items += 1;
                stats.total_score += item.weight * SCORE_SCALE;
            }
        }
    }

    if stats.total_items > 0 {
        stats.completion_percentage =
            stats.completed_items as f64 / stats.total_items as f64 * 100.0;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChecklistId, ChecklistItem, ItemId, TopicId};

    fn key(checklist: u64, item: u64) -> ItemKey {
        ItemKey::new(ChecklistId::new(checklist), ItemId::new(item))
    }

    fn two_item_topic() -> Vec<Checklist> {
        vec![
            Checklist::new(ChecklistId::new(1), TopicId::new(1), "c")
                .with_item(ChecklistItem::new(ItemId::new(1), "first", 0.3))
                .with_item(ChecklistItem::new(ItemId::new(2), "second", 0.7)),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_topic_scores_zero() {
        let stats = score_topic(&Vec::<Checklist>::new(), &ChecklistProgress::new());
        assert_eq!(stats, TopicStats::default());
        assert!(!stats.is_complete());

        let empty_checklist = vec![Checklist::new(ChecklistId::new(1), TopicId::new(1), "c")];
        let stats = score_topic(&empty_checklist, &ChecklistProgress::new());
        assert_eq!(stats.completion_percentage, 0.0);
    }

    #[test]
    fn partial_completion_scores_weight() {
        let checklists = two_item_topic();
        let mut progress = ChecklistProgress::new();
        progress.set(key(1, 1), true);

        let stats = score_topic(&checklists, &progress);
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.completed_items, 1);
        assert!(approx(stats.completion_percentage, 50.0));
        assert!(approx(stats.total_score, 30.0));
    }

    #[test]
    fn full_completion_sums_all_weights() {
        let checklists = two_item_topic();
        let mut progress = ChecklistProgress::new();
        progress.set(key(1, 1), true);
        progress.set(key(1, 2), true);

        let stats = score_topic(&checklists, &progress);
        assert!(approx(stats.completion_percentage, 100.0));
        assert!(approx(stats.total_score, 100.0));
        assert!(stats.is_complete());
    }

    #[test]
    fn explicit_false_and_foreign_entries_are_ignored() {
        let checklists = two_item_topic();
        let mut progress = ChecklistProgress::new();
        progress.set(key(1, 1), false);
        progress.set(key(9, 1), true);

        let stats = score_topic(&checklists, &progress);
        assert_eq!(stats.completed_items, 0);
        assert_eq!(stats.total_score, 0.0);
    }

    #[test]
    fn zero_weights_count_toward_percentage_only() {
        let checklists = vec![
            Checklist::new(ChecklistId::new(1), TopicId::new(1), "c")
                .with_item(ChecklistItem::new(ItemId::new(1), "free", 0.0)),
        ];
        let mut progress = ChecklistProgress::new();
        progress.set(key(1, 1), true);

        let stats = score_topic(&checklists, &progress);
        assert!(approx(stats.completion_percentage, 100.0));
        assert_eq!(stats.total_score, 0.0);
    }
}
