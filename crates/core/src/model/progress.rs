use serde::{Deserialize, Serialize};

/// One accepted answer in a problem's trail, in step order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedStep {
    /// 1-based step number, as shown to the learner.
    pub step_number: usize,
    pub answer: String,
}

/// Persisted progression state for one problem.
///
/// Created lazily with defaults the first time a problem is visited,
/// overwritten on every relevant change while that problem is active, and
/// read back untouched when it becomes active again. Snapshots for
/// different problems are fully independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub current_step_index: usize,
    pub completed_answers: Vec<CompletedStep>,
    pub is_completed: bool,
    pub question_points: u32,
    /// False only after the problem's points were folded into the total.
    pub counter_visible: bool,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            current_step_index: 0,
            completed_answers: Vec::new(),
            is_completed: false,
            question_points: 0,
            counter_visible: true,
        }
    }
}

impl ProgressSnapshot {
    /// True when the snapshot still carries its initial defaults.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_shape() {
        let snapshot = ProgressSnapshot::default();
        assert_eq!(snapshot.current_step_index, 0);
        assert!(snapshot.completed_answers.is_empty());
        assert!(!snapshot.is_completed);
        assert_eq!(snapshot.question_points, 0);
        assert!(snapshot.counter_visible);
        assert!(snapshot.is_fresh());
    }

    #[test]
    fn snapshot_with_progress_is_not_fresh() {
        let snapshot = ProgressSnapshot {
            question_points: 10,
            ..ProgressSnapshot::default()
        };
        assert!(!snapshot.is_fresh());
    }
}
