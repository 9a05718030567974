//! Aggregate statistics over a snapshot of task records.

use super::TaskRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary counts for a task collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    /// Number of tasks.
    pub total: usize,
    /// Number of complete tasks.
    pub completed: usize,
    /// Number of pending tasks.
    pub pending: usize,
    /// Pending tasks whose due date has passed.
    pub overdue: usize,
    /// Pending tasks with high or critical priority.
    pub high_priority: usize,
    /// Percentage of complete tasks, rounded to two decimal places.
    pub completion_rate: f64,
}

impl TaskStatistics {
    /// Computes statistics from one snapshot of the collection.
    ///
    /// Overdue and high-priority counts only consider pending tasks.
    #[must_use]
    pub fn from_snapshot(records: &[TaskRecord], now: DateTime<Utc>) -> Self {
        let total = records.len();
        let completed = records.iter().filter(|task| task.is_complete()).count();
        let overdue = records
            .iter()
            .filter(|task| task.is_overdue_at(now))
            .count();
        let high_priority = records
            .iter()
            .filter(|task| !task.is_complete() && task.priority().is_high())
            .count();

        Self {
            total,
            completed,
            pending: total.saturating_sub(completed),
            overdue,
            high_priority,
            completion_rate: completion_rate(completed, total),
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "completion rate is a presentational percentage"
)]
fn completion_rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percentage = completed as f64 / total as f64 * 100.0;
    (percentage * 100.0).round_ties_even() / 100.0
}
