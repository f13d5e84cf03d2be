//! Derived task views.
//!
//! Pure functions from the full task collection plus a filter selection and
//! an explicit evaluation instant to the list the UI renders. Nothing here
//! mutates the store.
//!
//! Bucket rules worth knowing:
//! - `today` matches on calendar date, completed or not;
//! - `upcoming` is the union of overdue incomplete tasks and incomplete
//!   tasks due within the next 7 days. Overdue and upcoming overlap on
//!   purpose;
//! - `overdue` means incomplete and strictly before the start of today.

use crate::models::{Priority, Task};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bucket {
    #[default]
    All,
    Today,
    Upcoming,
    Overdue,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

/// The render-ready result: both sections sorted ascending by deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    pub incomplete: Vec<Task>,
    pub completed: Vec<Task>,
}

pub fn filter_tasks(
    tasks: &[Task],
    user_id: &str,
    bucket: Bucket,
    priority: PriorityFilter,
    now: DateTime<Utc>,
) -> TaskView {
    let today = now.date_naive();

    let mut result: Vec<Task> = tasks
        .iter()
        .filter(|t| t.user_id == user_id)
        .cloned()
        .collect();

    match bucket {
        Bucket::All => {}
        Bucket::Today => {
            result.retain(|t| t.deadline.date_naive() == today);
        }
        Bucket::Upcoming => {
            let horizon = now + Duration::days(7);
            let overdue: Vec<Task> = result
                .iter()
                .filter(|t| !t.completed && t.deadline.date_naive() < today)
                .cloned()
                .collect();
            let ahead: Vec<Task> = result
                .iter()
                .filter(|t| {
                    !t.completed && t.deadline <= horizon && t.deadline.date_naive() >= today
                })
                .cloned()
                .collect();
            result = overdue.into_iter().chain(ahead).collect();
        }
        Bucket::Overdue => {
            result.retain(|t| !t.completed && t.deadline.date_naive() < today);
        }
        Bucket::Completed => {
            result.retain(|t| t.completed);
        }
    }

    if let PriorityFilter::Only(p) = priority {
        result.retain(|t| t.priority == p);
    }

    // Stable: equal deadlines keep their pre-sort relative order.
    result.sort_by_key(|t| t.deadline);

    let (completed, incomplete): (Vec<Task>, Vec<Task>) =
        result.into_iter().partition(|t| t.completed);
    TaskView { incomplete, completed }
}

/// Relative deadline label for a task card.
pub fn format_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (deadline.date_naive() - now.date_naive()).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        2..=6 => format!("In {days} days"),
        _ => deadline.format("%b %-d, %Y").to_string(),
    }
}

/// Overdue for display emphasis: incomplete and due before today started.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed && task.deadline.date_naive() < now.date_naive()
}

/// Aggregates for the profile page.
///
/// Overdue here compares against the instant, not the start of today: the
/// profile view counts a task due earlier today as overdue while the bucket
/// does not. Both match the app's observed behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    /// Rounded integer percent; 0 when there are no tasks.
    pub completion_rate: u32,
    pub overdue: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], user_id: &str, now: DateTime<Utc>) -> Self {
        let user_tasks: Vec<&Task> = tasks.iter().filter(|t| t.user_id == user_id).collect();

        let total = user_tasks.len();
        let completed = user_tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        let count_priority =
            |p: Priority| user_tasks.iter().filter(|t| t.priority == p).count();

        TaskStats {
            total,
            completed,
            completion_rate,
            overdue: user_tasks
                .iter()
                .filter(|t| !t.completed && t.deadline < now)
                .count(),
            high: count_priority(Priority::High),
            medium: count_priority(Priority::Medium),
            low: count_priority(Priority::Low),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
