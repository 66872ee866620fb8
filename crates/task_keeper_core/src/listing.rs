//! crates/task_keeper_core/src/listing.rs
//!
//! Display order of a task list. Storage order never matters; every listing is
//! computed here.

use std::cmp::Ordering;

use crate::domain::{Task, TaskStatus};

/// Which tasks a listing shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Status(TaskStatus),
}

/// Pending first, then opened, then completed. Unrecognized statuses go last.
pub fn status_priority(status: &TaskStatus) -> u8 {
    match status {
        TaskStatus::Pendente => 1,
        TaskStatus::Aberta => 2,
        TaskStatus::Concluida => 3,
        TaskStatus::Other(_) => 4,
    }
}

fn newest_first(a: &Task, b: &Task) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

/// Sorts newest first, in place.
pub fn sort_by_newest(tasks: &mut [Task]) {
    tasks.sort_by(newest_first);
}

/// Applies `filter` and orders the result for display.
///
/// The unfiltered listing groups by status priority and puts the newest first
/// within each group. A status filter orders by creation time only.
pub fn order_for_listing(tasks: Vec<Task>, filter: &TaskFilter) -> Vec<Task> {
    match filter {
        TaskFilter::All => {
            let mut tasks = tasks;
            tasks.sort_by(|a, b| {
                status_priority(&a.status)
                    .cmp(&status_priority(&b.status))
                    .then_with(|| newest_first(a, b))
            });
            tasks
        }
        TaskFilter::Status(wanted) => {
            let mut tasks: Vec<Task> = tasks.into_iter().filter(|t| &t.status == wanted).collect();
            sort_by_newest(&mut tasks);
            tasks
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn task(title: &str, status: TaskStatus, age_minutes: i64) -> Task {
        let mut task = Task::new(title, "d");
        task.status = status;
        task.created_at = Utc::now() - Duration::minutes(age_minutes);
        task
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn unfiltered_listing_groups_by_status_before_time() {
        let tasks = vec![
            task("done", TaskStatus::Concluida, 1),
            task("pending", TaskStatus::Pendente, 30),
            task("open", TaskStatus::Aberta, 10),
        ];
        let ordered = order_for_listing(tasks, &TaskFilter::All);
        assert_eq!(titles(&ordered), ["pending", "open", "done"]);
    }

    #[test]
    fn equal_status_is_newest_first_and_unknown_is_last() {
        let tasks = vec![
            task("weird", TaskStatus::Other("Arquivada".into()), 0),
            task("old", TaskStatus::Pendente, 60),
            task("new", TaskStatus::Pendente, 5),
        ];
        let ordered = order_for_listing(tasks, &TaskFilter::All);
        assert_eq!(titles(&ordered), ["new", "old", "weird"]);
    }

    #[test]
    fn status_filter_orders_by_time_only() {
        let tasks = vec![
            task("a", TaskStatus::Concluida, 20),
            task("b", TaskStatus::Pendente, 1),
            task("c", TaskStatus::Concluida, 2),
        ];
        let ordered = order_for_listing(tasks, &TaskFilter::Status(TaskStatus::Concluida));
        assert_eq!(titles(&ordered), ["c", "a"]);
    }
}
