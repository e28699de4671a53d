//! Task data structure.
//!
//! This module defines the `Task` record held by the store and the
//! `TaskDraft` the form hands over before an id has been assigned.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// `None` only for seed entries whose deadline was missing or unparsable.
    #[serde(default, with = "crate::dates::lenient_date")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub state: State,
}

/// Every task field except the id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub category: Vec<String>,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub priority: Priority,
    pub state: State,
}

impl Task {
    pub fn from_draft(id: u64, draft: TaskDraft) -> Self {
        Task {
            id,
            title: draft.title,
            category: draft.category,
            description: draft.description,
            deadline: draft.deadline,
            priority: draft.priority,
            state: draft.state,
        }
    }

    pub fn has_category(&self, label: &str) -> bool {
        self.category.iter().any(|c| c == label)
    }

    pub fn is_completed(&self) -> bool {
        self.state == State::Completed
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        TaskDraft {
            title: task.title.clone(),
            category: task.category.clone(),
            description: task.description.clone(),
            deadline: task.deadline,
            priority: task.priority,
            state: task.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_entry_defaults() {
        let task: Task = serde_json::from_str(
            r#"{"id": 7, "title": "Buy milk", "deadline": "2024-11-22", "priority": "high"}"#,
        )
        .unwrap();
        assert_eq!(task.category, Vec::<String>::new());
        assert_eq!(task.description, "");
        assert_eq!(task.state, State::Active);
        assert!(!task.is_completed());
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.deadline, NaiveDate::from_ymd_opt(2024, 11, 22));
    }

    #[test]
    fn test_bad_deadline_loads_as_none() {
        let task: Task = serde_json::from_str(
            r#"{"id": 1, "title": "x", "deadline": "whenever", "priority": 2}"#,
        )
        .unwrap();
        assert_eq!(task.deadline, None);
        assert_eq!(task.priority, Priority::Medium);

        let task: Task =
            serde_json::from_str(r#"{"id": 2, "title": "y", "deadline": ""}"#).unwrap();
        assert_eq!(task.deadline, None);
    }

    #[test]
    fn test_draft_roundtrip_keeps_id() {
        let task = Task {
            id: 42,
            title: "Write report".into(),
            category: vec!["work".into()],
            description: "quarterly".into(),
            deadline: NaiveDate::from_ymd_opt(2024, 12, 1),
            priority: Priority::Medium,
            state: State::Completed,
        };
        let rebuilt = Task::from_draft(task.id, TaskDraft::from(&task));
        assert_eq!(rebuilt, task);
        assert!(rebuilt.has_category("work"));
        assert!(!rebuilt.has_category("Work"));
        assert!(rebuilt.is_completed());
    }
}
