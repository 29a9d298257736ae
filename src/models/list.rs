use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of change recorded in a task's activity log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
}

/// One append-only activity entry: what happened, a human-readable detail,
/// and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub action: ActivityAction,
    pub detail: String,
    pub date: DateTime<Utc>,
}

/// A single checklist step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub step: String,
    pub completed: bool,
}

/// A checklist embedded in a task: a titled group of steps with optional
/// due and reminder dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub title: String,
    pub due: Option<DateTime<Utc>>,
    pub reminder: Option<DateTime<Utc>>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Client payload for adding checklists to a task. Steps are always added
/// through the dedicated step operations, never inline.
#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistInput {
    #[serde(default)]
    pub title: String,
    pub due: Option<DateTime<Utc>>,
    pub reminder: Option<DateTime<Utc>>,
}

/// A task embedded in a list.
///
/// Tasks have no lifecycle outside their list: they are value objects of
/// the `List` aggregate, addressed by `id` but persisted only as part of
/// the whole list document. Attachments, checklists and steps are
/// index-addressed by the external API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<Checklist>,
    pub cover: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub activity: Vec<Activity>,
}

impl Task {
    /// Creates a task with a seeded CREATE activity entry.
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            attachments: Vec::new(),
            checklist: Vec::new(),
            cover: None,
            completed: false,
            activity: vec![Activity {
                action: ActivityAction::Create,
                detail: String::new(),
                date: Utc::now(),
            }],
        }
    }

    /// Appends an activity entry stamped with the current time. The log is
    /// append-only; nothing ever removes entries.
    pub fn log(&mut self, action: ActivityAction, detail: impl Into<String>) {
        self.activity.push(Activity {
            action,
            detail: detail.into(),
            date: Utc::now(),
        });
    }
}

/// A task list: the aggregate root of this domain.
///
/// Owned by exactly one user (`user`); tasks and everything inside them are
/// embedded and are read and written as one document, which makes the list
/// the unit of consistency. Concurrent writers to the same list are
/// last-writer-wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl List {
    pub fn new(name: &str, description: Option<&str>, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            icon: None,
            tasks: Vec::new(),
            user: owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn task_mut(&mut self, task_id: &Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == *task_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_task_seeds_activity() {
        let task = Task::new("Go to dentist");
        assert_eq!(task.title, "Go to dentist");
        assert!(!task.completed);
        assert_eq!(task.activity.len(), 1);
        assert_eq!(task.activity[0].action, ActivityAction::Create);
        assert_eq!(task.activity[0].detail, "");
    }

    #[test]
    fn test_activity_log_appends() {
        let mut task = Task::new("Task");
        task.log(ActivityAction::Update, "Task title from Task to Chore");
        task.log(ActivityAction::Delete, "Task attachment");
        assert_eq!(task.activity.len(), 3);
        assert_eq!(task.activity[2].action, ActivityAction::Delete);
    }

    #[test]
    fn test_activity_action_wire_format() {
        let json = serde_json::to_string(&ActivityAction::Create).unwrap();
        assert_eq!(json, "\"CREATE\"");
    }

    #[test]
    fn test_list_empty_description_is_none() {
        let list = List::new("My Day", Some(""), Uuid::new_v4());
        assert!(list.description.is_none());

        let list = List::new("My Day", Some("Things to do"), Uuid::new_v4());
        assert_eq!(list.description.as_deref(), Some("Things to do"));
    }

    #[test]
    fn test_task_lookup_by_id() {
        let mut list = List::new("My Day", None, Uuid::new_v4());
        list.tasks.push(Task::new("one"));
        list.tasks.push(Task::new("two"));
        let wanted = list.tasks[1].id;
        assert_eq!(list.task_mut(&wanted).unwrap().title, "two");
        assert!(list.task_mut(&Uuid::new_v4()).is_none());
    }
}
