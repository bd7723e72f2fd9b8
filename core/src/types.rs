//! Domain DTOs for the Lunatask task API.
//!
//! # Design
//! These types mirror the API's JSON shapes and are defined independently of
//! the mock-server crate; integration tests catch any drift between the two.
//! `Task` is only ever produced by decoding a response.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Later,
    Next,
    Started,
    Waiting,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum TaskPriority {
    Lowest = -2,
    Low = -1,
    #[default]
    Normal = 0,
    High = 1,
    Highest = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskMotivation {
    Must,
    Should,
    Want,
    #[default]
    Unknown,
}

/// Eisenhower matrix quadrant, encoded as an integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum TaskEisenhower {
    #[default]
    Uncategorized = 0,
    UrgentImportant = 1,
    UrgentNotImportant = 2,
    ImportantNotUrgent = 3,
    NotUrgentOrImportant = 4,
}

/// Link between a task and a record in another system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalSource {
    pub source: String,
    pub source_id: String,
}

impl ExternalSource {
    pub fn new(source: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_id: source_id.into(),
        }
    }
}

/// A task as returned by the API.
///
/// `name` and `note` are end-to-end encrypted by Lunatask and are usually
/// absent from responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub area_id: Uuid,
    #[serde(default)]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub previous_status: Option<TaskStatus>,
    /// Estimated duration in minutes.
    #[serde(default)]
    pub estimate: Option<u32>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub motivation: TaskMotivation,
    #[serde(default)]
    pub eisenhower: TaskEisenhower,
    #[serde(default)]
    pub sources: Vec<ExternalSource>,
    #[serde(default)]
    pub scheduled_on: Option<NaiveDate>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Whether this task carries the given `(source, source_id)` link.
    pub fn has_source(&self, source: &str, source_id: &str) -> bool {
        self.sources
            .iter()
            .any(|s| s.source == source && s.source_id == source_id)
    }
}

/// Request payload for creating a task. Only `area_id` is required; absent
/// fields are left out of the JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskParams {
    pub area_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<TaskMotivation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eisenhower: Option<TaskEisenhower>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl CreateTaskParams {
    pub fn new(area_id: Uuid) -> Self {
        Self {
            area_id,
            goal_id: None,
            name: None,
            note: None,
            status: None,
            motivation: None,
            eisenhower: None,
            estimate: None,
            priority: None,
            scheduled_on: None,
            completed_at: None,
            source: None,
            source_id: None,
        }
    }

    pub fn with_goal(mut self, goal_id: Uuid) -> Self {
        self.goal_id = Some(goal_id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_motivation(mut self, motivation: TaskMotivation) -> Self {
        self.motivation = Some(motivation);
        self
    }

    pub fn with_eisenhower(mut self, eisenhower: TaskEisenhower) -> Self {
        self.eisenhower = Some(eisenhower);
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimate = Some(minutes);
        self
    }

    pub fn with_scheduled_on(mut self, date: NaiveDate) -> Self {
        self.scheduled_on = Some(date);
        self
    }

    pub fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    /// Link the task to an external record. Lunatask skips the creation when a
    /// task with the same pair already exists.
    pub fn with_source(mut self, source: impl Into<String>, source_id: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self.source_id = Some(source_id.into());
        self
    }
}

/// Request payload for updating a task. Only the fields present in the JSON
/// are applied.
///
/// Nullable fields use `Option<Option<_>>`: `None` leaves the field out,
/// `Some(None)` sends an explicit `null` to clear it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTaskParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<Uuid>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub goal_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<TaskMotivation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eisenhower: Option<TaskEisenhower>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<ExternalSource>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub scheduled_on: Option<Option<NaiveDate>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

/// Envelope returned by `GET /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksEnvelope {
    pub tasks: Vec<Task>,
}

/// Envelope returned by the single-task endpoints. `task` is absent when a
/// creation was skipped as a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    #[serde(default)]
    pub task: Option<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    #[serde(default)]
    pub message: String,
}

/// Outcome of a successful create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateStatus {
    Created(Task),
    /// A task with the same `(source, source_id)` already existed; nothing
    /// was created.
    Duplicate,
}

impl CreateStatus {
    pub fn task(&self) -> Option<&Task> {
        match self {
            CreateStatus::Created(task) => Some(task),
            CreateStatus::Duplicate => None,
        }
    }

    pub fn into_task(self) -> Option<Task> {
        match self {
            CreateStatus::Created(task) => Some(task),
            CreateStatus::Duplicate => None,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, CreateStatus::Duplicate)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const TASK_JSON: &str = r#"{
        "id": "066b5835-184f-4fd9-be60-7d735aa94708",
        "area_id": "11b37775-5a34-41bb-b109-f0e5a6084799",
        "goal_id": null,
        "status": "next",
        "previous_status": "later",
        "estimate": 10,
        "priority": -2,
        "motivation": "want",
        "eisenhower": 3,
        "sources": [{"source": "github", "source_id": "123"}],
        "scheduled_on": "2021-01-10",
        "completed_at": "2021-01-10T10:39:25Z",
        "created_at": "2021-01-10T10:39:25Z",
        "updated_at": "2021-01-10T10:39:25Z",
        "deleted_at": null
    }"#;

    #[test]
    fn task_decodes_full_payload() {
        let task: Task = serde_json::from_str(TASK_JSON).unwrap();
        assert_eq!(task.status, TaskStatus::Next);
        assert_eq!(task.previous_status, Some(TaskStatus::Later));
        assert_eq!(task.priority, TaskPriority::Lowest);
        assert_eq!(task.motivation, TaskMotivation::Want);
        assert_eq!(task.eisenhower, TaskEisenhower::ImportantNotUrgent);
        assert_eq!(task.estimate, Some(10));
        assert_eq!(task.goal_id, None);
        assert_eq!(task.scheduled_on, NaiveDate::from_ymd_opt(2021, 1, 10));
        assert!(task.has_source("github", "123"));
        assert!(!task.has_source("github", "124"));
        assert_eq!(task.name, None);
    }

    #[test]
    fn task_defaults_missing_optional_fields() {
        let task: Task = serde_json::from_value(json!({
            "id": "066b5835-184f-4fd9-be60-7d735aa94708",
            "area_id": "11b37775-5a34-41bb-b109-f0e5a6084799",
            "status": "later",
            "created_at": "2021-01-10T10:39:25Z",
            "updated_at": "2021-01-10T10:39:25Z"
        }))
        .unwrap();
        assert_eq!(task.priority, TaskPriority::Normal);
        assert_eq!(task.motivation, TaskMotivation::Unknown);
        assert_eq!(task.eisenhower, TaskEisenhower::Uncategorized);
        assert!(task.sources.is_empty());
        assert_eq!(task.deleted_at, None);
    }

    #[test]
    fn task_rejects_unknown_status() {
        let mut value: serde_json::Value = serde_json::from_str(TASK_JSON).unwrap();
        value["status"] = json!("someday");
        assert!(serde_json::from_value::<Task>(value).is_err());
    }

    #[test]
    fn create_params_skip_absent_fields() {
        let area_id = Uuid::nil();
        let params = CreateTaskParams::new(area_id)
            .with_name("Test Task")
            .with_priority(TaskPriority::Highest)
            .with_eisenhower(TaskEisenhower::Uncategorized)
            .with_source("API_TEST", "1");
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "area_id": "00000000-0000-0000-0000-000000000000",
                "name": "Test Task",
                "priority": 2,
                "eisenhower": 0,
                "source": "API_TEST",
                "source_id": "1"
            })
        );
    }

    #[test]
    fn update_params_distinguish_absent_and_null() {
        let params = UpdateTaskParams {
            note: Some("note".to_string()),
            goal_id: Some(None),
            scheduled_on: Some(NaiveDate::from_ymd_opt(2024, 3, 1)),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "note": "note",
                "goal_id": null,
                "scheduled_on": "2024-03-01"
            })
        );
        assert_eq!(serde_json::to_value(UpdateTaskParams::default()).unwrap(), json!({}));
    }

    #[test]
    fn update_params_decode_explicit_null() {
        let params: UpdateTaskParams =
            serde_json::from_str(r#"{"deleted_at":null,"status":"completed"}"#).unwrap();
        assert_eq!(params.deleted_at, Some(None));
        assert_eq!(params.completed_at, None);
        assert_eq!(params.status, Some(TaskStatus::Completed));
    }

    #[test]
    fn task_envelope_without_task_is_empty() {
        let envelope: TaskEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.task.is_none());
    }

    #[test]
    fn create_status_accessors() {
        let task: Task = serde_json::from_str(TASK_JSON).unwrap();
        let created = CreateStatus::Created(task.clone());
        assert_eq!(created.task(), Some(&task));
        assert!(!created.is_duplicate());
        assert_eq!(created.into_task(), Some(task));
        assert!(CreateStatus::Duplicate.is_duplicate());
        assert_eq!(CreateStatus::Duplicate.into_task(), None);
    }
}
