use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::debug;
use uuid::Uuid;

const STATUSES: [&str; 5] = ["later", "next", "started", "waiting", "completed"];
const MOTIVATIONS: [&str; 4] = ["must", "should", "want", "unknown"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub source: String,
    pub source_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub area_id: Uuid,
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: String,
    pub previous_status: Option<String>,
    pub estimate: Option<u32>,
    pub priority: i8,
    pub motivation: String,
    pub eisenhower: u8,
    pub sources: Vec<Source>,
    pub scheduled_on: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub task: Task,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TasksEnvelope {
    pub tasks: Vec<Task>,
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub area_id: Uuid,
    pub goal_id: Option<Uuid>,
    pub name: Option<String>,
    pub note: Option<String>,
    pub status: Option<String>,
    pub motivation: Option<String>,
    pub eisenhower: Option<u8>,
    pub estimate: Option<u32>,
    pub priority: Option<i8>,
    pub scheduled_on: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub source_id: Option<String>,
}

/// Partial update. Nullable fields distinguish "absent" (`None`) from an
/// explicit `null` (`Some(None)`).
#[derive(Default, Deserialize)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub note: Option<String>,
    pub area_id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable")]
    pub goal_id: Option<Option<Uuid>>,
    pub status: Option<String>,
    pub previous_status: Option<String>,
    pub estimate: Option<u32>,
    pub priority: Option<i8>,
    pub motivation: Option<String>,
    pub eisenhower: Option<u8>,
    pub sources: Option<Vec<Source>>,
    #[serde(default, deserialize_with = "nullable")]
    pub scheduled_on: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub source: Option<String>,
    pub source_id: Option<String>,
}

/// Settings for the fake API.
#[derive(Clone, Debug)]
pub struct MockConfig {
    /// The only bearer token the server accepts.
    pub access_token: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            access_token: "mock-token".to_string(),
        }
    }
}

pub type Db = Arc<RwLock<HashMap<Uuid, Task>>>;

#[derive(Clone)]
struct AppState {
    access_token: Arc<str>,
    db: Db,
}

pub fn app(config: MockConfig) -> Router {
    let state = AppState {
        access_token: Arc::from(config.access_token),
        db: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/ping", get(ping))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Body extraction failures (bad syntax, wrong content type) are answered
/// like any other invalid entity.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| message(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text()))
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_once(' '))
        .is_some_and(|(scheme, token)| {
            scheme.eq_ignore_ascii_case("bearer") && token == &*state.access_token
        });
    if !authorized {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    next.run(request).await
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "message": "pong" }))
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> Json<TasksEnvelope> {
    let db = state.db.read().await;
    let mut tasks: Vec<Task> = db
        .values()
        .filter(|task| {
            task.sources.iter().any(|s| {
                filter.source.as_ref().map_or(true, |source| &s.source == source)
                    && filter.source_id.as_ref().map_or(true, |id| &s.source_id == id)
            }) || (filter.source.is_none() && filter.source_id.is_none())
        })
        .cloned()
        .collect();
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    Json(TasksEnvelope { tasks })
}

async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> Response {
    let input = match json_body(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };
    if let Err(reason) = validate(
        input.status.as_deref(),
        input.motivation.as_deref(),
        input.priority,
        input.eisenhower,
    ) {
        return message(StatusCode::UNPROCESSABLE_ENTITY, &reason);
    }

    let mut db = state.db.write().await;
    let source = input.source.map(|source| Source {
        source,
        source_id: input.source_id.unwrap_or_default(),
    });
    if let Some(source) = &source {
        if db.values().any(|task| task.sources.contains(source)) {
            debug!(source = %source.source, source_id = %source.source_id, "skipping duplicate task");
            return StatusCode::NO_CONTENT.into_response();
        }
    }

    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4(),
        area_id: input.area_id,
        goal_id: input.goal_id,
        name: input.name,
        note: input.note,
        status: input.status.unwrap_or_else(|| "later".to_string()),
        previous_status: None,
        estimate: input.estimate,
        priority: input.priority.unwrap_or(0),
        motivation: input.motivation.unwrap_or_else(|| "unknown".to_string()),
        eisenhower: input.eisenhower.unwrap_or(0),
        sources: source.into_iter().collect(),
        scheduled_on: input.scheduled_on,
        completed_at: input.completed_at,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };
    debug!(id = %task.id, "created task");
    db.insert(task.id, task.clone());
    (StatusCode::CREATED, Json(TaskEnvelope { task })).into_response()
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskEnvelope>, Response> {
    let db = state.db.read().await;
    db.get(&id)
        .cloned()
        .map(|task| Json(TaskEnvelope { task }))
        .ok_or_else(not_found)
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> Result<Json<TaskEnvelope>, Response> {
    let input = json_body(payload)?;
    validate(
        input.status.as_deref(),
        input.motivation.as_deref(),
        input.priority,
        input.eisenhower,
    )
    .map_err(|reason| message(StatusCode::UNPROCESSABLE_ENTITY, &reason))?;
    if let Some(previous) = input.previous_status.as_deref() {
        validate(Some(previous), None, None, None)
            .map_err(|reason| message(StatusCode::UNPROCESSABLE_ENTITY, &reason))?;
    }

    let mut db = state.db.write().await;
    let task = db.get_mut(&id).ok_or_else(not_found)?;
    apply_update(task, input);
    Ok(Json(TaskEnvelope { task: task.clone() }))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskEnvelope>, Response> {
    let mut task = state.db.write().await.remove(&id).ok_or_else(not_found)?;
    let now = Utc::now();
    task.deleted_at = Some(now);
    task.updated_at = now;
    debug!(%id, "deleted task");
    Ok(Json(TaskEnvelope { task }))
}

fn not_found() -> Response {
    message(StatusCode::NOT_FOUND, "Not Found")
}

fn validate(
    status: Option<&str>,
    motivation: Option<&str>,
    priority: Option<i8>,
    eisenhower: Option<u8>,
) -> Result<(), String> {
    if let Some(status) = status.filter(|s| !STATUSES.contains(s)) {
        return Err(format!("invalid status: {status}"));
    }
    if let Some(motivation) = motivation.filter(|m| !MOTIVATIONS.contains(m)) {
        return Err(format!("invalid motivation: {motivation}"));
    }
    if let Some(priority) = priority.filter(|p| !(-2..=2).contains(p)) {
        return Err(format!("invalid priority: {priority}"));
    }
    if let Some(eisenhower) = eisenhower.filter(|e| *e > 4) {
        return Err(format!("invalid eisenhower: {eisenhower}"));
    }
    Ok(())
}

fn apply_update(task: &mut Task, input: UpdateTask) {
    if let Some(name) = input.name {
        task.name = Some(name);
    }
    if let Some(note) = input.note {
        task.note = Some(note);
    }
    if let Some(area_id) = input.area_id {
        task.area_id = area_id;
    }
    if let Some(goal_id) = input.goal_id {
        task.goal_id = goal_id;
    }
    if let Some(status) = input.status {
        if status != task.status {
            let previous = std::mem::replace(&mut task.status, status);
            task.previous_status = Some(previous);
        }
    }
    if let Some(previous_status) = input.previous_status {
        task.previous_status = Some(previous_status);
    }
    if let Some(estimate) = input.estimate {
        task.estimate = Some(estimate);
    }
    if let Some(priority) = input.priority {
        task.priority = priority;
    }
    if let Some(motivation) = input.motivation {
        task.motivation = motivation;
    }
    if let Some(eisenhower) = input.eisenhower {
        task.eisenhower = eisenhower;
    }
    if let Some(sources) = input.sources {
        task.sources = sources;
    }
    if let Some(scheduled_on) = input.scheduled_on {
        task.scheduled_on = scheduled_on;
    }
    if let Some(completed_at) = input.completed_at {
        task.completed_at = completed_at;
    }
    if let Some(deleted_at) = input.deleted_at {
        task.deleted_at = deleted_at;
    }
    task.updated_at = Utc::now();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::nil(),
            area_id: Uuid::nil(),
            goal_id: Some(Uuid::nil()),
            name: None,
            note: None,
            status: "later".to_string(),
            previous_status: None,
            estimate: None,
            priority: 0,
            motivation: "unknown".to_string(),
            eisenhower: 0,
            sources: Vec::new(),
            scheduled_on: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn task_serializes_nullable_fields_as_null() {
        let json = serde_json::to_value(task()).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert!(json["deleted_at"].is_null());
        assert!(json.get("name").is_none());
        assert_eq!(json["status"], "later");
    }

    #[test]
    fn create_task_requires_area_id() {
        let result: Result<CreateTask, _> = serde_json::from_str(r#"{"name":"No area"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_task_distinguishes_null_from_absent() {
        let input: UpdateTask = serde_json::from_str(r#"{"goal_id":null}"#).unwrap();
        assert_eq!(input.goal_id, Some(None));
        assert!(input.scheduled_on.is_none());
    }

    #[test]
    fn apply_update_clears_goal_and_tracks_previous_status() {
        let mut task = task();
        let input: UpdateTask =
            serde_json::from_str(r#"{"goal_id":null,"status":"started","note":"n"}"#).unwrap();
        apply_update(&mut task, input);
        assert_eq!(task.goal_id, None);
        assert_eq!(task.status, "started");
        assert_eq!(task.previous_status.as_deref(), Some("later"));
        assert_eq!(task.note.as_deref(), Some("n"));
    }

    #[test]
    fn apply_update_empty_keeps_fields() {
        let mut task = task();
        apply_update(&mut task, UpdateTask::default());
        assert_eq!(task.goal_id, Some(Uuid::nil()));
        assert_eq!(task.status, "later");
        assert!(task.previous_status.is_none());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(validate(Some("someday"), None, None, None).is_err());
        assert!(validate(None, Some("maybe"), None, None).is_err());
        assert!(validate(None, None, Some(3), None).is_err());
        assert!(validate(None, None, None, Some(5)).is_err());
        assert!(validate(Some("next"), Some("must"), Some(-2), Some(4)).is_ok());
    }
}
