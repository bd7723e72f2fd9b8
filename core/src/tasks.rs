//! Task endpoints of the Lunatask API.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! async methods glue the two together through the configured transport, so
//! the request/response mapping stays deterministic and testable without a
//! network.

use std::{fmt, sync::Arc};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::LunataskError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::types::{
    CreateStatus, CreateTaskParams, Task, TaskEnvelope, TasksEnvelope, UpdateTaskParams,
};

/// Client for `/tasks`, reached through `LunataskApi::tasks`.
#[derive(Clone)]
pub struct TasksApi {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for TasksApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TasksApi")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TasksApi {
    pub fn new(config: Arc<ClientConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Retrieve tasks, optionally filtered by external source.
    ///
    /// Returns an empty list when nothing matches.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn retrieve_all(
        &self,
        source: Option<&str>,
        source_id: Option<&str>,
    ) -> Result<Vec<Task>, LunataskError> {
        let response = self.send(self.build_retrieve_all(source, source_id)).await?;
        self.parse_retrieve_all(response)
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn retrieve_single(&self, task_id: Uuid) -> Result<Task, LunataskError> {
        let response = self.send(self.build_retrieve_single(task_id)).await?;
        self.parse_retrieve_single(response)
    }

    /// Create a task.
    ///
    /// Returns `CreateStatus::Duplicate` when Lunatask already holds a task
    /// with the same `(source, source_id)` pair and skipped the creation.
    #[tracing::instrument(level = "debug", skip_all, fields(area_id = %params.area_id), err)]
    pub async fn create_task(
        &self,
        params: &CreateTaskParams,
    ) -> Result<CreateStatus, LunataskError> {
        let response = self.send(self.build_create_task(params)?).await?;
        self.parse_create_task(response)
    }

    #[tracing::instrument(level = "debug", skip(self, params), err)]
    pub async fn update_task(
        &self,
        task_id: Uuid,
        params: &UpdateTaskParams,
    ) -> Result<Task, LunataskError> {
        let response = self.send(self.build_update_task(task_id, params)?).await?;
        self.parse_update_task(response)
    }

    /// Delete a task, returning its final representation.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn delete_task(&self, task_id: Uuid) -> Result<Task, LunataskError> {
        let response = self.send(self.build_delete_task(task_id)).await?;
        self.parse_delete_task(response)
    }

    pub fn build_retrieve_all(&self, source: Option<&str>, source_id: Option<&str>) -> HttpRequest {
        let query = [("source", source), ("source_id", source_id)]
            .into_iter()
            .filter_map(|(key, value)| match value {
                Some(value) if !value.is_empty() => Some((key.to_string(), value.to_string())),
                _ => None,
            })
            .collect();
        HttpRequest {
            query,
            ..self.request(HttpMethod::Get, "/tasks".to_string())
        }
    }

    pub fn build_retrieve_single(&self, task_id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Get, format!("/tasks/{task_id}"))
    }

    pub fn build_create_task(&self, params: &CreateTaskParams) -> Result<HttpRequest, LunataskError> {
        self.json_request(HttpMethod::Post, "/tasks".to_string(), params)
    }

    pub fn build_update_task(
        &self,
        task_id: Uuid,
        params: &UpdateTaskParams,
    ) -> Result<HttpRequest, LunataskError> {
        self.json_request(HttpMethod::Put, format!("/tasks/{task_id}"), params)
    }

    pub fn build_delete_task(&self, task_id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("/tasks/{task_id}"))
    }

    pub fn parse_retrieve_all(&self, response: HttpResponse) -> Result<Vec<Task>, LunataskError> {
        check_status(&response)?;
        let envelope: TasksEnvelope = decode(&response.body)?;
        Ok(envelope.tasks)
    }

    pub fn parse_retrieve_single(&self, response: HttpResponse) -> Result<Task, LunataskError> {
        parse_task(response)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<CreateStatus, LunataskError> {
        check_status(&response)?;
        // A skipped duplicate comes back as 204 with no body.
        if response.body.trim().is_empty() {
            return Ok(CreateStatus::Duplicate);
        }
        let envelope: TaskEnvelope = decode(&response.body)?;
        Ok(match envelope.task {
            Some(task) => CreateStatus::Created(task),
            None => CreateStatus::Duplicate,
        })
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, LunataskError> {
        parse_task(response)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<Task, LunataskError> {
        parse_task(response)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        self.config.request(method, &path)
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        payload: &T,
    ) -> Result<HttpRequest, LunataskError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| LunataskError::Serialization(e.to_string()))?;
        let mut request = self.request(method, path);
        request
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LunataskError> {
        Ok(self.transport.execute(request).await?)
    }
}

/// Map a non-success status to the matching `LunataskError`.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), LunataskError> {
    if response.is_success() {
        return Ok(());
    }
    let error = LunataskError::from_status(response.status, &response.body);
    debug!(status = response.status, %error, "Lunatask request failed");
    Err(error)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, LunataskError> {
    serde_json::from_str(body).map_err(|e| LunataskError::Deserialization(e.to_string()))
}

fn parse_task(response: HttpResponse) -> Result<Task, LunataskError> {
    check_status(&response)?;
    let envelope: TaskEnvelope = decode(&response.body)?;
    envelope
        .task
        .ok_or_else(|| LunataskError::Deserialization("response has no `task` field".to_string()))
}
