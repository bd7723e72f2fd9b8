//! Async client for the Lunatask task API.
//!
//! # Overview
//! [`LunataskApi`] holds the access token, answers `ping`, and exposes the
//! task endpoints through its `tasks` field. Every method issues exactly one
//! HTTP request and maps failures to a [`LunataskError`].
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`).
//!   Each operation has a `build_*` and `parse_*` half, and an
//!   [`HttpTransport`] executes the round-trip in between.
//! - Documented status codes map to dedicated error variants; anything else
//!   becomes `LunataskError::Http`.
//! - Clients carry no mutable state. No caching, retries or rate limiting.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod tasks;
pub mod types;

pub use api::LunataskApi;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiErrorCode, LunataskError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use tasks::TasksApi;
pub use types::{
    CreateStatus, CreateTaskParams, ExternalSource, Task, TaskEisenhower, TaskMotivation,
    TaskPriority, TaskStatus, UpdateTaskParams,
};
