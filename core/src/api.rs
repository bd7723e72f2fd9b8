//! Entry point of the Lunatask API client.

use std::{fmt, sync::Arc};

use crate::config::ClientConfig;
use crate::error::LunataskError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::tasks::{check_status, TasksApi};
use crate::types::PingResponse;

/// Holds the access token and exposes every endpoint group.
///
/// Cloning is cheap; clones share the configuration and transport.
#[derive(Clone)]
pub struct LunataskApi {
    pub tasks: TasksApi,
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for LunataskApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LunataskApi")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LunataskApi {
    /// Client for the production API.
    pub fn new(access_token: impl Into<String>) -> Result<Self, LunataskError> {
        Self::with_config(ClientConfig::new(access_token))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, LunataskError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let config = Arc::new(config);
        Self {
            tasks: TasksApi::new(config.clone(), transport.clone()),
            config,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check whether the access token is accepted.
    ///
    /// A rejected token yields `Ok(false)`; every other failure is an error.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn ping(&self) -> Result<bool, LunataskError> {
        let response = self.transport.execute(self.build_ping()).await?;
        self.parse_ping(response)
    }

    pub fn build_ping(&self) -> HttpRequest {
        self.config.request(HttpMethod::Get, "/ping")
    }

    /// Any successful response other than `{"message": "pong"}` is `false`.
    pub fn parse_ping(&self, response: HttpResponse) -> Result<bool, LunataskError> {
        match check_status(&response) {
            Ok(()) => {}
            Err(LunataskError::Unauthorized) => return Ok(false),
            Err(err) => return Err(err),
        }
        Ok(serde_json::from_str::<PingResponse>(&response.body)
            .is_ok_and(|body| body.message == "pong"))
    }
}
