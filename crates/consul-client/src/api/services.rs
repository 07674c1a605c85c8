//! Agent services API.

use crate::client::ConsulClient;
use crate::decode::Model;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::ElementPolicy;
use crate::types::{AgentService, ServiceRegistration};

/// Services API client.
pub struct ServicesApi {
    client: ConsulClient,
}

impl ServicesApi {
    pub(crate) fn new(client: ConsulClient) -> Self {
        Self { client }
    }

    /// List the services registered with the local agent.
    pub async fn list(&self) -> Result<Vec<AgentService>> {
        self.client
            .send_values(
                ApiRequest::get(&["agent", "services"]),
                AgentService::from_json,
                ElementPolicy::Lenient,
            )
            .await
    }

    /// Register a service, and optionally its check, with the local agent.
    pub async fn register(&self, service: &ServiceRegistration) -> Result<()> {
        let request = ApiRequest::put(&["agent", "service", "register"]).json(service)?;
        self.client.send_empty(request).await
    }

    /// Remove a service and its checks from the local agent.
    pub async fn deregister(&self, id: &str) -> Result<()> {
        let request = ApiRequest::put(&["agent", "service", "deregister"]).segment(id);
        self.client.send_empty(request).await
    }

    /// Enable or disable maintenance mode for one service. Idempotent.
    pub async fn maintenance(&self, id: &str, enable: bool, reason: &str) -> Result<()> {
        let request = ApiRequest::put(&["agent", "service", "maintenance"])
            .segment(id)
            .query_flag("enable", enable)
            .query("reason", reason);
        self.client.send_empty(request).await
    }
}
