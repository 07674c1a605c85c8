//! Agent checks API.

use crate::client::ConsulClient;
use crate::decode::Model;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::ElementPolicy;
use crate::types::{AgentCheck, CheckRegistration, CheckStatus, CheckUpdate};

/// Checks API client.
pub struct ChecksApi {
    client: ConsulClient,
}

impl ChecksApi {
    pub(crate) fn new(client: ConsulClient) -> Self {
        Self { client }
    }

    /// List the checks registered with the local agent.
    pub async fn list(&self) -> Result<Vec<AgentCheck>> {
        self.client
            .send_values(
                ApiRequest::get(&["agent", "checks"]),
                AgentCheck::from_json,
                ElementPolicy::Lenient,
            )
            .await
    }

    /// Register a check with the local agent.
    pub async fn register(&self, check: &CheckRegistration) -> Result<()> {
        let request = ApiRequest::put(&["agent", "check", "register"]).json(check)?;
        self.client.send_empty(request).await
    }

    /// Remove a check from the local agent. Unknown IDs are ignored by Consul.
    pub async fn deregister(&self, id: &str) -> Result<()> {
        let request = ApiRequest::put(&["agent", "check", "deregister"]).segment(id);
        self.client.send_empty(request).await
    }

    /// Mark a TTL check as passing and reset its TTL.
    pub async fn pass(&self, id: &str, note: Option<&str>) -> Result<()> {
        self.ttl_transition("pass", id, note).await
    }

    /// Mark a TTL check as warning and reset its TTL.
    pub async fn warn(&self, id: &str, note: Option<&str>) -> Result<()> {
        self.ttl_transition("warn", id, note).await
    }

    /// Mark a TTL check as critical and reset its TTL.
    pub async fn fail(&self, id: &str, note: Option<&str>) -> Result<()> {
        self.ttl_transition("fail", id, note).await
    }

    /// Set the status and output of a TTL check and reset its TTL.
    pub async fn update(&self, id: &str, status: CheckStatus, output: &str) -> Result<()> {
        let request = ApiRequest::put(&["agent", "check", "update"])
            .segment(id)
            .json(&CheckUpdate { status, output })?;
        self.client.send_empty(request).await
    }

    async fn ttl_transition(&self, action: &str, id: &str, note: Option<&str>) -> Result<()> {
        let request = ApiRequest::put(&["agent", "check", action])
            .segment(id)
            .query_opt("note", note);
        self.client.send_empty(request).await
    }
}
