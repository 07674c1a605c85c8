//! Agent API.
//!
//! Operations on the local agent: gossip membership, configuration,
//! maintenance mode and cluster join/leave.

use crate::client::ConsulClient;
use crate::decode::Model;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::ElementPolicy;
use crate::types::{AgentConfiguration, AgentMember};

/// Agent API client.
pub struct AgentApi {
    client: ConsulClient,
}

impl AgentApi {
    pub(crate) fn new(client: ConsulClient) -> Self {
        Self { client }
    }

    /// List the members the agent sees in the gossip pool.
    ///
    /// The view is eventually consistent and may differ between agents; the
    /// catalog holds the strongly consistent node list.
    pub async fn members(&self) -> Result<Vec<AgentMember>> {
        self.client
            .send_array(
                ApiRequest::get(&["agent", "members"]),
                AgentMember::from_json,
                ElementPolicy::Lenient,
            )
            .await
    }

    /// Read the configuration of the local agent.
    pub async fn configuration(&self) -> Result<AgentConfiguration> {
        self.client
            .send_single(
                ApiRequest::get(&["agent", "self"]),
                AgentConfiguration::from_agent_self,
            )
            .await
    }

    /// Ask the agent to reload its configuration files.
    pub async fn reload(&self) -> Result<()> {
        self.client
            .send_empty(ApiRequest::put(&["agent", "reload"]))
            .await
    }

    /// Enable or disable node maintenance mode. Idempotent.
    pub async fn maintenance(&self, enable: bool, reason: &str) -> Result<()> {
        let request = ApiRequest::put(&["agent", "maintenance"])
            .query_flag("enable", enable)
            .query("reason", reason);
        self.client.send_empty(request).await
    }

    /// Ask the agent to join the cluster member at `address`.
    ///
    /// Set `wan` to join over the WAN pool (server agents only).
    pub async fn join(&self, address: &str, wan: bool) -> Result<()> {
        let request = ApiRequest::put(&["agent", "join"])
            .segment(address)
            .query_flag("wan", wan);
        self.client.send_empty(request).await
    }

    /// Leave the cluster and shut the agent down.
    ///
    /// With `force` the agent is put straight into the left state instead of
    /// leaving gracefully.
    pub async fn leave(&self, force: bool) -> Result<()> {
        let path = if force {
            ["agent", "force-leave"]
        } else {
            ["agent", "leave"]
        };
        self.client.send_empty(ApiRequest::put(&path)).await
    }

    /// Force a failed node into the left state so its entries can be reaped.
    pub async fn force_leave_node(&self, node: &str) -> Result<()> {
        let request = ApiRequest::put(&["agent", "force-leave"]).segment(node);
        self.client.send_empty(request).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use crate::api::test_support::mock_client;
    use crate::error::Error;
    use crate::transport::HttpResponse;

    #[tokio::test]
    async fn test_members() {
        let (client, mock) = mock_client(vec![HttpResponse::json(&json!([
            {
                "Name": "node1",
                "Addr": "10.0.0.1",
                "Port": 8301,
                "Tags": {"id": "abc"},
                "Status": 1
            },
            {"Name": "node2", "Addr": "10.0.0.2"}
        ]))]);

        let members = client.agent().members().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id(), Some("abc"));
        assert_eq!(members[0].status, Some(1));

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.path(), "/v1/agent/members");
    }

    #[tokio::test]
    async fn test_configuration_requires_config_section() {
        let (client, _mock) = mock_client(vec![HttpResponse::json(&json!({"Member": {}}))]);
        let err = client.agent().configuration().await.unwrap_err();
        assert!(matches!(err, Error::Decode { model } if model == "AgentConfiguration"));
    }

    #[tokio::test]
    async fn test_maintenance_query() {
        let (client, mock) = mock_client(vec![HttpResponse::new(200, "")]);
        client
            .agent()
            .maintenance(true, "kernel upgrade")
            .await
            .unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(
            request.url.as_str(),
            "http://localhost:8500/v1/agent/maintenance?enable=true&reason=kernel+upgrade"
        );
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_join_escapes_address() {
        let (client, mock) = mock_client(vec![HttpResponse::new(200, "")]);
        client.agent().join("10.1.2.3:8301", true).await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.url.path(), "/v1/agent/join/10.1.2.3:8301");
        assert_eq!(request.url.query(), Some("wan=true"));
    }

    #[tokio::test]
    async fn test_leave_path_depends_on_force() {
        let (client, mock) = mock_client(vec![
            HttpResponse::new(200, ""),
            HttpResponse::new(200, ""),
            HttpResponse::new(200, ""),
        ]);
        client.agent().leave(false).await.unwrap();
        client.agent().leave(true).await.unwrap();
        client.agent().force_leave_node("dead-node").await.unwrap();

        let paths: Vec<String> = mock
            .requests()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/v1/agent/leave",
                "/v1/agent/force-leave",
                "/v1/agent/force-leave/dead-node",
            ]
        );
    }

    #[tokio::test]
    async fn test_reload_error_is_surfaced() {
        let (client, _mock) = mock_client(vec![HttpResponse::new(
            500,
            "Failed to parse /etc/consul.d/bad.json",
        )]);
        let err = client.agent().reload().await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));
    }
}
