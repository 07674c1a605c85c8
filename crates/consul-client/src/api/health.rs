//! Health API.

use crate::client::ConsulClient;
use crate::decode::Model;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::ElementPolicy;
use crate::types::{AgentCheck, HealthState, NodeEntry, ServiceHealthQuery};

/// Health API client.
pub struct HealthApi {
    client: ConsulClient,
}

impl HealthApi {
    pub(crate) fn new(client: ConsulClient) -> Self {
        Self { client }
    }

    /// List the checks of one node.
    pub async fn checks_for_node(
        &self,
        node: &str,
        datacenter: Option<&str>,
    ) -> Result<Vec<AgentCheck>> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::get(&["health", "node"])
            .segment(node)
            .query_opt("dc", datacenter);
        self.client
            .send_array(request, AgentCheck::from_json, ElementPolicy::Lenient)
            .await
    }

    /// List the instances of `service` with their node and checks.
    ///
    /// Elements without a decodable `Service` are dropped.
    pub async fn nodes_for_service(
        &self,
        service: &str,
        query: &ServiceHealthQuery,
    ) -> Result<Vec<NodeEntry>> {
        let mut request = ApiRequest::get(&["health", "service"])
            .segment(service)
            .query_params(query)?;
        if query.datacenter.is_none() {
            request = request.query_opt("dc", self.client.datacenter());
        }
        self.client
            .send_array(
                request,
                NodeEntry::from_health_service,
                ElementPolicy::Lenient,
            )
            .await
    }

    /// List every check currently in `state`; [`HealthState::Any`] lists all checks.
    ///
    /// `near` sorts the result by round trip time from the named node.
    pub async fn checks_in_state(
        &self,
        state: HealthState,
        datacenter: Option<&str>,
        near: Option<&str>,
    ) -> Result<Vec<AgentCheck>> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::get(&["health", "state", state.as_str()])
            .query_opt("dc", datacenter)
            .query_opt("near", near);
        self.client
            .send_array(request, AgentCheck::from_json, ElementPolicy::Lenient)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use crate::api::test_support::{mock_client, mock_client_in};
    use crate::transport::{HttpRequest, HttpResponse};
    use crate::types::{CheckStatus, HealthState, ServiceHealthQuery};

    fn query_map(request: &HttpRequest) -> HashMap<String, String> {
        request.url.query_pairs().into_owned().collect()
    }

    fn node_json(id: &str, name: &str) -> serde_json::Value {
        json!({
            "ID": id,
            "Node": name,
            "Address": "10.1.10.12",
            "Datacenter": "dc1"
        })
    }

    fn check_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "Node": "foobar",
            "CheckID": id,
            "Name": id,
            "Status": status,
            "Notes": "",
            "Output": "",
            "ServiceID": "",
            "ServiceName": ""
        })
    }

    #[tokio::test]
    async fn test_checks_for_node() {
        let (client, mock) = mock_client(vec![HttpResponse::json(&json!([
            check_json("serfHealth", "passing"),
            check_json("mystery", "degraded"),
            {"CheckID": "no-node"}
        ]))]);

        let checks = client
            .health()
            .checks_for_node("foobar", None)
            .await
            .unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].status, Some(CheckStatus::Passing));
        assert_eq!(checks[1].status, None);
        let request = mock.last_request().unwrap();
        assert_eq!(request.url.path(), "/v1/health/node/foobar");
    }

    #[tokio::test]
    async fn test_nodes_for_service_default_query() {
        let (client, mock) = mock_client(vec![HttpResponse::json(&json!([
            {
                "Node": node_json("n1", "foobar"),
                "Service": {
                    "ID": "redis",
                    "Service": "redis",
                    "Tags": null,
                    "Address": "",
                    "Port": 8000
                },
                "Checks": [
                    check_json("service:redis", "passing"),
                    check_json("serfHealth", "passing")
                ]
            },
            {
                "Node": node_json("n2", "no-service"),
                "Checks": []
            }
        ]))]);

        let entries = client
            .health()
            .nodes_for_service("redis", &ServiceHealthQuery::default())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node.node, "foobar");
        assert_eq!(entries[0].service.as_ref().unwrap().port, 8000);
        assert_eq!(entries[0].checks.len(), 2);

        let request = mock.last_request().unwrap();
        assert_eq!(request.url.path(), "/v1/health/service/redis");
        assert_eq!(request.url.query(), Some("passing=true"));
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_nodes_for_service_full_query() {
        let (client, mock) = mock_client(vec![HttpResponse::json(&json!([]))]);
        let query = ServiceHealthQuery {
            passing: None,
            tag: Some("primary".to_string()),
            datacenter: Some("dc2".to_string()),
            near: Some("_agent".to_string()),
        };
        client
            .health()
            .nodes_for_service("redis", &query)
            .await
            .unwrap();

        let params = query_map(&mock.last_request().unwrap());
        assert_eq!(params.len(), 3);
        assert_eq!(params["tag"], "primary");
        assert_eq!(params["dc"], "dc2");
        assert_eq!(params["near"], "_agent");
    }

    #[tokio::test]
    async fn test_default_datacenter_fills_query() {
        let responses = vec![
            HttpResponse::json(&json!([])),
            HttpResponse::json(&json!([])),
        ];
        let (client, mock) = mock_client_in("dc2", responses);
        let health = client.health();
        health
            .nodes_for_service("redis", &ServiceHealthQuery::default())
            .await
            .unwrap();
        let query = ServiceHealthQuery {
            datacenter: Some("dc3".to_string()),
            ..Default::default()
        };
        health.nodes_for_service("redis", &query).await.unwrap();

        let requests = mock.requests();
        assert_eq!(query_map(&requests[0])["dc"], "dc2");
        assert_eq!(query_map(&requests[1])["dc"], "dc3");
        assert_eq!(query_map(&requests[1]).len(), 2);
    }

    #[tokio::test]
    async fn test_checks_in_state() {
        let (client, mock) = mock_client(vec![
            HttpResponse::json(&json!([check_json("a", "critical")])),
            HttpResponse::json(&json!([])),
        ]);

        let critical = client
            .health()
            .checks_in_state(CheckStatus::Critical.into(), Some("dc1"), None)
            .await
            .unwrap();
        assert_eq!(critical[0].status, Some(CheckStatus::Critical));
        client
            .health()
            .checks_in_state(HealthState::Any, None, Some("_agent"))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(
            requests[0].url.as_str(),
            "http://localhost:8500/v1/health/state/critical?dc=dc1"
        );
        assert_eq!(
            requests[1].url.as_str(),
            "http://localhost:8500/v1/health/state/any?near=_agent"
        );
    }
}
