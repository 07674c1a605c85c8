//! Catalog API.
//!
//! The catalog is the cluster-wide, strongly consistent register of nodes
//! and services kept by the servers.

use serde_json::Value;

use crate::client::ConsulClient;
use crate::decode::Model;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::ElementPolicy;
use crate::types::{CatalogNode, CatalogService, NodeEntry};

/// Catalog API client.
pub struct CatalogApi {
    client: ConsulClient,
}

impl CatalogApi {
    pub(crate) fn new(client: ConsulClient) -> Self {
        Self { client }
    }

    /// List the datacenters known to the cluster.
    pub async fn datacenters(&self) -> Result<Vec<String>> {
        self.client
            .send_array(
                ApiRequest::get(&["catalog", "datacenters"]),
                |value: &Value| value.as_str().map(str::to_string),
                ElementPolicy::Lenient,
            )
            .await
    }

    /// List the nodes registered in a datacenter.
    ///
    /// `None` falls back to the client's default datacenter, then to the
    /// agent's own.
    pub async fn nodes(&self, datacenter: Option<&str>) -> Result<Vec<CatalogNode>> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::get(&["catalog", "nodes"]).query_opt("dc", datacenter);
        self.client
            .send_array(request, CatalogNode::from_json, ElementPolicy::Lenient)
            .await
    }

    /// List service names with the tags their instances carry.
    pub async fn services(&self, datacenter: Option<&str>) -> Result<Vec<CatalogService>> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::get(&["catalog", "services"]).query_opt("dc", datacenter);
        self.client
            .send_keyed(request, ElementPolicy::Lenient)
            .await
    }

    /// List the nodes providing `service`, each with the matching instance.
    pub async fn nodes_for_service(
        &self,
        service: &str,
        datacenter: Option<&str>,
    ) -> Result<Vec<NodeEntry>> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::get(&["catalog", "service"])
            .segment(service)
            .query_opt("dc", datacenter);
        self.client
            .send_array(
                request,
                NodeEntry::from_catalog_service,
                ElementPolicy::Lenient,
            )
            .await
    }

    /// Fetch a node together with every service registered on it.
    ///
    /// Consul answers `null` for an unknown node, which surfaces as a decode error.
    pub async fn services_for_node(
        &self,
        node: &str,
        datacenter: Option<&str>,
    ) -> Result<NodeEntry> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::get(&["catalog", "node"])
            .segment(node)
            .query_opt("dc", datacenter);
        self.client
            .send_single(request, NodeEntry::from_node_services)
            .await
    }
}
