//! Request and response types for the Consul API.
//!
//! Response models decode from the PascalCase JSON Consul emits. Required
//! fields are plain fields; anything Consul may omit is an `Option` or a
//! defaulted collection decoded leniently. Registration types serialize only
//! the fields that were set.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::decode::{
    KeyedModel, Model, lenient_option, lenient_string, lenient_string_map, lenient_string_vec,
    string_array,
};

// ─────────────────────────────────────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────────────────────────────────────

/// A member of the agent's gossip pool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentMember {
    /// Node name.
    pub name: String,
    /// Gossip address.
    #[serde(rename = "Addr")]
    pub address: String,
    /// Gossip port.
    pub port: u16,
    /// Member tags (role, datacenter, id, ...).
    #[serde(default, deserialize_with = "lenient_string_map")]
    pub tags: HashMap<String, String>,
    /// Serf member status code.
    #[serde(default, deserialize_with = "lenient_option")]
    pub status: Option<i64>,
}

impl AgentMember {
    /// The node ID advertised in the member's `id` tag.
    pub fn id(&self) -> Option<&str> {
        self.tags.get("id").map(String::as_str)
    }
}

/// Configuration of the local agent, read from the `Config` section of `/agent/self`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentConfiguration {
    /// Whether the agent runs in server mode.
    pub server: bool,
    pub datacenter: String,
    #[serde(rename = "NodeID")]
    pub node_id: String,
    pub node_name: String,
    #[serde(default, deserialize_with = "lenient_option")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub revision: Option<String>,
}

impl AgentConfiguration {
    /// Decode from the full `/agent/self` document.
    pub fn from_agent_self(value: &Value) -> Option<Self> {
        Self::from_json(value.get("Config")?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Checks
// ─────────────────────────────────────────────────────────────────────────────

/// Status of a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passing,
    Warning,
    Critical,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passing => "passing",
            CheckStatus::Warning => "warning",
            CheckStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passing" => Ok(CheckStatus::Passing),
            "warning" => Ok(CheckStatus::Warning),
            "critical" => Ok(CheckStatus::Critical),
            other => Err(format!("unknown check status '{}'", other)),
        }
    }
}

/// Check state filter for `/health/state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthState {
    /// Every check regardless of status.
    #[default]
    Any,
    Passing,
    Warning,
    Critical,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Any => "any",
            HealthState::Passing => "passing",
            HealthState::Warning => "warning",
            HealthState::Critical => "critical",
        }
    }
}

impl From<CheckStatus> for HealthState {
    fn from(status: CheckStatus) -> Self {
        match status {
            CheckStatus::Passing => HealthState::Passing,
            CheckStatus::Warning => HealthState::Warning,
            CheckStatus::Critical => HealthState::Critical,
        }
    }
}

/// A health check as reported by the agent or the health endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentCheck {
    /// Node the check runs on.
    pub node: String,
    #[serde(rename = "CheckID")]
    pub check_id: String,
    pub name: String,
    /// Parsed status; `None` if Consul reported a status this client doesn't know.
    #[serde(deserialize_with = "required_status")]
    pub status: Option<CheckStatus>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub output: Option<String>,
    #[serde(rename = "ServiceID", default, deserialize_with = "lenient_option")]
    pub service_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub service_name: Option<String>,
}

/// The `Status` field must be a string, but an unknown value is kept as `None`.
fn required_status<'de, D>(deserializer: D) -> Result<Option<CheckStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().ok())
}

/// Definition of a check to register with the local agent.
///
/// Use one of the constructors for the check kind, then set optional fields.
/// Fields left as `None` are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckRegistration {
    pub name: String,
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Duration such as `"90m"` after which a critical service is deregistered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deregister_critical_service_after: Option<String>,
    /// Command and arguments for script and docker checks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(rename = "DockerContainerID", skip_serializing_if = "Option::is_none")]
    pub docker_container_id: Option<String>,
    #[serde(rename = "ServiceID", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(rename = "HTTP", skip_serializing_if = "Option::is_none")]
    pub http: Option<String>,
    #[serde(rename = "TCP", skip_serializing_if = "Option::is_none")]
    pub tcp: Option<String>,
    /// Run interval such as `"10s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    /// TTL window such as `"15s"`.
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(rename = "TLSSkipVerify", skip_serializing_if = "Option::is_none")]
    pub tls_skip_verify: Option<bool>,
    /// Initial status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckStatus>,
}

impl CheckRegistration {
    /// A TTL check whose status is pushed by the application.
    pub fn ttl(name: impl Into<String>, ttl: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl: Some(ttl.into()),
            ..Default::default()
        }
    }

    /// A check that runs a command on the agent host.
    pub fn script(
        name: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
            interval: Some(interval.into()),
            ..Default::default()
        }
    }

    /// A check that runs a command inside a docker container.
    pub fn docker(
        name: impl Into<String>,
        container_id: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            docker_container_id: Some(container_id.into()),
            ..Self::script(name, args, interval)
        }
    }

    /// A check that issues an HTTP GET against `url`.
    pub fn http(
        name: impl Into<String>,
        url: impl Into<String>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            http: Some(url.into()),
            interval: Some(interval.into()),
            ..Default::default()
        }
    }

    /// A check that opens a TCP connection to `address` (`host:port`).
    pub fn tcp(
        name: impl Into<String>,
        address: impl Into<String>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tcp: Some(address.into()),
            interval: Some(interval.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_status(mut self, status: CheckStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Body of a TTL check update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CheckUpdate<'a> {
    pub status: CheckStatus,
    pub output: &'a str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Services
// ─────────────────────────────────────────────────────────────────────────────

/// A service instance registered with an agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentService {
    #[serde(rename = "ID")]
    pub id: String,
    /// Service name.
    pub service: String,
    #[serde(default, deserialize_with = "lenient_string_vec")]
    pub tags: Vec<String>,
    pub address: String,
    pub port: u16,
}

/// Service fields as flattened into catalog entries (`ServiceID`, `ServiceName`, ...).
#[derive(Deserialize)]
struct FlatService {
    #[serde(rename = "ServiceID")]
    id: String,
    #[serde(rename = "ServiceName")]
    name: String,
    #[serde(
        rename = "ServiceTags",
        default,
        deserialize_with = "lenient_string_vec"
    )]
    tags: Vec<String>,
    #[serde(rename = "ServiceAddress")]
    address: String,
    #[serde(rename = "ServicePort")]
    port: u16,
}

impl From<FlatService> for AgentService {
    fn from(flat: FlatService) -> Self {
        Self {
            id: flat.id,
            service: flat.name,
            tags: flat.tags,
            address: flat.address,
            port: flat.port,
        }
    }
}

/// Definition of a service to register with the local agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRegistration {
    pub name: String,
    /// Instance ID; Consul uses the name when omitted.
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Check registered together with the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<CheckRegistration>,
}

impl ServiceRegistration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_check(mut self, check: CheckRegistration) -> Self {
        self.check = Some(check);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// A node in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogNode {
    #[serde(rename = "ID")]
    pub id: String,
    /// Node name.
    pub node: String,
    pub address: String,
    pub datacenter: String,
    /// Alternate addresses keyed by kind (`lan`, `wan`, ...).
    #[serde(default, deserialize_with = "lenient_string_map")]
    pub tagged_addresses: HashMap<String, String>,
}

/// A catalog node together with the service and check data an endpoint attaches to it.
///
/// Which of `service`, `services` and `checks` are filled depends on the
/// endpoint the entry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    pub node: CatalogNode,
    /// The service instance this entry was returned for.
    pub service: Option<AgentService>,
    /// Every service registered on the node.
    pub services: Vec<AgentService>,
    /// Health checks relevant to the entry.
    pub checks: Vec<AgentCheck>,
}

impl NodeEntry {
    fn new(node: CatalogNode) -> Self {
        Self {
            node,
            service: None,
            services: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Decode an element of `/catalog/service/:service`: node fields with
    /// `Service*` fields flattened alongside.
    pub fn from_catalog_service(value: &Value) -> Option<Self> {
        let mut entry = Self::new(CatalogNode::from_json(value)?);
        entry.service = FlatService::from_json(value).map(AgentService::from);
        Some(entry)
    }

    /// Decode `/catalog/node/:node`: `{"Node": {...}, "Services": {id: service}}`.
    pub fn from_node_services(value: &Value) -> Option<Self> {
        let mut entry = Self::new(CatalogNode::from_json(value.get("Node")?)?);
        if let Some(services) = value.get("Services").and_then(Value::as_object) {
            entry.services = services
                .values()
                .filter_map(AgentService::from_json)
                .collect();
        }
        Some(entry)
    }

    /// Decode an element of `/health/service/:service`:
    /// `{"Node": {...}, "Service": {...}, "Checks": [...]}`. The service is required.
    pub fn from_health_service(value: &Value) -> Option<Self> {
        let service = AgentService::from_json(value.get("Service")?)?;
        let mut entry = Self::new(CatalogNode::from_json(value.get("Node")?)?);
        entry.service = Some(service);
        if let Some(checks) = value.get("Checks").and_then(Value::as_array) {
            entry.checks = checks.iter().filter_map(AgentCheck::from_json).collect();
        }
        Some(entry)
    }
}

/// A service name and the union of tags its instances carry.
///
/// Only decodable from the `name -> tags` map returned by `/catalog/services`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogService {
    pub name: String,
    pub tags: Vec<String>,
}

impl KeyedModel for CatalogService {
    fn from_keyed_json(key: &str, value: &Value) -> Option<Self> {
        Some(Self {
            name: key.to_string(),
            tags: string_array(Some(value)),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for listing the nodes that provide a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealthQuery {
    /// Only return instances whose checks are all passing. Defaults to `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing: Option<bool>,
    /// Only return instances carrying this tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "dc", skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,
    /// Sort by round trip time from this node; `_agent` means the queried agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near: Option<String>,
}

impl Default for ServiceHealthQuery {
    fn default() -> Self {
        Self {
            passing: Some(true),
            tag: None,
            datacenter: None,
            near: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// KV
// ─────────────────────────────────────────────────────────────────────────────

/// An entry of the key/value store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyValuePair {
    pub key: String,
    /// Base64-encoded value; `None` for a key holding no data.
    #[serde(default, deserialize_with = "lenient_option")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub flags: Option<u64>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub create_index: Option<u64>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub modify_index: Option<u64>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub lock_index: Option<u64>,
    /// Session holding the lock on this key.
    #[serde(default, deserialize_with = "lenient_option")]
    pub session: Option<String>,
}

impl KeyValuePair {
    /// Decode a read response, which wraps the entry in a one-element array.
    pub fn from_read_response(value: &Value) -> Option<Self> {
        Self::from_json(value.as_array()?.first()?)
    }

    /// The raw value bytes.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        BASE64.decode(self.value.as_deref()?).ok()
    }

    /// The value as UTF-8 text.
    pub fn decoded_value(&self) -> Option<String> {
        String::from_utf8(self.decoded_bytes()?).ok()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// A user event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    /// Base64-encoded payload.
    #[serde(default, deserialize_with = "lenient_option")]
    pub payload: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub node_filter: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub service_filter: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tag_filter: String,
    pub version: u64,
    /// Lamport time of the event.
    #[serde(rename = "LTime")]
    pub l_time: u64,
}

impl Event {
    /// The payload bytes.
    pub fn decoded_payload(&self) -> Option<Vec<u8>> {
        BASE64.decode(self.payload.as_deref()?).ok()
    }
}

/// Options for firing an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOptions {
    pub datacenter: Option<String>,
    /// Regular expression on node names.
    pub node: Option<String>,
    /// Regular expression on service names.
    pub service: Option<String>,
    /// Regular expression on tags.
    pub tag: Option<String>,
    /// Opaque payload delivered with the event.
    pub payload: Option<Vec<u8>>,
}

/// Filters for listing events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventFilter {
    /// Exact event name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}
