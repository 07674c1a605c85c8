//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::api::{AgentApi, CatalogApi, ChecksApi, EventsApi, HealthApi, KvApi, ServicesApi};
use crate::config::{ConsulConfig, DEFAULT_ADDRESS, DEFAULT_TIMEOUT_SECS};
use crate::decode::KeyedModel;
use crate::error::{Error, Result};
use crate::request::ApiRequest;
use crate::response::{self, ElementPolicy};
use crate::transport::{HttpResponse, ReqwestTransport, Transport};

/// Consul API client.
///
/// Holds the agent's base URL and a transport; carries no per-request state,
/// so clones can be used from any number of tasks at once.
///
/// # Example
///
/// ```no_run
/// use consul_client::{ConsulClient, ConsulConfig};
///
/// # async fn example() -> consul_client::Result<()> {
/// let client = ConsulClient::from_config(&ConsulConfig::default())?;
///
/// for member in client.agent().members().await? {
///     println!("{} {}:{}", member.name, member.address, member.port);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConsulClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    /// Executes requests.
    transport: Arc<dyn Transport>,
    /// Base URL for API requests.
    base_url: Url,
    /// Sent as `dc` when an endpoint is called without a datacenter.
    datacenter: Option<String>,
}

impl std::fmt::Debug for ConsulClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsulClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("datacenter", &self.inner.datacenter)
            .finish()
    }
}

impl ConsulClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: &ConsulConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a client for the agent at [`DEFAULT_ADDRESS`].
    pub fn localhost() -> Result<Self> {
        Self::builder().base_url(DEFAULT_ADDRESS).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the default datacenter, if one was configured.
    pub fn datacenter(&self) -> Option<&str> {
        self.inner.datacenter.as_deref()
    }

    /// Pick the datacenter to send: the explicit one, else the default.
    pub(crate) fn resolve_datacenter<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit.or(self.datacenter())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the agent API (members, configuration, maintenance, join/leave).
    pub fn agent(&self) -> AgentApi {
        AgentApi::new(self.clone())
    }

    /// Access the agent check API.
    pub fn checks(&self) -> ChecksApi {
        ChecksApi::new(self.clone())
    }

    /// Access the agent service API.
    pub fn services(&self) -> ServicesApi {
        ServicesApi::new(self.clone())
    }

    /// Access the catalog API.
    pub fn catalog(&self) -> CatalogApi {
        CatalogApi::new(self.clone())
    }

    /// Access the health API.
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    /// Access the key/value API.
    pub fn kv(&self) -> KvApi {
        KvApi::new(self.clone())
    }

    /// Access the user event API.
    pub fn events(&self) -> EventsApi {
        EventsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a request and return the raw response.
    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<HttpResponse> {
        let http = request.into_http(&self.inner.base_url)?;
        let method = http.method.clone();
        let url = http.url.clone();

        tracing::debug!(%method, %url, "Sending Consul request");
        let response = self.inner.transport.send(http).await?;

        if !response.is_success() {
            tracing::warn!(
                %method,
                %url,
                status = response.status,
                "Consul request failed"
            );
        }
        if response.status == 404 {
            return Err(not_found(&url, &response));
        }
        Ok(response)
    }

    /// Send a request whose response carries no data.
    pub(crate) async fn send_empty(&self, request: ApiRequest) -> Result<()> {
        let response = self.execute(request).await?;
        response::empty(&response)
    }

    /// Send a request answered with `true`/`false`.
    pub(crate) async fn send_bool(&self, request: ApiRequest) -> Result<bool> {
        let response = self.execute(request).await?;
        response::boolean(&response)
    }

    /// Send a request answered with one object.
    pub(crate) async fn send_single<T, F>(&self, request: ApiRequest, decode: F) -> Result<T>
    where
        F: Fn(&Value) -> Option<T>,
    {
        let response = self.execute(request).await?;
        response::single(&response, decode)
    }

    /// Send a request answered with an array.
    pub(crate) async fn send_array<T, F>(
        &self,
        request: ApiRequest,
        decode: F,
        policy: ElementPolicy,
    ) -> Result<Vec<T>>
    where
        F: Fn(&Value) -> Option<T>,
    {
        let response = self.execute(request).await?;
        response::array(&response, decode, policy)
    }

    /// Send a request answered with an object whose values are the models.
    pub(crate) async fn send_values<T, F>(
        &self,
        request: ApiRequest,
        decode: F,
        policy: ElementPolicy,
    ) -> Result<Vec<T>>
    where
        F: Fn(&Value) -> Option<T>,
    {
        let response = self.execute(request).await?;
        response::values(&response, decode, policy)
    }

    /// Send a request answered with an object keyed by model name.
    pub(crate) async fn send_keyed<T: KeyedModel>(
        &self,
        request: ApiRequest,
        policy: ElementPolicy,
    ) -> Result<Vec<T>> {
        let response = self.execute(request).await?;
        response::keyed(&response, policy)
    }
}

/// A 404 names the path that missed, since Consul often leaves the body empty.
fn not_found(url: &Url, response: &HttpResponse) -> Error {
    let body = response.text();
    let body = body.trim();
    if body.is_empty() {
        Error::NotFound(url.path().to_string())
    } else {
        Error::NotFound(format!("{}: {}", url.path(), body))
    }
}

/// Builder for creating a ConsulClient.
pub struct ClientBuilder {
    base_url: Option<String>,
    datacenter: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            datacenter: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            transport: None,
        }
    }

    /// Apply every setting from a configuration.
    pub fn config(mut self, config: &ConsulConfig) -> Self {
        self.base_url = Some(config.address.clone());
        self.datacenter = config.datacenter.clone();
        self.timeout = config.timeout();
        self.user_agent = config.user_agent.clone();
        self
    }

    /// Set the base URL of the agent.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the datacenter used when an endpoint is called without one.
    pub fn datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use a custom transport instead of the default `reqwest` one.
    ///
    /// Timeout and user agent settings are ignored when a transport is given.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ConsulClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "unsupported URL scheme '{}' in {}",
                base_url.scheme(),
                base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("consul-client/{}", env!("CARGO_PKG_VERSION")));
                Arc::new(ReqwestTransport::new(self.timeout, &user_agent)?)
            }
        };

        Ok(ConsulClient {
            inner: Arc::new(ClientInner {
                transport,
                base_url,
                datacenter: self.datacenter,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
