//! Typed client for the Consul HTTP API.
//!
//! Every endpoint is one `async fn` that builds a request, sends it through a
//! [`Transport`] and maps the JSON answer onto typed models.
//!
//! # Example
//!
//! ```no_run
//! use consul_client::{CheckRegistration, ConsulClient, ConsulConfig, Result, ServiceRegistration};
//!
//! # async fn example() -> Result<()> {
//! let client = ConsulClient::from_config(&ConsulConfig::default())?;
//!
//! // Register a service with a TTL check and keep it alive
//! let service = ServiceRegistration::new("web")
//!     .with_port(8080)
//!     .with_check(CheckRegistration::ttl("web-ttl", "30s").with_id("web-ttl"));
//! client.services().register(&service).await?;
//! client.checks().pass("web-ttl", Some("warmed up")).await?;
//!
//! // Read and write the key/value store
//! client.kv().write("web/config/mode", "active", None).await?;
//! let pair = client.kv().read("web/config/mode", None).await?;
//! println!("{:?}", pair.decoded_value());
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Agent**: members, configuration, reload, maintenance, join, leave
//! - **Checks**: list, register, deregister, TTL pass/warn/fail/update
//! - **Services**: list, register, deregister, maintenance
//! - **Catalog**: datacenters, nodes, services, per-service and per-node views
//! - **Health**: node checks, service health, checks by state
//! - **KV**: list keys, read, write, delete
//! - **Events**: fire, list
//!
//! With the `blocking` feature (on by default), [`BlockingClient`] runs the
//! same calls on the caller's thread.

pub mod api;
#[cfg(feature = "blocking")]
pub mod blocking;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

#[cfg(feature = "blocking")]
pub use blocking::BlockingClient;
pub use client::{ClientBuilder, ConsulClient};
pub use config::{ConsulConfig, DEFAULT_ADDRESS};
pub use decode::{KeyedModel, Model};
pub use error::{Error, Result};
pub use response::ElementPolicy;
#[cfg(any(test, feature = "testing"))]
pub use transport::MockTransport;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::*;
