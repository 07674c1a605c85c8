//! Synchronous facade.
//!
//! Every endpoint is an `async fn`; [`BlockingClient`] runs those futures to
//! completion on a private single-threaded runtime, blocking the calling
//! thread for the duration of the exchange:
//!
//! ```no_run
//! use consul_client::BlockingClient;
//!
//! # fn example() -> consul_client::Result<()> {
//! let consul = BlockingClient::localhost()?;
//! let written = consul.block_on(consul.client().kv().write("app/mode", "active", None))?;
//! assert!(written);
//! # Ok(())
//! # }
//! ```
//!
//! `block_on` panics when called from inside an async runtime; use the async
//! client directly there.

use std::future::Future;

use tokio::runtime::{Builder, Runtime};

use crate::client::ConsulClient;
use crate::config::ConsulConfig;
use crate::error::Result;

/// Runs [`ConsulClient`] calls on the caller's thread.
#[derive(Debug)]
pub struct BlockingClient {
    client: ConsulClient,
    runtime: Runtime,
}

impl BlockingClient {
    /// Wrap an async client.
    pub fn new(client: ConsulClient) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { client, runtime })
    }

    /// Create a blocking client from configuration.
    pub fn from_config(config: &ConsulConfig) -> Result<Self> {
        Self::new(ConsulClient::from_config(config)?)
    }

    /// Create a blocking client for the local agent.
    pub fn localhost() -> Result<Self> {
        Self::new(ConsulClient::localhost()?)
    }

    /// The wrapped async client, used to build the futures passed to [`block_on`](Self::block_on).
    pub fn client(&self) -> &ConsulClient {
        &self.client
    }

    /// Drive `future` to completion and return its output.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
