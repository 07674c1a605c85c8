//! Key/value store API.
//!
//! Keys are hierarchical: `/` separates levels and is kept in the request
//! path, every other reserved character is percent-encoded.

use serde_json::Value;

use crate::client::ConsulClient;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::ElementPolicy;
use crate::types::KeyValuePair;

/// KV API client.
pub struct KvApi {
    client: ConsulClient,
}

impl KvApi {
    pub(crate) fn new(client: ConsulClient) -> Self {
        Self { client }
    }

    /// List every key in the store.
    pub async fn list_keys(&self, datacenter: Option<&str>) -> Result<Vec<String>> {
        self.list_keys_with_prefix("", datacenter).await
    }

    /// List the keys starting with `prefix`. An empty result is `Ok(vec![])`.
    pub async fn list_keys_with_prefix(
        &self,
        prefix: &str,
        datacenter: Option<&str>,
    ) -> Result<Vec<String>> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::get(&["kv"])
            .key_path(prefix)
            .query_flag("keys", true)
            .query_opt("dc", datacenter);
        let keys = self
            .client
            .send_array(
                request,
                |value: &Value| value.as_str().map(str::to_string),
                ElementPolicy::Lenient,
            )
            .await;
        match keys {
            // Consul answers 404 when no key matches.
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    /// Read one entry. A missing key is [`Error::NotFound`](crate::Error::NotFound).
    pub async fn read(&self, key: &str, datacenter: Option<&str>) -> Result<KeyValuePair> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::get(&["kv"])
            .key_path(key)
            .query_opt("dc", datacenter);
        self.client
            .send_single(request, KeyValuePair::from_read_response)
            .await
    }

    /// Store `value` under `key`, creating or replacing it.
    ///
    /// Returns Consul's verdict on whether the write was applied.
    pub async fn write(
        &self,
        key: &str,
        value: impl Into<Vec<u8>>,
        datacenter: Option<&str>,
    ) -> Result<bool> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::put(&["kv"])
            .key_path(key)
            .query_opt("dc", datacenter)
            .raw(value);
        self.client.send_bool(request).await
    }

    /// Delete `key`. Deleting a missing key still succeeds.
    pub async fn delete(&self, key: &str, datacenter: Option<&str>) -> Result<bool> {
        let datacenter = self.client.resolve_datacenter(datacenter);
        let request = ApiRequest::delete(&["kv"])
            .key_path(key)
            .query_opt("dc", datacenter);
        self.client.send_bool(request).await
    }
}
