//! User events API.

use crate::client::ConsulClient;
use crate::decode::Model;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::ElementPolicy;
use crate::types::{Event, EventFilter, EventOptions};

/// Events API client.
pub struct EventsApi {
    client: ConsulClient,
}

impl EventsApi {
    pub(crate) fn new(client: ConsulClient) -> Self {
        Self { client }
    }

    /// Fire a user event through the gossip layer.
    ///
    /// Node, service and tag filters are regular expressions evaluated by
    /// each receiving agent.
    pub async fn fire(&self, name: &str, options: EventOptions) -> Result<Event> {
        let datacenter = options.datacenter.as_deref();
        let datacenter = self.client.resolve_datacenter(datacenter);
        let mut request = ApiRequest::put(&["event", "fire"])
            .segment(name)
            .query_opt("dc", datacenter)
            .query_opt("node", options.node)
            .query_opt("service", options.service)
            .query_opt("tag", options.tag);
        if let Some(payload) = options.payload {
            request = request.raw(payload);
        }
        self.client.send_single(request, Event::from_json).await
    }

    /// List the most recent events the agent has seen, newest last.
    pub async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let request = ApiRequest::get(&["event", "list"]).query_params(filter)?;
        self.client
            .send_array(request, Event::from_json, ElementPolicy::Lenient)
            .await
    }
}
