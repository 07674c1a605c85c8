//! API endpoint implementations.

mod agent;
mod catalog;
mod checks;
mod events;
mod health;
mod kv;
mod services;

pub use agent::AgentApi;
pub use catalog::CatalogApi;
pub use checks::ChecksApi;
pub use events::EventsApi;
pub use health::HealthApi;
pub use kv::KvApi;
pub use services::ServicesApi;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use serde_json::Value;

    use crate::client::{ClientBuilder, ConsulClient};
    use crate::transport::{HttpRequest, HttpResponse, MockTransport};

    /// A client for the default address that answers from `responses` in order.
    pub(crate) fn mock_client(responses: Vec<HttpResponse>) -> (ConsulClient, Arc<MockTransport>) {
        mock_builder(ConsulClient::builder(), responses)
    }

    /// Like [`mock_client`], with a default datacenter configured.
    pub(crate) fn mock_client_in(
        datacenter: &str,
        responses: Vec<HttpResponse>,
    ) -> (ConsulClient, Arc<MockTransport>) {
        let builder = ConsulClient::builder().datacenter(datacenter);
        mock_builder(builder, responses)
    }

    fn mock_builder(
        builder: ClientBuilder,
        responses: Vec<HttpResponse>,
    ) -> (ConsulClient, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new(responses));
        let client = builder
            .base_url("http://localhost:8500")
            .transport(mock.clone())
            .build()
            .expect("mock client");
        (client, mock)
    }

    /// The JSON body a request carried.
    pub(crate) fn sent_json(request: &HttpRequest) -> Value {
        let body = request.body.as_deref().expect("request body");
        serde_json::from_slice(body).expect("JSON body")
    }
}
