//! Request descriptors.
//!
//! An [`ApiRequest`] names an endpoint by its path segments below `/v1`,
//! carries query parameters and an optional body, and turns into an
//! absolute [`HttpRequest`] against a base URL. Every path segment is
//! percent-encoded on its own, so identifiers containing `/`, `?` or `#`
//! cannot change the shape of the path. Segments equal to `.` or `..` are
//! refused with [`Error::InvalidPathSegment`]: URL normalisation would fold
//! them into their neighbours whether or not they are escaped.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::transport::HttpRequest;

/// API version prefix.
const API_VERSION: &str = "v1";

/// Request body, encoded as chosen by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    /// JSON document.
    Json(Vec<u8>),
    /// `application/x-www-form-urlencoded` pairs.
    Form(String),
    /// Bytes sent verbatim.
    Raw(Vec<u8>),
}

/// A single API call described as data.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Body,
}

impl ApiRequest {
    /// Start a request for `path`, given as literal segments below `/v1`.
    pub fn new(method: Method, path: &[&str]) -> Self {
        Self {
            method,
            segments: path.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(path: &[&str]) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn put(path: &[&str]) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: &[&str]) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a caller-supplied identifier as exactly one path segment.
    ///
    /// `.` and `..` fail when the URL is built.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append a KV key, keeping `/` as the hierarchy separator.
    ///
    /// An empty key leaves a trailing slash, which addresses the key-space root.
    /// Keys with a `.` or `..` component fail when the URL is built.
    pub fn key_path(mut self, key: &str) -> Self {
        let pieces = key.trim_start_matches('/').split('/');
        self.segments.extend(pieces.map(str::to_string));
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    /// Add a query parameter if a value is present.
    pub fn query_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Add a boolean query parameter, encoded as `true`/`false`.
    pub fn query_flag(self, name: &str, value: bool) -> Self {
        self.query(name, value.to_string())
    }

    /// Add every field of a flat serializable struct as a query parameter.
    ///
    /// `None` fields are skipped; numbers and booleans are rendered as text.
    pub fn query_params<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self> {
        let value = serde_json::to_value(params)?;
        let Value::Object(fields) = value else {
            return Err(Error::UnexpectedShape {
                expected: "object of query parameters",
            });
        };
        for (name, value) in fields {
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::UnexpectedShape {
                        expected: "scalar query parameter",
                    })
                }
            };
            self.query.push((name, rendered));
        }
        Ok(self)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Body::Json(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Attach a URL-encoded form body.
    pub fn form<'a>(mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.body = Body::Form(encoded);
        self
    }

    /// Attach a raw body.
    pub fn raw(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Raw(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Resolve against `base`, percent-encoding path segments and query.
    pub fn url(&self, base: &Url) -> Result<Url> {
        if let Some(segment) = self.segments.iter().find(|s| is_dot_segment(s)) {
            return Err(Error::InvalidPathSegment(segment.clone()));
        }
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| cannot_be_base(base))?;
            path.pop_if_empty();
            path.push(API_VERSION);
            path.extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }

    /// Produce the transport-level request.
    pub fn into_http(self, base: &Url) -> Result<HttpRequest> {
        let url = self.url(base)?;
        let (headers, body) = match self.body {
            Body::Empty => (Vec::new(), None),
            Body::Json(bytes) => (content_type("application/json"), Some(bytes)),
            Body::Form(encoded) => (
                content_type("application/x-www-form-urlencoded"),
                Some(encoded.into_bytes()),
            ),
            Body::Raw(bytes) => (Vec::new(), Some(bytes)),
        };
        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body,
        })
    }
}

fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

fn cannot_be_base(base: &Url) -> Error {
    Error::Config(format!("base URL cannot carry a path: {base}"))
}

fn content_type(value: &str) -> Vec<(String, String)> {
    vec![("content-type".to_string(), value.to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8500").unwrap()
    }

    #[test]
    fn test_literal_path() {
        let url = ApiRequest::get(&["agent", "members"]).url(&base()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8500/v1/agent/members");
    }

    #[test]
    fn test_base_path_is_preserved() {
        let base = Url::parse("http://proxy.local/consul/").unwrap();
        let request = ApiRequest::get(&["catalog", "datacenters"]);
        let url = request.url(&base).unwrap();
        let expected = "http://proxy.local/consul/v1/catalog/datacenters";
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn test_identifier_segment_is_escaped() {
        let url = ApiRequest::get(&["catalog", "node"])
            .segment("rack/1 node?")
            .url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8500/v1/catalog/node/rack%2F1%20node%3F"
        );
    }

    #[test]
    fn test_key_path_keeps_hierarchy() {
        let url = ApiRequest::get(&["kv"])
            .key_path("/config/web app/port")
            .url(&base())
            .unwrap();
        let expected = "http://localhost:8500/v1/kv/config/web%20app/port";
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        let request = ApiRequest::put(&["agent", "service", "deregister"]).segment("..");
        let err = request.url(&base()).unwrap_err();
        assert!(matches!(err, Error::InvalidPathSegment(ref s) if s == ".."));

        let request = ApiRequest::get(&["catalog", "node"]).segment(".");
        assert!(request.url(&base()).is_err());
    }

    #[test]
    fn test_key_path_rejects_dot_components() {
        for key in ["app/../secret", ".", "app/./mode", ".."] {
            let request = ApiRequest::get(&["kv"]).key_path(key);
            let result = request.url(&base());
            assert!(
                matches!(result, Err(Error::InvalidPathSegment(_))),
                "{key} should be rejected"
            );
        }
    }

    #[test]
    fn test_dotted_names_are_plain_segments() {
        let request = ApiRequest::get(&["kv"]).key_path("app/.env/..bak");
        let url = request.url(&base()).unwrap();
        assert_eq!(url.path(), "/v1/kv/app/.env/..bak");
    }

    #[test]
    fn test_empty_key_path_addresses_root() {
        let url = ApiRequest::get(&["kv"])
            .key_path("")
            .query_flag("keys", true)
            .url(&base())
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8500/v1/kv/?keys=true");
    }

    #[test]
    fn test_query_is_encoded() {
        let url = ApiRequest::put(&["agent", "maintenance"])
            .query_flag("enable", true)
            .query("reason", "disk swap & reboot")
            .query_opt("dc", None::<String>)
            .url(&base())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8500/v1/agent/maintenance?enable=true&reason=disk+swap+%26+reboot"
        );
    }

    #[test]
    fn test_query_params_from_struct() {
        #[derive(Serialize)]
        struct Params {
            passing: Option<bool>,
            tag: Option<String>,
            dc: Option<String>,
            limit: u32,
        }

        let request = ApiRequest::get(&["health", "service"])
            .segment("web")
            .query_params(&Params {
                passing: Some(true),
                tag: None,
                dc: Some("dc2".into()),
                limit: 5,
            })
            .unwrap();
        let url = request.url(&base()).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("passing".into(), "true".into())));
        assert!(pairs.contains(&("dc".into(), "dc2".into())));
        assert!(pairs.contains(&("limit".into(), "5".into())));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_query_params_rejects_nested_values() {
        let params = serde_json::json!({"a": [1]});
        let result = ApiRequest::get(&["x"]).query_params(&params);
        assert!(matches!(result, Err(Error::UnexpectedShape { .. })));
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let http = ApiRequest::put(&["agent", "check", "update"])
            .segment("web-ttl")
            .json(&serde_json::json!({"Status": "passing"}))
            .unwrap()
            .into_http(&base())
            .unwrap();
        assert_eq!(http.method, Method::PUT);
        assert_eq!(
            http.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let bytes = http.body.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["Status"], "passing");
    }

    #[test]
    fn test_form_body() {
        let pairs = [("note", "all good"), ("a", "b&c")];
        let request = ApiRequest::put(&["x"]).form(pairs);
        let expected = Body::Form("note=all+good&a=b%26c".to_string());
        assert_eq!(request.body(), &expected);
        let http = request.into_http(&base()).unwrap();
        assert_eq!(http.headers[0].1, "application/x-www-form-urlencoded");
    }

    #[test]
    fn test_raw_body_has_no_content_type() {
        let http = ApiRequest::put(&["kv", "k"])
            .raw("unitTestValue")
            .into_http(&base())
            .unwrap();
        assert!(http.headers.is_empty());
        assert_eq!(http.body.as_deref(), Some(b"unitTestValue".as_slice()));
    }

    #[test]
    fn test_cannot_be_base_url_is_rejected() {
        let base = Url::parse("mailto:ops@example.com").unwrap();
        assert!(matches!(
            ApiRequest::get(&["agent", "self"]).url(&base),
            Err(Error::Config(_))
        ));
    }
}
