//! Shared client configuration.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::RpcError;

/// The transport every procedure supports unless it says otherwise.
pub const DEFAULT_TRANSPORT: &str = "http";

/// Configuration shared by a client and all of its services.
#[derive(Debug)]
pub struct RpcClientConfig {
    pub http_client: reqwest::Client,
    pub base_url: String,
    /// The transport requests go over.
    pub transport: String,
    /// Sent as the `client-version` header when set.
    pub client_version: Option<String>,
    headers: RwLock<HashMap<String, String>>,
}

impl RpcClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            transport: DEFAULT_TRANSPORT.to_string(),
            client_version: None,
            headers: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = transport.into();
        self
    }

    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = Some(version.into());
        self
    }

    /// Sets a header sent with every subsequent request.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut headers) = self.headers.write() {
            headers.insert(name.into(), value.into());
        }
    }

    pub fn remove_header(&self, name: &str) {
        if let Ok(mut headers) = self.headers.write() {
            headers.remove(name);
        }
    }

    /// A snapshot of the custom headers.
    pub fn headers(&self) -> HashMap<String, String> {
        self.headers
            .read()
            .map(|headers| headers.clone())
            .unwrap_or_default()
    }

    /// Fails when `procedure` does not allow the active transport, or when the
    /// active transport is not one this client can dispatch.
    pub fn ensure_transport(&self, procedure: &str, allowed: &[&str]) -> Result<(), RpcError> {
        if !allowed.contains(&self.transport.as_str()) {
            return Err(RpcError::transport_not_allowed(procedure, &self.transport, allowed));
        }
        if self.transport != DEFAULT_TRANSPORT {
            return Err(RpcError::unsupported_transport(&self.transport));
        }
        Ok(())
    }

    /// `base_url` joined with `path` and an optional query string.
    pub(crate) fn url(&self, path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_transport() {
        let config = RpcClientConfig::new("http://localhost");
        assert!(config.ensure_transport("users.get", &["http"]).is_ok());
        assert!(config.ensure_transport("users.get", &["http", "ws"]).is_ok());

        let err = config.ensure_transport("chat.join", &["ws"]).unwrap_err();
        assert!(err.message.contains("chat.join"));
        assert!(err.message.contains("ws"));

        let ws = RpcClientConfig::new("http://localhost").with_transport("ws");
        let err = ws.ensure_transport("chat.join", &["ws"]).unwrap_err();
        assert!(err.message.contains("not supported"));
    }

    #[test]
    fn test_url_joining() {
        let config = RpcClientConfig::new("http://localhost:3000/");
        assert_eq!(config.url("/users/get", None), "http://localhost:3000/users/get");
        assert_eq!(config.url("/users/get", Some("")), "http://localhost:3000/users/get");
        assert_eq!(
            config.url("/users/get", Some("id=1&q=a")),
            "http://localhost:3000/users/get?id=1&q=a"
        );
    }

    #[test]
    fn test_headers_are_shared() {
        let config = RpcClientConfig::new("http://localhost");
        config.set_header("authorization", "Bearer a");
        config.set_header("authorization", "Bearer b");
        assert_eq!(config.headers().get("authorization").map(String::as_str), Some("Bearer b"));
        config.remove_header("authorization");
        assert!(config.headers().is_empty());
    }
}
