//! Request descriptors for calls to the FoodKeeper backend.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;

/// Describes one API call. Built fresh for every call and handed to
/// [`ApiClient::execute`](super::ApiClient::execute).
///
/// Requests require authorization unless [`ApiRequest::public`] is called.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) requires_auth: bool,
    pub(crate) refreshable: bool,
    pub(crate) body: Option<serde_json::Value>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            method,
            path,
            requires_auth: true,
            refreshable: true,
            body: None,
            query: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Send without a bearer token. Public calls never trigger a refresh.
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// Keep the bearer token but never refresh on an expired-session reply.
    /// The expiry comes back as [`ApiError::Unauthorized`](super::ApiError::Unauthorized).
    pub fn without_refresh(mut self) -> Self {
        self.refreshable = false;
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the client's default request timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_require_auth() {
        let req = ApiRequest::get("foods");
        assert_eq!(req.path(), "/foods");
        assert_eq!(req.method(), &Method::GET);
        assert!(req.requires_auth());
        assert!(req.refreshable);
        assert!(req.body.is_none());
        assert!(req.timeout.is_none());
    }

    #[test]
    fn test_builder_accumulates() {
        let req = ApiRequest::post("/auth/reissue")
            .public()
            .json(&json!({ "refreshToken": "R1" }))
            .expect("body should serialize")
            .header("Refresh-Token", "R1")
            .query("withinDays", 3)
            .timeout(Duration::from_secs(5));

        assert!(!req.requires_auth());
        assert_eq!(req.body, Some(json!({ "refreshToken": "R1" })));
        assert_eq!(req.headers, vec![("Refresh-Token".to_string(), "R1".to_string())]);
        assert_eq!(req.query, vec![("withinDays".to_string(), "3".to_string())]);
        assert_eq!(req.timeout, Some(Duration::from_secs(5)));
    }
}
