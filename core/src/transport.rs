//! The I/O seam: something that turns an `HttpRequest` into an
//! `HttpResponse`.
//!
//! # Design
//! A transport only moves bytes. It reports non-2xx statuses as ordinary
//! responses and fails only when no response was obtained at all; `Endpoint`
//! decides what a status means. `ReqwestTransport` is the production
//! implementation, `MockTransport` (in `mock`) the scripted one.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;

    async fn get(&self, path: &str) -> Result<HttpResponse, ApiError> {
        self.execute(HttpRequest {
            method: HttpMethod::Get,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
        })
        .await
    }

    async fn post(
        &self,
        path: &str,
        body: String,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ApiError> {
        self.execute(HttpRequest {
            method: HttpMethod::Post,
            path: path.to_string(),
            headers: headers.to_vec(),
            body: Some(body),
        })
        .await
    }

    async fn put(
        &self,
        path: &str,
        body: String,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, ApiError> {
        self.execute(HttpRequest {
            method: HttpMethod::Put,
            path: path.to_string(),
            headers: headers.to_vec(),
            body: Some(body),
        })
        .await
    }

    async fn delete(&self, path: &str) -> Result<HttpResponse, ApiError> {
        self.execute(HttpRequest {
            method: HttpMethod::Delete,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
        })
        .await
    }
}

/// HTTP transport backed by `reqwest`.
///
/// Relative request paths such as `api/contacts` are resolved against the
/// configured origin, the same way a browser resolves them against the page.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    origin: Option<Url>,
}

impl ReqwestTransport {
    /// Transport that only accepts absolute request paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that resolves relative paths against `origin`.
    pub fn with_origin(origin: &str) -> Result<Self, ApiError> {
        let mut origin = origin.to_string();
        if !origin.ends_with('/') {
            origin.push('/');
        }
        let origin = Url::parse(&origin)
            .map_err(|e| ApiError::Transport(format!("invalid origin {origin}: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            origin: Some(origin),
        })
    }

    /// Reuse an existing `reqwest::Client` (connection pool, proxy settings).
    pub fn with_client(http: reqwest::Client, origin: Option<Url>) -> Self {
        Self { http, origin }
    }

    fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.origin {
                Some(origin) => origin
                    .join(path)
                    .map_err(|e| ApiError::Transport(format!("cannot resolve {path}: {e}"))),
                None => Err(ApiError::Transport(format!(
                    "relative path {path} requires an origin"
                ))),
            },
            Err(e) => Err(ApiError::Transport(format!("invalid URL {path}: {e}"))),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.resolve(&request.path)?;
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        debug!(method = %request.method, %url, "sending request");

        let mut builder = self.http.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        debug!(status, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_resolves_against_origin() {
        let transport = ReqwestTransport::with_origin("http://localhost:3000").unwrap();
        let url = transport.resolve("api/contacts/7").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/contacts/7");
    }

    #[test]
    fn origin_path_is_kept_as_prefix() {
        let transport = ReqwestTransport::with_origin("http://localhost:3000/app").unwrap();
        let url = transport.resolve("api/contacts").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/app/api/contacts");
    }

    #[test]
    fn absolute_path_ignores_origin() {
        let transport = ReqwestTransport::with_origin("http://localhost:3000").unwrap();
        let url = transport.resolve("http://example.com/contacts").unwrap();
        assert_eq!(url.as_str(), "http://example.com/contacts");
    }

    #[test]
    fn relative_path_without_origin_is_a_transport_error() {
        let err = ReqwestTransport::new().resolve("api/contacts").unwrap_err();
        assert!(matches!(err, ApiError::Transport(msg) if msg.contains("requires an origin")));
    }

    #[test]
    fn shared_client_keeps_origin() {
        let origin = Url::parse("http://localhost:4200/").unwrap();
        let transport = ReqwestTransport::with_client(reqwest::Client::new(), Some(origin));
        let url = transport.resolve("api/contacts").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4200/api/contacts");
    }

    #[test]
    fn invalid_origin_is_rejected() {
        assert!(ReqwestTransport::with_origin("not a url").is_err());
    }
}
