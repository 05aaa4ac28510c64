use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::core::errors::ViewError;

/// A request against the network server, path relative to its origin.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            ..Self::get(path)
        }
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode a successful JSON body, mapping HTTP errors to `ViewError`.
    pub fn json<R: DeserializeOwned>(&self) -> Result<R, ViewError> {
        if !self.status.is_success() {
            return Err(ViewError::Status {
                status: self.status.as_u16(),
                message: String::from_utf8_lossy(&self.body).into_owned(),
            });
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| ViewError::Decode(format!("response body: {}", e)))
    }
}

/// Issues requests for the controller. Implemented over `reqwest` for native
/// hosts; tests and browser bindings bring their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ViewError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ViewError> {
        (**self).send(request).await
    }
}

pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
    session: Option<String>,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        }
    }

    /// Cookie header forwarded on every request, e.g. `sessionid=...`.
    pub fn with_session(mut self, cookie: Option<String>) -> Self {
        self.session = cookie;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ViewError> {
        let mut builder = self
            .http
            .request(request.method, self.url(&request.path))
            .headers(request.headers);
        if let Some(cookie) = &self.session {
            builder = builder.header(reqwest::header::COOKIE, cookie.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        Ok(ApiResponse::new(status, body.to_vec()))
    }
}
