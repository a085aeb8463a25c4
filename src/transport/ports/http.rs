//! HTTP request contract.

use crate::context::{ContextError, OperationContext};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

/// HTTP verbs used by BMC APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`.
    Get,
    /// `POST`.
    Post,
    /// `PUT`.
    Put,
    /// `PATCH`.
    Patch,
    /// `DELETE`.
    Delete,
}

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFile {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
}

/// A `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultipartForm {
    /// Plain text fields, in order.
    pub fields: Vec<(String, String)>,
    /// Attached files, in order.
    pub files: Vec<MultipartFile>,
}

impl MultipartForm {
    /// Adds a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Adds a file part.
    #[must_use]
    pub fn file(mut self, file: MultipartFile) -> Self {
        self.files.push(file);
        self
    }
}

/// Request body variants.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HttpBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document.
    Json(serde_json::Value),
    /// Pre-encoded `application/x-www-form-urlencoded` body.
    Form(String),
    /// Raw bytes with an explicit content type.
    Binary {
        /// MIME type.
        content_type: String,
        /// Payload.
        data: Bytes,
    },
    /// Multipart form upload.
    Multipart(MultipartForm),
}

/// One request relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Verb.
    pub method: HttpMethod,
    /// Path and query, relative to the base URL. Sent verbatim.
    pub path: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Body.
    pub body: HttpBody,
}

impl HttpRequest {
    /// Builds a request with no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: HttpBody::Empty,
        }
    }

    /// Builds a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Builds a `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>, body: HttpBody) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    /// Builds a `PUT` request.
    #[must_use]
    pub fn put(path: impl Into<String>, body: HttpBody) -> Self {
        Self::new(HttpMethod::Put, path).with_body(body)
    }

    /// Builds a `PATCH` request.
    #[must_use]
    pub fn patch(path: impl Into<String>, body: HttpBody) -> Self {
        Self::new(HttpMethod::Patch, path).with_body(body)
    }

    /// Builds a `DELETE` request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: HttpBody) -> Self {
        self.body = body;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Builds a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Sends requests to one BMC endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` and returns the response whatever its status code.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when no response was received.
    async fn send(&self, ctx: &OperationContext, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Errors returned by HTTP transports.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, TLS or I/O failure.
    #[error("HTTP transport failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The context ended before a response arrived.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl HttpError {
    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
