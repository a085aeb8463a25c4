//! `reqwest` HTTP transport.

use crate::context::OperationContext;
use crate::transport::ports::{
    HttpBody, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartForm,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;

/// Connection settings for [`ReqwestTransport`].
#[derive(Clone)]
pub struct HttpOptions {
    /// Scheme, host and port, for example `https://10.0.0.5:443`.
    pub base_url: String,
    /// Credentials sent as HTTP basic auth on every request.
    pub basic_auth: Option<(String, String)>,
    /// Accept self-signed BMC certificates.
    pub insecure_tls: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Keep cookies between requests, for session-based APIs.
    pub cookies: bool,
}

impl std::fmt::Debug for HttpOptions {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpOptions")
            .field("base_url", &self.base_url)
            .field(
                "basic_auth",
                &self.basic_auth.as_ref().map(|(user, _)| (user, "<redacted>")),
            )
            .field("insecure_tls", &self.insecure_tls)
            .field("timeout", &self.timeout)
            .field("cookies", &self.cookies)
            .finish()
    }
}

/// HTTP transport bound to one BMC base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    basic_auth: Option<(String, String)>,
}

impl ReqwestTransport {
    /// Builds the underlying client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] when the TLS backend cannot be
    /// initialised.
    pub fn new(options: HttpOptions) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure_tls)
            .cookie_store(options.cookies)
            .build()
            .map_err(HttpError::transport)?;
        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_owned(),
            basic_auth: options.basic_auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder, HttpError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, self.url(&request.path));
        if let Some((user, password)) = &self.basic_auth {
            builder = builder.basic_auth(user, Some(password));
        }
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        Ok(match request.body {
            HttpBody::Empty => builder,
            HttpBody::Json(document) => builder.json(&document),
            HttpBody::Form(encoded) => builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encoded),
            HttpBody::Binary { content_type, data } => {
                builder.header(CONTENT_TYPE, content_type).body(data)
            }
            HttpBody::Multipart(form) => builder.multipart(multipart(form)?),
        })
    }
}

fn multipart(form: MultipartForm) -> Result<Form, HttpError> {
    let mut body = Form::new();
    for (name, value) in form.fields {
        body = body.text(name, value);
    }
    for file in form.files {
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|err| HttpError::InvalidRequest(err.to_string()))?;
        body = body.part(file.field, part);
    }
    Ok(body)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, ctx: &OperationContext, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        ctx.check()?;
        let method = request.method;
        let endpoint = request.path.split('?').next().unwrap_or_default().to_owned();
        let builder = self.build(request)?;

        let exchange = async {
            let reply = builder.send().await.map_err(HttpError::transport)?;
            let status = reply.status().as_u16();
            let body = reply.bytes().await.map_err(HttpError::transport)?;
            Ok::<_, HttpError>(HttpResponse { status, body })
        };
        let response = tokio::select! {
            biased;
            reason = ctx.done() => return Err(HttpError::Context(reason)),
            result = exchange => result?,
        };
        debug!(?method, endpoint = %endpoint, status = response.status, "BMC request");
        Ok(response)
    }
}
