//! UI login and logout.

use super::Idrac8;
use crate::context::OperationContext;
use crate::driver::domain::DriverError;
use crate::driver::ports::{Connection, DriverResult};
use crate::providers::status::OK;
use crate::transport::ports::{HttpBody, HttpRequest};
use async_trait::async_trait;
use tracing::debug;

const LOGIN: &str = "data/login";
const LOGOUT: &str = "data/logout";

/// Tokens issued by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Session {
    /// Query-string token for upload endpoints.
    pub(super) st1: String,
    /// Header token for every other call.
    pub(super) st2: String,
}

/// Returns the text between `<tag>` and `</tag>`.
fn element<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let (_, rest) = body.split_once(&format!("<{tag}>"))?;
    let (value, _) = rest.split_once(&format!("</{tag}>"))?;
    Some(value.trim())
}

/// Returns the value of `key=` in a `ST1=..,ST2=..` forward URL.
fn token<'a>(forward_url: &'a str, key: &str) -> Option<&'a str> {
    let (_, rest) = forward_url.split_once(&format!("{key}="))?;
    let value = rest.split([',', '&']).next().unwrap_or_default();
    (!value.is_empty()).then_some(value)
}

/// Parses the XML login reply.
///
/// A successful reply carries `<authResult>0</authResult>` and a
/// `<forwardUrl>index.html?ST1=...,ST2=...</forwardUrl>`.
pub(super) fn parse_login(body: &str) -> DriverResult<Session> {
    if let Some(result) = element(body, "authResult")
        && result != "0"
    {
        return Err(DriverError::Protocol(format!(
            "login rejected with authResult {result}"
        )));
    }
    let forward_url = element(body, "forwardUrl")
        .ok_or_else(|| DriverError::Parse("login reply has no forwardUrl".to_owned()))?;
    let st1 = token(forward_url, "ST1")
        .ok_or_else(|| DriverError::Parse("login reply has no ST1 token".to_owned()))?;
    let st2 = token(forward_url, "ST2")
        .ok_or_else(|| DriverError::Parse("login reply has no ST2 token".to_owned()))?;
    Ok(Session {
        st1: st1.to_owned(),
        st2: st2.to_owned(),
    })
}

impl Idrac8 {
    /// Returns the upload token, failing when no session is open.
    pub(super) async fn st1(&self) -> DriverResult<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.st1.clone())
            .ok_or_else(|| DriverError::validation("iDRAC8 session is not open"))
    }
}

#[async_trait]
impl Connection for Idrac8 {
    async fn open(&self, ctx: &OperationContext) -> DriverResult<()> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("user", &self.credentials.username)
            .append_pair("password", &self.credentials.password)
            .finish();
        let response = self
            .call(ctx, HttpRequest::post(LOGIN, HttpBody::Form(form)), OK)
            .await
            .map_err(|err| err.in_step("login"))?;
        let session = parse_login(&response.text()).map_err(|err| err.in_step("login"))?;
        *self.session.write().await = Some(session);
        debug!(host = %self.credentials.host, "iDRAC8 session opened");
        Ok(())
    }

    /// Logs out and forgets the tokens. The tokens are dropped even when
    /// the logout call fails.
    async fn close(&self, ctx: &OperationContext) -> DriverResult<()> {
        if self.session.read().await.is_none() {
            return Ok(());
        }
        let outcome = self.call(ctx, HttpRequest::get(LOGOUT), OK).await;
        *self.session.write().await = None;
        outcome.map(drop).map_err(|err| err.in_step("logout"))
    }
}
