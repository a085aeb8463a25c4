//! Configuration resources over the iDRAC8 UI endpoints.

use super::{Idrac8, escape_ldap};
use crate::context::OperationContext;
use crate::driver::domain::{
    DriverError, HttpsCertAttributes, HttpsCertificate, LdapConfig, LdapGroupConfig, NetworkConfig, NtpConfig,
    SyslogConfig, UserConfig, UserReconciliation, UserRole,
};
use crate::driver::ports::{DriverResult, ResourceConfigurator};
use crate::providers::status::{CREATED, OK};
use crate::transport::ports::{HttpBody, HttpRequest, MultipartFile, MultipartForm};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const SYSLOG: &str = "sysmgmt/2012/server/configgroup/iDRAC.SysLog";
const LDAP_CONF: &str = "postset?ldapconf";
const NETWORK: &str = "data?set";
const CERT_STORE: &str = "sysmgmt/2012/server/transient/filestore?fileupload=true";
const CERT_INSTALL: &str = "sysmgmt/2012/server/network/ssl/cert";

/// Directory role groups the controller can hold.
pub(super) const MAX_LDAP_GROUPS: usize = 5;

/// Forward alerts of every category and severity to syslog.
const ALERT_FILTERS: &str = "alertFilter_sysHealth:7,alertFilter_storage:7,\
    alertFilter_config:7,alertFilter_audit:7,alertFilter_updates:7,alertFilter_workNotes:7";

/// Builds the query-escaped `bindata?set=serverCSR(...)` endpoint.
///
/// The controller reads `@` in the address as an escape, so it is sent as
/// `@040`.
fn csr_endpoint(subject: &HttpsCertAttributes) -> String {
    let fields: Vec<String> = subject
        .fields()
        .into_iter()
        .map(|(name, value)| {
            if name == "email" {
                value.replace('@', "@040")
            } else {
                value.to_owned()
            }
        })
        .collect();
    let query = format!("bindata?set=serverCSR({})", fields.join(","));
    url::form_urlencoded::byte_serialize(query.as_bytes()).collect()
}

/// Builds a `data?set=` query endpoint from `key:value` pairs.
fn set_query(pairs: &[String]) -> String {
    format!("data?set={}", pairs.join(","))
}

/// One enabled group with its slot privilege.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct GroupSlot {
    pub(super) distinguished_name: String,
    pub(super) privilege: u16,
}

/// Checks every group before anything is sent and assigns slot
/// privileges: 511 for `admin`, 497 for `user`.
///
/// Disabled groups and groups without a role are skipped.
pub(super) fn plan_groups(groups: &[LdapGroupConfig]) -> DriverResult<Vec<GroupSlot>> {
    let mut slots = Vec::new();
    for group in groups.iter().filter(|group| group.enable) {
        if group.role.trim().is_empty() {
            debug!(group = %group.group, "LDAP group without a role skipped");
            continue;
        }
        if group.group.trim().is_empty() {
            return Err(DriverError::validation(
                "LDAP group resource parameter \"group\" is required",
            ));
        }
        if group.group_base_dn.trim().is_empty() {
            return Err(DriverError::validation(
                "LDAP group resource parameter \"group_base_dn\" is required",
            ));
        }
        let privilege = match UserRole::try_from(group.role.as_str()) {
            Ok(UserRole::Admin) => 511,
            Ok(UserRole::User) => 497,
            Err(err) => return Err(DriverError::validation(err.to_string())),
        };
        slots.push(GroupSlot {
            distinguished_name: format!("{},{}", group.group, group.group_base_dn),
            privilege,
        });
    }
    if slots.len() > MAX_LDAP_GROUPS {
        return Err(DriverError::validation(format!(
            "at most {MAX_LDAP_GROUPS} LDAP role groups are supported, {} declared",
            slots.len()
        )));
    }
    Ok(slots)
}

/// Builds the `postset?ldapconf` form body. Slots past the last group get
/// privilege 0.
pub(super) fn ldap_conf_payload(ldap: &LdapConfig, port: u16, slots: &[GroupSlot]) -> String {
    let bind_dn = ldap.bind_dn.as_deref().map(escape_ldap).unwrap_or_default();
    let mut pairs = vec![
        "LDAPEnableMode:3".to_owned(),
        "xGLNameSearchEnabled:0".to_owned(),
        format!("xGLBaseDN:{}", escape_ldap(&ldap.base_dn)),
        format!("xGLUserLogin:{}", ldap.user_attribute),
        format!("xGLGroupMem:{}", ldap.group_attribute),
        format!("xGLBindDN:{bind_dn}"),
        "xGLCertValidationEnabled:0".to_owned(),
    ];
    for index in 1..=MAX_LDAP_GROUPS {
        let privilege = slots.get(index - 1).map_or(0, |slot| slot.privilege);
        pairs.push(format!("xGLGroup{index}Priv:{privilege}"));
    }
    pairs.push(format!("xGLServerPort:{port}"));
    format!("data={}", pairs.join(","))
}

/// Builds the network switch form body.
pub(super) fn network_payload(config: &NetworkConfig) -> String {
    format!(
        "dhcpForDNSDomain:{},ipmiLAN:{},serialOverLanEnabled:{},serialOverLanBaud:3,\
         serialOverLanPriv:0,racRedirectEna:{},racEscKey:^\\\\",
        u8::from(config.dns_from_dhcp),
        u8::from(config.ipmi_enable),
        u8::from(config.sol_enable),
        u8::from(config.sol_enable),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SyslogGroup<'a> {
    port: String,
    server1: &'a str,
    server2: &'a str,
    server3: &'a str,
    enable: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
struct CertStoreReply {
    #[serde(rename = "File")]
    file: StoredFile,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredFile {
    #[serde(rename = "ResourceURI")]
    resource_uri: String,
}

#[async_trait]
impl ResourceConfigurator for Idrac8 {
    async fn configure_users(
        &self,
        ctx: &OperationContext,
        users: &[UserConfig],
    ) -> DriverResult<UserReconciliation> {
        self.reconcile_users(ctx, users).await
    }

    /// Sets the syslog target, then enables alerts and routes every alert
    /// category to syslog. The controller sends nothing over syslog
    /// without the last two steps.
    async fn configure_syslog(
        &self,
        ctx: &OperationContext,
        config: &SyslogConfig,
    ) -> DriverResult<()> {
        config.validate()?;
        let group = SyslogGroup {
            port: config.effective_port().to_string(),
            server1: &config.server,
            server2: "",
            server3: "",
            enable: if config.enable { "Enabled" } else { "Disabled" },
        };
        let body = HttpBody::Json(json!({ "iDRAC.SysLog": group }));
        self.call(ctx, HttpRequest::put(SYSLOG, body), OK)
            .await
            .map_err(|err| err.in_step("syslog settings"))?;
        self.call(ctx, HttpRequest::post("data?set=alertStatus:1", HttpBody::Empty), OK)
            .await
            .map_err(|err| err.in_step("enable alerts"))?;
        let filters = format!("data?set={ALERT_FILTERS}");
        self.call(ctx, HttpRequest::post(filters, HttpBody::Empty), OK)
            .await
            .map_err(|err| err.in_step("alert filters"))?;
        debug!(host = %self.credentials.host, "syslog parameters applied");
        Ok(())
    }

    async fn configure_ntp(&self, ctx: &OperationContext, config: &NtpConfig) -> DriverResult<()> {
        config.validate()?;
        let timezone = set_query(&[format!("tm_tz_str_zone:{}", config.timezone)]);
        self.call(ctx, HttpRequest::get(timezone), OK)
            .await
            .map_err(|err| err.in_step("timezone"))?;
        let servers = set_query(&[
            format!("tm_ntp_int_opmode:{}", u8::from(config.enable)),
            format!("tm_ntp_str_server1:{}", config.server1),
            format!("tm_ntp_str_server2:{}", config.server2),
            format!("tm_ntp_str_server3:{}", config.server3),
        ]);
        self.call(ctx, HttpRequest::get(servers), OK)
            .await
            .map_err(|err| err.in_step("ntp servers"))?;
        debug!(host = %self.credentials.host, "NTP parameters applied");
        Ok(())
    }

    async fn configure_ldap(&self, ctx: &OperationContext, config: &LdapConfig) -> DriverResult<()> {
        config.validate_server()?;
        let server = set_query(&[format!("xGLServer:{}", config.server)]);
        self.call(ctx, HttpRequest::get(server), OK)
            .await
            .map_err(|err| err.in_step("ldap server"))?;
        let filter = set_query(&[format!(
            "xGLSearchFilter:{}",
            escape_ldap(&config.search_filter)
        )]);
        self.call(ctx, HttpRequest::get(filter), OK)
            .await
            .map_err(|err| err.in_step("ldap search filter"))?;
        debug!(host = %self.credentials.host, "LDAP server parameters applied");
        Ok(())
    }

    async fn configure_ldap_groups(
        &self,
        ctx: &OperationContext,
        groups: &[LdapGroupConfig],
        ldap: &LdapConfig,
    ) -> DriverResult<()> {
        let port = ldap.validate_group_mapping()?;
        let slots = plan_groups(groups)?;
        for (index, slot) in (1..).zip(&slots) {
            let endpoint = set_query(&[format!(
                "xGLGroup{index}Name:{}",
                escape_ldap(&slot.distinguished_name)
            )]);
            self.call(ctx, HttpRequest::get(endpoint), OK)
                .await
                .map_err(|err| err.in_step(format!("ldap group {index}")))?;
        }
        let payload = ldap_conf_payload(ldap, port, &slots);
        self.call(ctx, HttpRequest::post(LDAP_CONF, HttpBody::Form(payload)), OK)
            .await
            .map_err(|err| err.in_step("ldap role privileges"))?;
        debug!(
            host = %self.credentials.host,
            groups = slots.len(),
            "LDAP group privileges applied"
        );
        Ok(())
    }

    async fn configure_network(
        &self,
        ctx: &OperationContext,
        config: &NetworkConfig,
    ) -> DriverResult<bool> {
        let body = HttpBody::Form(network_payload(config));
        self.call(ctx, HttpRequest::post(NETWORK, body), OK).await?;
        debug!(host = %self.credentials.host, "network parameters applied");
        Ok(false)
    }

    /// Uploads the certificate to the transient file store, then installs
    /// the stored file. Returns `true`: the web server restarts to pick the
    /// certificate up.
    async fn upload_https_cert(
        &self,
        ctx: &OperationContext,
        certificate: &HttpsCertificate,
    ) -> DriverResult<bool> {
        const UPLOAD: &str = "upload certificate";
        const INSTALL: &str = "install certificate";

        certificate.validate()?;
        let st1 = self.st1().await?;
        let form = MultipartForm::default()
            .text("caller", "")
            .text("pageCode", "")
            .text("pageId", "2")
            .text("pageName", "")
            .text("index", "8")
            .text("CertType", "2")
            .file(MultipartFile {
                field: "serverSSLCertificate".to_owned(),
                file_name: certificate.file_name.clone(),
                content_type: "application/octet-stream".to_owned(),
                data: certificate.data.clone(),
            });
        let endpoint = format!("{CERT_STORE}&ST1={st1}");
        let stored = self
            .call(ctx, HttpRequest::post(endpoint, HttpBody::Multipart(form)), CREATED)
            .await
            .map_err(|err| err.in_step(UPLOAD))?;
        let reply: CertStoreReply = stored.json().map_err(|err| {
            DriverError::Protocol(format!("file store reply: {err}")).in_step(UPLOAD)
        })?;
        let locator = serde_json::to_value(&reply.file).map_err(|err| {
            DriverError::Protocol(format!("resource locator: {err}")).in_step(INSTALL)
        })?;
        self.call(ctx, HttpRequest::post(CERT_INSTALL, HttpBody::Json(locator)), CREATED)
            .await
            .map_err(|err| err.in_step(INSTALL))?;
        debug!(host = %self.credentials.host, "HTTPS certificate installed");
        Ok(true)
    }

    async fn generate_csr(
        &self,
        ctx: &OperationContext,
        subject: &HttpsCertAttributes,
    ) -> DriverResult<Bytes> {
        subject.validate()?;
        let response = self
            .call(ctx, HttpRequest::get(csr_endpoint(subject)), OK)
            .await
            .map_err(|err| err.in_step("generate csr"))?;
        debug!(host = %self.credentials.host, "certificate signing request generated");
        Ok(response.body)
    }
}
