use crate::{duration::K8sDuration, labels::Selector};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings shared by every proxy section kind: `Frontend`, `Backend`, and
/// both halves of a `Listen`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseSpec {
    /// `http` or `tcp`.
    pub mode: Option<String>,
    pub http_request: Option<HttpRequestRules>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tcp_request: Vec<TcpRequestRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acl: Vec<Acl>,
    /// Timeouts by HAProxy timeout name. The accepted names depend on the
    /// section kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub timeouts: BTreeMap<String, K8sDuration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_files: Vec<ErrorFile>,
    pub forward_for: Option<Forwardfor>,
    pub http_pretend_keepalive: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// `if` or `unless`.
    pub condition_type: Option<String>,
    pub condition: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TcpRequestRule {
    #[serde(flatten)]
    pub rule: Rule,
    /// One of `connection`, `content`, `inspect-delay`, `session`.
    #[serde(rename = "type")]
    pub type_: String,
    pub action: Option<String>,
    pub timeout: Option<K8sDuration>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Acl {
    pub name: String,
    pub criterion: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFile {
    pub code: i64,
    pub file: StaticHttpFile,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaticHttpFile {
    pub name: String,
    pub value: Option<String>,
    #[serde(default)]
    pub value_from: ErrorFileValueFrom,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFileValueFrom {
    pub config_map_key_ref: Option<KeyRef>,
}

/// Selects a key of a ConfigMap or Secret in the instance's namespace.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct KeyRef {
    pub name: String,
    pub key: String,
}

/// Selects a key of a Secret in an explicit namespace.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ExternalKeyRef {
    pub namespace: String,
    pub name: String,
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct LocalObjectReference {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bind {
    #[serde(default)]
    pub name: String,
    pub address: Option<String>,
    pub port: i64,
    pub port_range_end: Option<i64>,
    #[serde(default)]
    pub transparent: bool,
    pub ssl: Option<Ssl>,
    pub ssl_certificate_list: Option<CertificateList>,
    /// Keeps the bind out of services and routes.
    pub hidden: Option<bool>,
    pub accept_proxy: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ssl {
    pub enabled: bool,
    pub min_version: Option<String>,
    /// `none`, `optional`, or `required`.
    pub verify: Option<String>,
    pub ca_certificate: Option<SslCertificate>,
    pub certificate: Option<SslCertificate>,
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
}

/// A PEM file either given inline or assembled from ConfigMap and Secret
/// keys.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SslCertificate {
    pub name: String,
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_from: Vec<SslCertificateValueFrom>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SslCertificateValueFrom {
    pub config_map_key_ref: Option<KeyRef>,
    pub secret_key_ref: Option<KeyRef>,
    pub secret_key_external_ref: Option<ExternalKeyRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateListElement {
    pub certificate: SslCertificate,
    pub sni_filter: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
    /// Enables automatic OCSP response updates for the certificate.
    #[serde(default)]
    pub ocsp: bool,
    pub ocsp_file: Option<OcspFile>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct OcspFile {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateList {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<CertificateListElement>,
    /// Adds the `hostCertificate` of every selected `Backend`.
    pub selector: Option<Selector>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerParams {
    pub ssl: Option<Ssl>,
    pub weight: Option<i64>,
    pub check: Option<Check>,
    pub init_addr: Option<String>,
    pub resolvers: Option<LocalObjectReference>,
    pub send_proxy: Option<bool>,
    #[serde(rename = "SendProxyV2")]
    pub send_proxy_v2: Option<ProxyProtocol>,
    pub verify_host: Option<String>,
    /// Assigns the server a persistence cookie value.
    #[serde(default)]
    pub cookie: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    #[serde(flatten)]
    pub params: ServerParams,
    pub name: String,
    pub address: String,
    pub port: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerTemplate {
    #[serde(flatten)]
    pub params: ServerParams,
    pub prefix: String,
    pub num_min: Option<i64>,
    pub num: i64,
    pub fqdn: String,
    pub port: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub enabled: bool,
    pub inter: Option<K8sDuration>,
    pub rise: Option<i64>,
    pub fall: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Balance {
    pub algorithm: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct HashType {
    pub method: Option<String>,
    pub function: Option<String>,
    pub modifier: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct HttpChk {
    pub uri: String,
    pub method: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestRules {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_header: Vec<HttpHeaderRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_path: Vec<HttpPathRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_header: Vec<HttpHeaderRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect: Vec<Redirect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replace_path: Vec<ReplacePath>,
    pub deny: Option<Deny>,
    pub deny_status: Option<i64>,
    #[serde(rename = "return")]
    pub return_: Option<HttpReturn>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpHeaderRule {
    #[serde(flatten)]
    pub rule: Rule,
    pub name: String,
    pub value: HttpHeaderValue,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct HttpHeaderValue {
    /// Renders the value as `${NAME}`, resolved from the proxy's environment.
    pub env: Option<EnvVar>,
    pub str: Option<String>,
    /// A `%s` format applied to the value.
    pub format: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub name: String,
    pub value: Option<String>,
    pub value_from: Option<EnvVarSource>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    pub secret_key_ref: Option<KeyRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct HttpPathRule {
    #[serde(flatten)]
    pub rule: Rule,
    #[serde(rename = "format")]
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplacePath {
    #[serde(flatten)]
    pub rule: Rule,
    pub match_regex: String,
    pub replace_fmt: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Deny {
    #[serde(flatten)]
    pub rule: Rule,
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Redirect {
    #[serde(flatten)]
    pub rule: Rule,
    pub code: Option<i64>,
    #[serde(default, rename = "type")]
    pub type_: RedirectType,
    #[serde(default)]
    pub value: String,
    pub option: Option<RedirectOption>,
}

/// Exactly one flag may be set. On the wire `insert` selects a prefix
/// redirect and `prefix` selects a scheme redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct RedirectType {
    #[serde(default)]
    pub location: bool,
    #[serde(default, rename = "insert")]
    pub prefix: bool,
    #[serde(default, rename = "prefix")]
    pub scheme: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedirectOption {
    #[serde(default)]
    pub drop_query: bool,
    #[serde(default)]
    pub append_slash: bool,
    #[serde(rename = "SetCookie")]
    pub set_cookie: Option<RedirectCookie>,
    #[serde(rename = "ClearCookie")]
    pub clear_cookie: Option<RedirectCookie>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct RedirectCookie {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct HttpReturn {
    pub status: Option<i64>,
    pub content: HttpReturnContent,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct HttpReturnContent {
    #[serde(rename = "type")]
    pub type_: String,
    pub format: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Forwardfor {
    pub enabled: bool,
    pub except: Option<String>,
    pub header: Option<String>,
    #[serde(default)]
    pub ifnone: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mode: CookieMode,
    pub indirect: Option<bool>,
    pub no_cache: Option<bool>,
    pub post_only: Option<bool>,
    pub preserve: Option<bool>,
    #[serde(rename = "httpOnly")]
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
    pub dynamic: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
    #[serde(default)]
    pub max_idle: i64,
    #[serde(default)]
    pub max_life: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct CookieMode {
    #[serde(default)]
    pub rewrite: bool,
    #[serde(default)]
    pub insert: bool,
    #[serde(default)]
    pub prefix: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ProxyProtocol {
    #[serde(default)]
    pub v1: bool,
    pub v2: Option<ProxyProtocolV2>,
    #[serde(default, rename = "v2SSL")]
    pub v2_ssl: bool,
    #[serde(default, rename = "v2SSLCN")]
    pub v2_ssl_cn: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ProxyProtocolV2 {
    #[serde(default)]
    pub enabled: bool,
    pub options: Option<ProxyProtocolV2Options>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProxyProtocolV2Options {
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub cert_cn: bool,
    #[serde(default)]
    pub ssl_cipher: bool,
    #[serde(default)]
    pub cert_sig: bool,
    #[serde(default)]
    pub cert_key: bool,
    #[serde(default)]
    pub authority: bool,
    #[serde(default, rename = "crc32C")]
    pub crc32c: bool,
    #[serde(default, rename = "uniqueID")]
    pub unique_id: bool,
}

/// Status reported on `Frontend`, `Backend`, `Listen`, and `Resolver`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub phase: StatusPhase,
    #[serde(default)]
    pub observed_generation: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum StatusPhase {
    #[default]
    Active,
    Error,
}
