use super::common::{
    Balance, BaseSpec, CertificateListElement, Cookie, HashType, HttpChk, Server,
    ServerTemplate, Status,
};
use crate::duration::K8sDuration;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Describes a pool of upstream servers.
#[derive(Clone, Debug, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "config.haproxy.com",
    version = "v1alpha1",
    kind = "Backend",
    status = "Status",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct BackendSpec {
    #[serde(flatten)]
    pub base: BaseSpec,
    pub check_timeout: Option<K8sDuration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_templates: Vec<ServerTemplate>,
    pub balance: Option<Balance>,
    /// The host pattern used when a frontend maps requests onto this
    /// backend by regex.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host_regex: String,
    /// Served by every frontend whose certificate list selects this backend.
    pub host_certificate: Option<CertificateListElement>,
    pub redispatch: Option<bool>,
    pub hash_type: Option<HashType>,
    pub cookie: Option<Cookie>,
    #[serde(rename = "httpchk")]
    pub http_chk: Option<HttpChk>,
    pub tcp_check: Option<bool>,
}
