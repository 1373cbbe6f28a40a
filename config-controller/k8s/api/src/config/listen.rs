use super::common::{
    Balance, BaseSpec, Bind, CertificateListElement, Cookie, HashType, HttpChk, Server,
    ServerTemplate, Status,
};
use crate::duration::K8sDuration;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A frontend and a backend sharing one name. The frontend always forwards
/// to its own backend.
#[derive(Clone, Debug, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "config.haproxy.com",
    version = "v1alpha1",
    kind = "Listen",
    status = "Status",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ListenSpec {
    #[serde(flatten)]
    pub base: BaseSpec,
    #[serde(default)]
    pub binds: Vec<Bind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_templates: Vec<ServerTemplate>,
    pub check_timeout: Option<K8sDuration>,
    pub balance: Option<Balance>,
    pub redispatch: Option<bool>,
    pub hash_type: Option<HashType>,
    pub cookie: Option<Cookie>,
    /// Added to the certificate list of every bind that has one.
    pub host_certificate: Option<CertificateListElement>,
    pub http_check: Option<HttpChk>,
    pub tcp_check: Option<bool>,
}
