use super::common::Status;
use crate::duration::K8sDuration;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A `resolvers` section: DNS servers used for runtime name resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "config.haproxy.com",
    version = "v1alpha1",
    kind = "Resolver",
    status = "Status",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ResolverSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<Nameserver>,
    pub accepted_payload_size: Option<i64>,
    pub parse_resolv_conf: Option<bool>,
    /// Defaults to 3.
    pub resolve_retries: Option<i64>,
    pub hold: Option<Hold>,
    pub timeouts: Option<Timeouts>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Nameserver {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub port: i64,
}

/// How long the last resolution is kept for each response status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Hold {
    pub nx: Option<K8sDuration>,
    pub obsolete: Option<K8sDuration>,
    pub other: Option<K8sDuration>,
    pub refused: Option<K8sDuration>,
    pub timeout: Option<K8sDuration>,
    pub valid: Option<K8sDuration>,
}

/// Both timeouts default to one second.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Timeouts {
    pub resolve: Option<K8sDuration>,
    pub retry: Option<K8sDuration>,
}
