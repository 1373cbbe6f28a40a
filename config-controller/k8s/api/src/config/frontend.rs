use super::common::{BaseSpec, Bind, LocalObjectReference, Rule, Status};
use crate::labels::Selector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Describes a frontend section: where the proxy listens and how requests are
/// dispatched to backends.
#[derive(Clone, Debug, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "config.haproxy.com",
    version = "v1alpha1",
    kind = "Frontend",
    status = "Status",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct FrontendSpec {
    #[serde(flatten)]
    pub base: BaseSpec,
    #[serde(default)]
    pub binds: Vec<Bind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backend_switching: Vec<BackendSwitchingRule>,
    pub default_backend: LocalObjectReference,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackendSwitchingRule {
    #[serde(flatten)]
    pub rule: Rule,
    pub backend: BackendReference,
}

/// Either a static backend name or a regex mapping resolved at request time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackendReference {
    pub name: Option<String>,
    pub regex_mapping: Option<RegexBackendMapping>,
}

/// Maps a fetched request parameter onto the `Backend`s matched by
/// `selector`, using each backend's `hostRegex`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct RegexBackendMapping {
    pub name: String,
    pub parameter: String,
    #[serde(default)]
    pub selector: Selector,
}
