use crate::{
    config::common::{ErrorFile, SslCertificate},
    duration::K8sDuration,
    labels::Selector,
};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Describes one proxy fleet and the process-wide part of its
/// configuration.
///
/// Only the fields that feed the configuration file are modeled here;
/// workload and network settings of the resource are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "proxy.haproxy.com",
    version = "v1alpha1",
    kind = "Instance",
    status = "InstanceStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    #[serde(default)]
    pub configuration: Configuration,
    pub metrics: Option<Metrics>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Metrics {
    pub enabled: bool,
    /// Defaults to `0.0.0.0`.
    pub address: Option<String>,
    pub port: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Configuration {
    #[serde(default)]
    pub global: GlobalConfiguration,
    #[serde(default)]
    pub defaults: DefaultsConfiguration,
    /// Selects the configuration records that belong to this instance.
    #[serde(default)]
    pub selector: Selector,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfiguration {
    /// Exposes the admin socket so the proxy can be reloaded seamlessly.
    #[serde(default)]
    pub reload: bool,
    pub stats_timeout: Option<K8sDuration>,
    pub logging: Option<GlobalLoggingConfiguration>,
    /// Raw lines appended to the `global` section.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub additional_parameters: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_certificates: Vec<SslCertificate>,
    pub maxconn: Option<i64>,
    pub nbthread: Option<i64>,
    pub tune: Option<GlobalTuneOptions>,
    pub ssl: Option<GlobalSsl>,
    pub hard_stop_after: Option<K8sDuration>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSsl {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_bind_ciphers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_bind_cipher_suites: Vec<String>,
    pub default_bind_options: Option<GlobalSslDefaultBindOptions>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSslDefaultBindOptions {
    pub min_version: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GlobalTuneOptions {
    pub maxrewrite: Option<i64>,
    pub bufsize: Option<i64>,
    pub ssl: Option<GlobalSslTuneOptions>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSslTuneOptions {
    pub cache_size: Option<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keylog: String,
    pub lifetime: Option<K8sDuration>,
    #[serde(default)]
    pub force_private_cache: bool,
    pub max_record: Option<i64>,
    #[serde(default, rename = "defaultDHParam")]
    pub default_dh_param: i64,
    #[serde(default)]
    pub ctx_cache_size: i64,
    pub capture_buffer_size: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalLoggingConfiguration {
    pub enabled: bool,
    /// An IP address or a path to a local syslog socket.
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub facility: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub level: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    pub send_hostname: Option<bool>,
    pub hostname: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsConfiguration {
    #[serde(default)]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_files: Vec<ErrorFile>,
    #[serde(default)]
    pub timeouts: BTreeMap<String, K8sDuration>,
    pub logging: Option<DefaultsLoggingConfiguration>,
    /// Raw lines appended to the `defaults` section.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub additional_parameters: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsLoggingConfiguration {
    pub enabled: bool,
    pub http_log: Option<bool>,
    pub tcp_log: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct InstanceStatus {
    pub phase: InstancePhase,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum InstancePhase {
    Running,
    #[default]
    Pending,
    Error,
}
