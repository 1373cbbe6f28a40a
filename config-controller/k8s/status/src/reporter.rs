use anyhow::{Context, Result};
use haproxy_config_controller_core::{Kind, Phase, RecordRef, StatusReporter};
use haproxy_config_controller_k8s_api::{
    self as k8s,
    config::{self, Backend, Frontend, Listen, Resolver},
    proxy::{self, Instance},
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

const CONFIG_API_VERSION: &str = "config.haproxy.com/v1alpha1";
const PROXY_API_VERSION: &str = "proxy.haproxy.com/v1alpha1";

/// Writes synthesis outcomes to the `status` subresource of each record.
#[derive(Clone)]
pub struct KubeStatusReporter {
    client: k8s::Client,
}

// === impl KubeStatusReporter ===

impl KubeStatusReporter {
    pub fn new(client: k8s::Client) -> Self {
        Self { client }
    }

    async fn patch<K>(&self, record: &RecordRef, patch: k8s::Patch<serde_json::Value>) -> Result<()>
    where
        K: k8s::Resource<Scope = k8s::NamespaceResourceScope, DynamicType = ()>
            + Clone
            + Debug
            + DeserializeOwned,
    {
        let api = k8s::Api::<K>::namespaced(self.client.clone(), &record.namespace);
        api.patch_status(&record.name, &k8s::PatchParams::default(), &patch)
            .await
            .with_context(|| format!("failed to patch status of {record}"))?;
        tracing::debug!(%record, "Patched status");
        Ok(())
    }
}

#[async_trait::async_trait]
impl StatusReporter for KubeStatusReporter {
    async fn set_status(&self, record: &RecordRef, phase: Phase, message: &str) -> Result<()> {
        let patch = make_patch(record, phase, message);
        match record.kind {
            Kind::Instance => self.patch::<Instance>(record, patch).await,
            Kind::Listen => self.patch::<Listen>(record, patch).await,
            Kind::Frontend => self.patch::<Frontend>(record, patch).await,
            Kind::Backend => self.patch::<Backend>(record, patch).await,
            Kind::Resolver => self.patch::<Resolver>(record, patch).await,
        }
    }
}

/// Builds a merge patch for a record's status. An empty message removes a
/// previously reported error.
pub(crate) fn make_patch(
    record: &RecordRef,
    phase: Phase,
    message: &str,
) -> k8s::Patch<serde_json::Value> {
    let (api_version, phase) = match record.kind {
        Kind::Instance => (
            PROXY_API_VERSION,
            serde_json::json!(match phase {
                Phase::Active => proxy::InstancePhase::Running,
                Phase::Error => proxy::InstancePhase::Error,
            }),
        ),
        _ => (
            CONFIG_API_VERSION,
            serde_json::json!(match phase {
                Phase::Active => config::StatusPhase::Active,
                Phase::Error => config::StatusPhase::Error,
            }),
        ),
    };
    let error = if message.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::Value::from(message)
    };

    let value = serde_json::json!({
        "apiVersion": api_version,
        "kind": record.kind.as_str(),
        "name": record.name,
        "status": {
            "phase": phase,
            "error": error,
        },
    });
    k8s::Patch::Merge(value)
}
