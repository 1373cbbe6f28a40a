use anyhow::{Context, Result};
use haproxy_config_controller_core::{KeyValueStore, StoreKind, StoreRef};
use haproxy_config_controller_k8s_api::{self as k8s, ConfigMap, Secret};

/// Reads ConfigMap and Secret keys through the API server. Nothing is
/// cached, so every pass sees the current values.
#[derive(Clone)]
pub struct KubeStore {
    client: k8s::Client,
}

// === impl KubeStore ===

impl KubeStore {
    pub fn new(client: k8s::Client) -> Self {
        Self { client }
    }

    async fn config_map(&self, reference: &StoreRef) -> Result<Option<Vec<u8>>> {
        let api = k8s::Api::<ConfigMap>::namespaced(self.client.clone(), &reference.namespace);
        let config_map = api
            .get_opt(&reference.name)
            .await
            .with_context(|| format!("failed to get configmap {reference}"))?
            .with_context(|| format!("configmap {reference} not found"))?;
        Ok(config_map_value(&config_map, &reference.key))
    }

    async fn secret(&self, reference: &StoreRef) -> Result<Option<Vec<u8>>> {
        let api = k8s::Api::<Secret>::namespaced(self.client.clone(), &reference.namespace);
        let secret = api
            .get_opt(&reference.name)
            .await
            .with_context(|| format!("failed to get secret {reference}"))?
            .with_context(|| format!("secret {reference} not found"))?;
        Ok(secret_value(&secret, &reference.key))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for KubeStore {
    async fn get(&self, reference: &StoreRef) -> Result<Option<Vec<u8>>> {
        tracing::trace!(%reference, key = %reference.key, kind = %reference.kind, "Reading value");
        match reference.kind {
            StoreKind::ConfigMap => self.config_map(reference).await,
            StoreKind::Secret => self.secret(reference).await,
        }
    }
}

/// Text data wins over binary data holding the same key.
fn config_map_value(config_map: &ConfigMap, key: &str) -> Option<Vec<u8>> {
    if let Some(value) = config_map.data.as_ref().and_then(|data| data.get(key)) {
        return Some(value.clone().into_bytes());
    }
    config_map
        .binary_data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|value| value.0.clone())
}

fn secret_value(secret: &Secret, key: &str) -> Option<Vec<u8>> {
    secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|value| value.0.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::ByteString;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn reads_config_map_keys() {
        let config_map = ConfigMap {
            data: Some(BTreeMap::from([("503".to_string(), "down".to_string())])),
            binary_data: Some(BTreeMap::from([
                ("503".to_string(), ByteString(b"ignored".to_vec())),
                ("logo".to_string(), ByteString(vec![0xff, 0x00])),
            ])),
            ..ConfigMap::default()
        };

        assert_eq!(config_map_value(&config_map, "503"), Some(b"down".to_vec()));
        assert_eq!(config_map_value(&config_map, "logo"), Some(vec![0xff, 0x00]));
        assert_eq!(config_map_value(&config_map, "missing"), None);
        assert_eq!(config_map_value(&ConfigMap::default(), "503"), None);
    }

    #[test]
    fn reads_secret_keys() {
        let secret = Secret {
            data: Some(BTreeMap::from([(
                "tls.crt".to_string(),
                ByteString(b"pem\n".to_vec()),
            )])),
            ..Secret::default()
        };

        assert_eq!(secret_value(&secret, "tls.crt"), Some(b"pem\n".to_vec()));
        assert_eq!(secret_value(&secret, "tls.key"), None);
    }
}
