use anyhow::Result;
use std::fmt;

/// The kind of object a [`StoreRef`] points into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKind {
    ConfigMap,
    Secret,
}

/// Addresses a single key of a ConfigMap or Secret.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreRef {
    pub kind: StoreKind,
    pub namespace: String,
    pub name: String,
    pub key: String,
}

/// Reads values referenced by configuration records.
///
/// Lookups are never cached by callers, so rotated values are picked up on
/// the next synthesis pass.
#[async_trait::async_trait]
pub trait KeyValueStore {
    /// Returns `Ok(None)` when the object exists but does not hold `key`.
    /// A missing object or a failed request is an error.
    async fn get(&self, reference: &StoreRef) -> Result<Option<Vec<u8>>>;
}

// === impl StoreKind ===

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigMap => f.write_str("configmap"),
            Self::Secret => f.write_str("secret"),
        }
    }
}

// === impl StoreRef ===

impl StoreRef {
    pub fn config_map(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            kind: StoreKind::ConfigMap,
            namespace: namespace.into(),
            name: name.into(),
            key: key.into(),
        }
    }

    pub fn secret(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            kind: StoreKind::Secret,
            namespace: namespace.into(),
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Formats the referenced object as `namespace/name`.
impl fmt::Display for StoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
