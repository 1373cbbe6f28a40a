use super::ValidationError;
use std::collections::BTreeMap;

/// Selects the timeout allow-list of a section kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeoutScope {
    Frontend,
    Backend,
    /// Both halves of a `Listen`.
    Listen,
    Defaults,
}

const FRONTEND: &[&str] = &["client", "http-keep-alive", "http-request"];

const BACKEND: &[&str] = &[
    "check",
    "connect",
    "http-keep-alive",
    "http-request",
    "queue",
    "server",
    "tunnel",
];

const LISTEN: &[&str] = &[
    "check",
    "client",
    "connect",
    "http-keep-alive",
    "http-request",
    "queue",
    "server",
    "tunnel",
];

const DEFAULTS: &[&str] = &[
    "check",
    "client",
    "client-fin",
    "connect",
    "http-keep-alive",
    "http-request",
    "queue",
    "server",
    "server-fin",
    "tunnel",
];

/// Timeouts in milliseconds, keyed by HAProxy timeout name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeouts {
    scope: TimeoutScope,
    values: BTreeMap<&'static str, u64>,
}

// === impl TimeoutScope ===

impl TimeoutScope {
    /// The accepted timeout names, in emission order.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Self::Frontend => FRONTEND,
            Self::Backend => BACKEND,
            Self::Listen => LISTEN,
            Self::Defaults => DEFAULTS,
        }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        self.keys().iter().copied().find(|k| *k == key)
    }
}

// === impl Timeouts ===

impl Timeouts {
    pub fn new(scope: TimeoutScope) -> Self {
        Self {
            scope,
            values: BTreeMap::new(),
        }
    }

    pub fn scope(&self) -> TimeoutScope {
        self.scope
    }

    /// Sets a timeout, replacing any previous value for `key`.
    pub fn insert(&mut self, key: &str, millis: u64) -> Result<(), ValidationError> {
        let key = self
            .scope
            .lookup(key)
            .ok_or_else(|| ValidationError::UnknownTimeout(key.to_string()))?;
        self.values.insert(key, millis);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the set timeouts in allow-list order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.scope
            .keys()
            .iter()
            .filter_map(move |k| self.values.get(k).map(|v| (*k, *v)))
    }

    /// Keeps only the timeouts `scope` accepts.
    pub fn project(&self, scope: TimeoutScope) -> Self {
        let values = self
            .values
            .iter()
            .filter_map(|(k, v)| scope.lookup(k).map(|k| (k, *v)))
            .collect();
        Self { scope, values }
    }
}
