use anyhow::Result;
use std::fmt;

/// The record kinds that take part in a synthesis pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Instance,
    Listen,
    Frontend,
    Backend,
    Resolver,
}

/// Identifies one record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub kind: Kind,
    pub namespace: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The record was used in a successful pass.
    Active,
    Error,
}

/// Publishes the outcome of a synthesis pass on the records involved.
#[async_trait::async_trait]
pub trait StatusReporter {
    /// `message` is empty unless `phase` is [`Phase::Error`].
    async fn set_status(&self, record: &RecordRef, phase: Phase, message: &str) -> Result<()>;
}

// === impl Kind ===

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instance => "Instance",
            Self::Listen => "Listen",
            Self::Frontend => "Frontend",
            Self::Backend => "Backend",
            Self::Resolver => "Resolver",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl RecordRef ===

impl RecordRef {
    pub fn new(kind: Kind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}
