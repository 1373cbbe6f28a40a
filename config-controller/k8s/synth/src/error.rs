use haproxy_config_controller_core::{Kind, RecordRef, StoreRef, ValidationError};

/// A record that could not be normalized.
#[derive(Debug, thiserror::Error)]
#[error("{record}: {source}")]
pub struct MappingError {
    pub record: RecordRef,
    #[source]
    pub source: ValidationError,
}

/// Why a synthesis pass was aborted. No artifacts are produced for a pass
/// that fails.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("name {name} already used by resource of kind {existing}")]
    NameCollision {
        record: RecordRef,
        name: String,
        existing: Kind,
    },

    #[error("{record}: {source}")]
    Lookup {
        record: RecordRef,
        #[source]
        source: LookupError,
    },

    #[error("{record}: {message}")]
    SideFile { record: RecordRef, message: String },

    #[error("synthesis cancelled")]
    Cancelled,
}

/// A value referenced by a record could not be read.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("key {key} not found in {what} {kind}: {reference}", key = .reference.key, kind = .reference.kind)]
    Missing {
        what: &'static str,
        reference: StoreRef,
    },

    #[error("failed to read {kind} {reference}", kind = .reference.kind)]
    Failed {
        reference: StoreRef,
        #[source]
        source: anyhow::Error,
    },
}

// === impl SynthesisError ===

impl SynthesisError {
    /// The record the failure is reported on, besides the instance.
    pub fn record(&self) -> Option<&RecordRef> {
        match self {
            Self::Mapping(e) => Some(&e.record),
            Self::NameCollision { record, .. }
            | Self::Lookup { record, .. }
            | Self::SideFile { record, .. } => Some(record),
            Self::Cancelled => None,
        }
    }

    /// The message written to a record's status. The record is identified by
    /// the status itself, so it is not repeated.
    pub fn status_message(&self) -> String {
        match self {
            Self::Mapping(e) => e.source.to_string(),
            Self::Lookup { source, .. } => source.to_string(),
            Self::SideFile { message, .. } => message.clone(),
            Self::NameCollision { .. } | Self::Cancelled => self.to_string(),
        }
    }

    pub(crate) fn result_label(&self) -> &'static str {
        match self {
            Self::Mapping(_) | Self::SideFile { .. } => "validation",
            Self::NameCollision { .. } => "collision",
            Self::Lookup { .. } => "lookup",
            Self::Cancelled => "cancelled",
        }
    }
}
