use crate::{config_path, store::StoreRef};

/// Where the content of a side file comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueSource {
    /// Used verbatim.
    Inline(String),
    /// Looked up in order; each value is trimmed and the values are joined
    /// by newlines.
    Store(Vec<StoreRef>),
}

/// A PEM bundle written next to the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    pub name: String,
    pub source: ValueSource,
}

/// A static HTTP response body, as served by `errorfile`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticFile {
    pub name: String,
    /// A file without a source is referenced but not written.
    pub source: Option<ValueSource>,
}

impl Certificate {
    pub fn path(&self) -> String {
        config_path(&self.name, "crt")
    }
}

impl StaticFile {
    pub fn path(&self) -> String {
        config_path(&self.name, "http")
    }
}
