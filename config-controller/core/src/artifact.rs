use crate::CONFIG_FILE;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// The output of one synthesis pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigArtifactSet {
    /// The configuration document.
    pub document: String,

    /// Side files by absolute path.
    pub files: BTreeMap<String, String>,

    /// Hex SHA-256 over the document and every side file.
    pub fingerprint: String,
}

impl ConfigArtifactSet {
    pub fn new(document: String, files: BTreeMap<String, String>) -> Self {
        let mut set = Self {
            document,
            files,
            fingerprint: String::new(),
        };
        let fingerprint = fingerprint(set.entries());
        set.fingerprint = fingerprint;
        set
    }

    /// Iterates over the document (as [`CONFIG_FILE`]) and all side files in
    /// path order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut entries = self
            .files
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_str()))
            .chain(Some((CONFIG_FILE, self.document.as_str())))
            .collect::<Vec<_>>();
        entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        entries.into_iter()
    }
}

/// Hashes `(path, content)` pairs in path order. Each field is terminated by a
/// NUL byte so that moving bytes between a path and its content changes the
/// digest.
fn fingerprint<'a>(entries: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut hasher = Sha256::new();
    for (path, content) in entries {
        hasher.update(path.as_bytes());
        hasher.update([0]);
        hasher.update(content.as_bytes());
        hasher.update([0]);
    }
    hex::encode(hasher.finalize())
}
