#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod artifact;
pub mod fragment;
mod hash;
pub mod mapper;
pub mod model;
pub mod status;
pub mod store;

pub use self::{
    artifact::ConfigArtifactSet,
    fragment::{Fragment, SectionKind},
    hash::md5_hex,
    model::ValidationError,
    status::{Kind, Phase, RecordRef, StatusReporter},
    store::{KeyValueStore, StoreKind, StoreRef},
};

/// The directory the proxy reads its configuration and side files from.
pub const CONFIG_DIR: &str = "/usr/local/etc/haproxy";

/// The name of the main configuration document in the artifact set.
pub const CONFIG_FILE: &str = "haproxy.cfg";

/// Formats the absolute path of a file in [`CONFIG_DIR`]. A trailing
/// `.{ext}` on `name` is not repeated.
pub fn config_path(name: &str, ext: &str) -> String {
    let name = name
        .strip_suffix(ext)
        .and_then(|n| n.strip_suffix('.'))
        .unwrap_or(name);
    format!("{CONFIG_DIR}/{name}.{ext}")
}
