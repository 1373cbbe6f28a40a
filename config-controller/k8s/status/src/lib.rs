//! Kubernetes-backed collaborators of the synthesizer: a value store reading
//! ConfigMaps and Secrets, and a status reporter patching record statuses.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod reporter;
mod store;

pub use self::{reporter::KubeStatusReporter, store::KubeStore};
