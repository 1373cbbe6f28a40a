#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod config;
pub mod duration;
pub mod labels;
pub mod proxy;


pub use self::{duration::K8sDuration, labels::Selector};
pub use k8s_openapi::{
    api::core::v1::{ConfigMap, Secret},
    NamespaceResourceScope,
};
pub use kube::{
    api::{Api, ListParams, ObjectMeta, Patch, PatchParams, ResourceExt},
    Client, Resource,
};
