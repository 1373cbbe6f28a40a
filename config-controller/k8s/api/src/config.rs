pub mod backend;
pub mod common;
pub mod frontend;
pub mod listen;
pub mod resolver;

pub use self::{
    backend::{Backend, BackendSpec},
    common::{BaseSpec, Status, StatusPhase},
    frontend::{Frontend, FrontendSpec},
    listen::{Listen, ListenSpec},
    resolver::{Resolver, ResolverSpec},
};

/// The API group shared by all proxy configuration records.
pub const GROUP: &str = "config.haproxy.com";
