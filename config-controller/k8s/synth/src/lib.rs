//! Synthesizes the proxy configuration of one fleet instance.
//!
//! A pass normalizes the instance and every record that belongs to it,
//! renders the configuration document and derives the side files it refers
//! to. A pass either produces a complete [`ConfigArtifactSet`] or fails
//! without producing anything; failures are written to the status of the
//! offending record and of the instance.
//!
//! [`ConfigArtifactSet`]: haproxy_config_controller_core::ConfigArtifactSet

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod assemble;
mod error;
mod metrics;
pub mod normalize;
mod sidefiles;
mod synthesizer;


pub use self::{
    error::{LookupError, MappingError, SynthesisError},
    metrics::SynthesisMetrics,
    synthesizer::Synthesizer,
};
pub use tokio_util::sync::CancellationToken;

use haproxy_config_controller_k8s_api::config::{Backend, Frontend, Listen, Resolver};

/// The records selected by an instance, in any order.
#[derive(Clone, Debug, Default)]
pub struct Records {
    pub listens: Vec<Listen>,
    pub frontends: Vec<Frontend>,
    pub backends: Vec<Backend>,
    pub resolvers: Vec<Resolver>,
}
