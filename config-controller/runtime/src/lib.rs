#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use haproxy_config_controller_core as core;
pub use haproxy_config_controller_k8s_api as k8s;
pub use haproxy_config_controller_k8s_status as status;
pub use haproxy_config_controller_k8s_synth as synth;

mod args;
mod controller;
mod output;

pub use self::args::Args;
