pub mod instance;

pub use self::instance::{Instance, InstancePhase, InstanceSpec, InstanceStatus};

/// The API group of the fleet instance descriptor.
pub const GROUP: &str = "proxy.haproxy.com";
