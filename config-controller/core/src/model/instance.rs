use super::{Certificate, ErrorFile, Mode, Timeouts};

/// The process-wide part of one fleet instance's configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    pub namespace: String,
    pub global: Global,
    pub defaults: Defaults,
    pub metrics: Option<Metrics>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Global {
    pub maxconn: Option<i64>,
    pub nbthread: Option<i64>,
    /// Milliseconds.
    pub hard_stop_after: Option<u64>,
    /// Exposes the admin socket used for seamless reloads.
    pub reload: bool,
    /// Milliseconds.
    pub stats_timeout: Option<u64>,
    /// Only present when logging is enabled.
    pub log: Option<LogTarget>,
    /// `Some` enables `log-send-hostname`, with an optional hostname.
    pub send_hostname: Option<Option<String>>,
    pub ssl: Option<GlobalSsl>,
    pub tune: Option<Tune>,
    /// Raw lines appended to the section.
    pub additional_parameters: Vec<String>,
    pub additional_certificates: Vec<Certificate>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogTarget {
    pub address: String,
    pub facility: Option<String>,
    pub level: Option<String>,
    pub format: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalSsl {
    pub ciphers: Vec<String>,
    pub ciphersuites: Vec<String>,
    pub min_version: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tune {
    pub maxrewrite: Option<i64>,
    pub bufsize: Option<i64>,
    pub ssl_cachesize: Option<i64>,
    pub ssl_keylog: Option<String>,
    /// Seconds.
    pub ssl_lifetime: Option<u64>,
    pub ssl_force_private_cache: bool,
    pub ssl_maxrecord: Option<i64>,
    pub ssl_default_dh_param: Option<i64>,
    pub ssl_ctx_cache_size: Option<i64>,
    pub ssl_capture_buffer_size: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Defaults {
    pub mode: Option<Mode>,
    /// Logs to the targets of the global section.
    pub log_global: bool,
    pub http_log: bool,
    pub tcp_log: bool,
    pub timeouts: Timeouts,
    pub error_files: Vec<ErrorFile>,
    /// Raw lines appended to the section.
    pub additional_parameters: Vec<String>,
}

/// A frontend exposing statistics and a Prometheus endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metrics {
    pub address: String,
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolver {
    pub name: String,
    pub nameservers: Vec<Nameserver>,
    pub accepted_payload_size: Option<i64>,
    pub hold: Hold,
    /// Milliseconds.
    pub timeout_resolve: u64,
    /// Milliseconds.
    pub timeout_retry: u64,
    pub parse_resolv_conf: bool,
    pub resolve_retries: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nameserver {
    pub name: String,
    pub address: String,
    pub port: u16,
}

/// Milliseconds to keep the last answer for each response status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hold {
    pub nx: Option<u64>,
    pub obsolete: Option<u64>,
    pub other: Option<u64>,
    pub refused: Option<u64>,
    pub timeout: Option<u64>,
    pub valid: Option<u64>,
}

impl Resolver {
    pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
    pub const DEFAULT_RESOLVE_RETRIES: i64 = 3;
}

impl Metrics {
    pub const DEFAULT_ADDRESS: &'static str = "0.0.0.0";
}
