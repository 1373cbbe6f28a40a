//! The normalized configuration model.
//!
//! Records are validated once when they are converted into this model; the
//! mapper can then render any value of these types without failing. Option
//! groups that allow at most one selection are closed enums, so conflicting
//! selections cannot be represented.

mod instance;
mod rules;
mod section;
mod server;
mod source;
mod timeouts;

pub use self::{
    instance::{
        Defaults, Global, GlobalSsl, Hold, Instance, LogTarget, Metrics, Nameserver, Resolver,
        Tune,
    },
    rules::{
        Acl, Condition, ConditionKind, EnvValue, EnvVar, ErrorFile, HeaderSource, HeaderValue,
        HttpRequestRule, Redirect, RedirectCookie, RedirectKind, TcpRequestKind, TcpRequestRule,
        ERROR_FILE_CODES, MAX_LINE_ARGS,
    },
    section::{
        Backend, BackendSwitching, BackendTarget, Base, Bind, BindSsl, CertificateList,
        CertificateListElement, Cookie, CookieMode, ForwardFor, Frontend, HashType, HealthCheck,
        Listen, Ocsp, OcspFile, RegexMapping,
    },
    server::{
        Check, ProxyProtocol, ProxyV2Option, Server, ServerParams, ServerSsl, ServerTemplate,
        TemplateRange, Verify,
    },
    source::{Certificate, StaticFile, ValueSource},
    timeouts::{TimeoutScope, Timeouts},
};

use std::{fmt, str::FromStr};

/// Why a record cannot be converted into the model.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("timeout {0} unknown")]
    UnknownTimeout(String),

    #[error("{0} must not be negative")]
    NegativeDuration(String),

    #[error("you can only select one cookie mode")]
    CookieMode,

    #[error("you can only select one redirect type")]
    RedirectType,

    #[error("you can only select one proxy protocol")]
    ProxyProtocol,

    #[error("mode {0} unknown, expected http or tcp")]
    Mode(String),

    #[error("port {0} out of range 1-65535")]
    Port(i64),

    #[error("port range end {end} must be greater than port {port}")]
    PortRange { port: i64, end: i64 },

    #[error("weight {0} out of range 0-256")]
    Weight(i64),

    #[error("condition type {0} unknown, expected if or unless")]
    ConditionType(String),

    #[error("tcp-request type {0} unknown")]
    TcpRequestType(String),

    #[error("error file code {0} is not supported")]
    ErrorFileCode(i64),

    #[error("ssl verify {0} unknown, expected none, optional or required")]
    Verify(String),

    #[error("status code {0} out of range")]
    StatusCode(i64),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("backend reference must set exactly one of name and regexMapping")]
    BackendReference,

    #[error("{what} {name:?} must not contain '/', '..' or NUL")]
    FileName { what: &'static str, name: String },
}

/// The proxy mode of a section.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Http,
    Tcp,
}

// === impl Mode ===

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Tcp => "tcp",
        }
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "tcp" => Ok(Self::Tcp),
            _ => Err(ValidationError::Mode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
