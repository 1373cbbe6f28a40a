use super::{
    Acl, Certificate, Condition, ErrorFile, HttpRequestRule, Mode, Server, ServerTemplate,
    TcpRequestRule, TimeoutScope, Timeouts, Verify,
};
use crate::config_path;
use haproxy_config_controller_k8s_api::labels::Selector;

/// Settings shared by frontend and backend sections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Base {
    pub mode: Option<Mode>,
    pub forward_for: Option<ForwardFor>,
    pub http_pretend_keepalive: bool,
    pub timeouts: Timeouts,
    pub acls: Vec<Acl>,
    pub tcp_request: Vec<TcpRequestRule>,
    pub http_request: Vec<HttpRequestRule>,
    pub error_files: Vec<ErrorFile>,
}

/// `option forwardfor`. Only present when enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardFor {
    pub except: Option<String>,
    pub header: Option<String>,
    pub if_none: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bind {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub port_range_end: Option<u16>,
    pub transparent: bool,
    pub accept_proxy: bool,
    pub ssl: Option<BindSsl>,
    pub certificate_list: Option<CertificateList>,
}

/// TLS termination on a bind. Only present when enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindSsl {
    pub certificate: Option<Certificate>,
    pub ca_certificate: Option<Certificate>,
    pub verify: Option<Verify>,
    pub min_version: Option<String>,
}

/// A `crt-list` file: certificates selected by SNI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateList {
    pub name: String,
    pub elements: Vec<CertificateListElement>,
    /// Adds the host certificate of every matching backend.
    pub selector: Option<Selector>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateListElement {
    pub certificate: Certificate,
    pub sni_filter: String,
    pub alpn: Vec<String>,
    pub ocsp: Ocsp,
}

/// OCSP stapling of a certificate list element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Ocsp {
    #[default]
    Off,
    /// The proxy fetches and refreshes responses itself.
    Update,
    /// As `Update`, seeded with a response written next to the certificate.
    UpdateWithFile(OcspFile),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OcspFile {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frontend {
    pub name: String,
    pub base: Base,
    pub binds: Vec<Bind>,
    pub backend_switching: Vec<BackendSwitching>,
    pub default_backend: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendSwitching {
    pub target: BackendTarget,
    pub condition: Option<Condition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendTarget {
    Name(String),
    RegexMap(RegexMapping),
}

/// Routes on a fetched parameter matched against the host patterns of the
/// selected backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegexMapping {
    pub name: String,
    pub parameter: String,
    pub selector: Selector,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backend {
    pub name: String,
    pub base: Base,
    pub servers: Vec<Server>,
    pub server_templates: Vec<ServerTemplate>,
    /// Lowercase algorithm name.
    pub balance: Option<String>,
    pub hash_type: Option<HashType>,
    pub redispatch: bool,
    pub cookie: Option<Cookie>,
    pub health_check: Option<HealthCheck>,
    pub host_regex: Option<String>,
    pub host_certificate: Option<CertificateListElement>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HashType {
    pub method: Option<String>,
    pub function: Option<String>,
    pub modifier: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HealthCheck {
    Http { method: String, uri: String },
    Tcp,
}

/// Cookie based persistence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cookie {
    /// The declared name. The proxy only ever sees its digest.
    pub name: String,
    pub mode: Option<CookieMode>,
    pub domains: Vec<String>,
    pub attributes: Vec<String>,
    pub http_only: bool,
    pub indirect: bool,
    pub max_idle: i64,
    pub max_life: i64,
    pub no_cache: bool,
    pub post_only: bool,
    pub preserve: bool,
    pub secure: bool,
    pub dynamic: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CookieMode {
    Rewrite,
    Insert,
    Prefix,
}

/// A frontend and a backend sharing one name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listen {
    pub name: String,
    /// Timeouts are scoped to [`TimeoutScope::Listen`].
    pub base: Base,
    pub binds: Vec<Bind>,
    pub servers: Vec<Server>,
    pub server_templates: Vec<ServerTemplate>,
    pub balance: Option<String>,
    pub hash_type: Option<HashType>,
    pub redispatch: bool,
    pub cookie: Option<Cookie>,
    pub health_check: Option<HealthCheck>,
    /// Added to every certificate list of the listen's binds.
    pub host_certificate: Option<CertificateListElement>,
}

// === impl Base ===

impl Base {
    /// Empty settings whose timeouts are checked against `scope`.
    pub fn new(scope: TimeoutScope) -> Self {
        Self {
            mode: None,
            forward_for: None,
            http_pretend_keepalive: false,
            timeouts: Timeouts::new(scope),
            acls: Vec::new(),
            tcp_request: Vec::new(),
            http_request: Vec::new(),
            error_files: Vec::new(),
        }
    }
}

// === impl Bind ===

impl Bind {
    /// Certificates the bind line refers to.
    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.ssl
            .iter()
            .flat_map(|ssl| ssl.certificate.iter().chain(ssl.ca_certificate.iter()))
    }
}

// === impl Frontend ===

impl Frontend {
    pub fn regex_mappings(&self) -> impl Iterator<Item = &RegexMapping> {
        self.backend_switching.iter().filter_map(|rule| match &rule.target {
            BackendTarget::RegexMap(mapping) => Some(mapping),
            BackendTarget::Name(_) => None,
        })
    }
}

// === impl CertificateList ===

impl CertificateList {
    pub fn path(&self) -> String {
        config_path(&self.name, "map")
    }
}

// === impl CertificateListElement ===

impl CertificateListElement {
    /// The element's line in a `crt-list` file, including its line break.
    pub fn line(&self) -> String {
        let mut params = Vec::new();
        if !self.alpn.is_empty() {
            params.push(format!("alpn {}", self.alpn.join(",")));
        }
        match &self.ocsp {
            Ocsp::Off => {}
            Ocsp::Update => params.push("ocsp-update on".to_string()),
            Ocsp::UpdateWithFile(file) => {
                params.push(format!("ocsp-update on ocsp {}", file.path()))
            }
        }
        let params = if params.is_empty() {
            String::new()
        } else {
            format!("[{}]", params.join(" "))
        };
        format!("{} {} {} \n", self.certificate.path(), params, self.sni_filter)
    }
}

// === impl OcspFile ===

impl OcspFile {
    pub fn path(&self) -> String {
        config_path(&self.name, "ocsp")
    }
}

// === impl RegexMapping ===

impl RegexMapping {
    pub fn path(&self) -> String {
        config_path(&self.name, "map")
    }
}

// === impl CookieMode ===

impl CookieMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rewrite => "rewrite",
            Self::Insert => "insert",
            Self::Prefix => "prefix",
        }
    }
}

// === impl Listen ===

impl Listen {
    /// Projects the listen onto a frontend that forwards everything to a
    /// backend of the same name, and that backend. Each half keeps only the
    /// timeouts its section kind accepts.
    pub fn split(&self) -> (Frontend, Backend) {
        let frontend = Frontend {
            name: self.name.clone(),
            base: Base {
                timeouts: self.base.timeouts.project(TimeoutScope::Frontend),
                ..self.base.clone()
            },
            binds: self.binds.clone(),
            backend_switching: Vec::new(),
            default_backend: Some(self.name.clone()),
        };

        let backend = Backend {
            name: self.name.clone(),
            base: Base {
                timeouts: self.base.timeouts.project(TimeoutScope::Backend),
                ..self.base.clone()
            },
            servers: self.servers.clone(),
            server_templates: self.server_templates.clone(),
            balance: self.balance.clone(),
            hash_type: self.hash_type.clone(),
            redispatch: self.redispatch,
            cookie: self.cookie.clone(),
            health_check: self.health_check.clone(),
            host_regex: None,
            host_certificate: None,
        };

        (frontend, backend)
    }
}
