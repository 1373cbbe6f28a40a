use super::Certificate;

/// Peer certificate verification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verify {
    None,
    Optional,
    Required,
}

/// Settings shared by `server` and `server-template` lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerParams {
    pub ssl: Option<ServerSsl>,
    pub weight: Option<u16>,
    pub check: Option<Check>,
    pub init_addr: Option<String>,
    pub resolvers: Option<String>,
    pub proxy_protocol: Option<ProxyProtocol>,
    pub verify_host: Option<String>,
    /// Pins clients to the server with a persistence cookie.
    pub cookie: bool,
}

/// TLS towards a server. Only present when enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerSsl {
    pub certificate: Option<Certificate>,
    pub ca_certificate: Option<Certificate>,
    pub verify: Option<Verify>,
    pub min_version: Option<String>,
    pub sni: Option<String>,
    pub alpn: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Check {
    /// Milliseconds.
    pub inter: Option<u64>,
    pub rise: Option<i64>,
    pub fall: Option<i64>,
}

/// The PROXY protocol header sent to a server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProxyProtocol {
    V1,
    V2(Vec<ProxyV2Option>),
    V2Ssl,
    V2SslCn,
}

/// TLVs added to a PROXY protocol v2 header, in emission order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProxyV2Option {
    Ssl,
    CertCn,
    SslCipher,
    CertSig,
    CertKey,
    Authority,
    Crc32c,
    UniqueId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Server {
    pub name: String,
    pub address: String,
    pub port: u16,
    pub params: ServerParams,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerTemplate {
    pub prefix: String,
    pub range: TemplateRange,
    pub fqdn: String,
    pub port: u16,
    pub params: ServerParams,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TemplateRange {
    Count(i64),
    Range(i64, i64),
}

// === impl Verify ===

impl Verify {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Optional => "optional",
            Self::Required => "required",
        }
    }
}

// === impl ServerParams ===

impl ServerParams {
    /// Certificates the server line refers to.
    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.ssl
            .iter()
            .flat_map(|ssl| ssl.certificate.iter().chain(ssl.ca_certificate.iter()))
    }
}

// === impl ProxyV2Option ===

impl ProxyV2Option {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssl => "ssl",
            Self::CertCn => "cert-cn",
            Self::SslCipher => "ssl-cipher",
            Self::CertSig => "cert-sig",
            Self::CertKey => "cert-key",
            Self::Authority => "authority",
            Self::Crc32c => "crc32c",
            Self::UniqueId => "unique-id",
        }
    }
}
