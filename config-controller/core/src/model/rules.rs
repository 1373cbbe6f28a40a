use super::StaticFile;
use crate::{hash::md5_hex, store::StoreRef, CONFIG_DIR};
use std::fmt;

/// The maximum number of arguments HAProxy accepts on one line.
pub const MAX_LINE_ARGS: usize = 64;

/// Status codes `errorfile` accepts.
pub const ERROR_FILE_CODES: &[u16] = &[
    200, 400, 401, 403, 404, 405, 407, 408, 410, 413, 425, 429, 500, 501, 502, 503, 504,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConditionKind {
    If,
    Unless,
}

/// A trailing `if`/`unless` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Condition {
    pub kind: ConditionKind,
    pub test: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Acl {
    pub name: String,
    pub criterion: String,
    pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorFile {
    pub code: u16,
    pub file: StaticFile,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TcpRequestKind {
    Connection,
    Content,
    InspectDelay,
    Session,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpRequestRule {
    pub kind: TcpRequestKind,
    pub action: Option<String>,
    /// Milliseconds.
    pub timeout: Option<u64>,
    pub condition: Option<Condition>,
}

/// One `http-request` statement.
///
/// A section's rules are kept in emission order; their index is their
/// position in that list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HttpRequestRule {
    SetHeader {
        name: String,
        value: HeaderValue,
        condition: Option<Condition>,
    },
    SetPath {
        format: String,
        condition: Option<Condition>,
    },
    AddHeader {
        name: String,
        value: HeaderValue,
        condition: Option<Condition>,
    },
    ReplacePath {
        regex: String,
        format: String,
        condition: Option<Condition>,
    },
    Deny {
        status: Option<u16>,
        condition: Option<Condition>,
    },
    Redirect(Redirect),
    Return {
        status: Option<u16>,
        content_type: String,
        format: String,
        content: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RedirectKind {
    Location,
    Prefix,
    Scheme,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub value: String,
    pub code: Option<u16>,
    pub drop_query: bool,
    pub append_slash: bool,
    pub set_cookie: Option<RedirectCookie>,
    pub clear_cookie: Option<RedirectCookie>,
    pub condition: Option<Condition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectCookie {
    pub name: String,
    pub value: String,
}

/// A header value, optionally wrapped in a `%s` format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderValue {
    pub source: HeaderSource,
    pub format: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderSource {
    Literal(String),
    /// Rendered as `${NAME}` and resolved by the proxy from its environment.
    Env(EnvVar),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: EnvValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvValue {
    Literal(String),
    Secret(StoreRef),
}

// === impl Condition ===

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConditionKind::If => write!(f, "if {}", self.test),
            ConditionKind::Unless => write!(f, "unless {}", self.test),
        }
    }
}

// === impl Acl ===

impl Acl {
    /// Whether the values are too many for one line and are read from a file
    /// instead.
    pub fn is_externalized(&self) -> bool {
        self.values.len() > MAX_LINE_ARGS - 3
    }

    /// The file the values are written to when externalized. The name embeds
    /// a digest of the content.
    pub fn file_path(&self) -> String {
        format!(
            "{CONFIG_DIR}/acl-{}-{}.txt",
            self.name,
            md5_hex(self.file_content())
        )
    }

    pub fn file_content(&self) -> String {
        self.values.join("\n")
    }
}

// === impl TcpRequestKind ===

impl TcpRequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Content => "content",
            Self::InspectDelay => "inspect-delay",
            Self::Session => "session",
        }
    }
}

// === impl RedirectKind ===

impl RedirectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Prefix => "prefix",
            Self::Scheme => "scheme",
        }
    }
}

// === impl HeaderValue ===

impl HeaderValue {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            source: HeaderSource::Literal(value.into()),
            format: None,
        }
    }

    pub fn env(&self) -> Option<&EnvVar> {
        match &self.source {
            HeaderSource::Env(env) => Some(env),
            HeaderSource::Literal(_) => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match &self.source {
            HeaderSource::Literal(value) => value.clone(),
            HeaderSource::Env(env) => format!("${{{}}}", env.name),
        };
        match &self.format {
            Some(format) => f.write_str(&format.replacen("%s", &value, 1)),
            None => f.write_str(&value),
        }
    }
}
