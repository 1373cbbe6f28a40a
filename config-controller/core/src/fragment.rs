use std::fmt;

/// The kinds of sections a configuration document is made of, in the order
/// they are emitted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Global,
    Defaults,
    Resolvers,
    Frontend,
    Backend,
}

/// An ordered list of statements scoped to one named section.
///
/// Fragments are built by the mapper and are read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    kind: SectionKind,
    name: Option<String>,
    statements: Vec<String>,
}

/// Renders fragments as one document: each section's header line followed by
/// its statements indented by two spaces, sections separated by a blank line,
/// terminated by a newline.
pub fn render<'a>(fragments: impl IntoIterator<Item = &'a Fragment>) -> String {
    let mut doc = String::new();
    for fragment in fragments {
        if !doc.is_empty() {
            doc.push('\n');
        }
        doc.push_str(&fragment.to_string());
        doc.push('\n');
    }
    doc
}

// === impl SectionKind ===

impl SectionKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Defaults => "defaults",
            Self::Resolvers => "resolvers",
            Self::Frontend => "frontend",
            Self::Backend => "backend",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// === impl Fragment ===

impl Fragment {
    pub(crate) fn named(kind: SectionKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            statements: Vec::new(),
        }
    }

    pub(crate) fn unnamed(kind: SectionKind) -> Self {
        Self {
            kind,
            name: None,
            statements: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, statement: impl Into<String>) {
        self.statements.push(statement.into());
    }

    pub(crate) fn extend<I>(&mut self, statements: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.statements
            .extend(statements.into_iter().map(Into::into));
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// The section's header line, e.g. `backend web`.
    pub fn header(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.kind, name),
            None => self.kind.to_string(),
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())?;
        for statement in &self.statements {
            write!(f, "\n  {statement}")?;
        }
        Ok(())
    }
}
