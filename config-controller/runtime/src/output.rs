use crate::core::{ConfigArtifactSet, CONFIG_DIR};
use anyhow::{bail, Context, Result};
use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

/// Where synthesized artifacts go.
#[derive(Clone, Debug)]
pub(crate) enum Output {
    /// Prints the document to stdout and lists the side files.
    Print,
    /// Mirrors the artifact set into a directory.
    Dir(PathBuf),
}

// === impl Output ===

impl Output {
    pub(crate) async fn write(&self, artifacts: &ConfigArtifactSet) -> Result<()> {
        match self {
            Self::Print => {
                print!("{}", artifacts.document);
                for path in artifacts.files.keys() {
                    tracing::info!(%path, "Side file");
                }
                Ok(())
            }
            Self::Dir(dir) => {
                for (path, content) in artifacts.entries() {
                    write_file(&target(dir, path)?, content).await?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Print => f.write_str("stdout"),
            Self::Dir(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Maps an artifact path into `dir`. Side files carry absolute paths under
/// the proxy's configuration directory; the document is named by
/// [`CONFIG_FILE`](crate::core::CONFIG_FILE). Paths that would leave `dir` are refused.
fn target(dir: &Path, path: &str) -> Result<PathBuf> {
    let relative = Path::new(
        path.strip_prefix(CONFIG_DIR)
            .unwrap_or(path)
            .trim_start_matches('/'),
    );
    let mut components = relative.components().peekable();
    if components.peek().is_none() || !components.all(|c| matches!(c, Component::Normal(_))) {
        bail!("refusing to write {path} outside {}", dir.display());
    }
    Ok(dir.join(relative))
}

/// Replaces a file through a temporary sibling, so the proxy never reads a
/// partially written file.
async fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, content)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;
    tracing::trace!(path = %path.display(), "Wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CONFIG_FILE;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(CONFIG_FILE, "/out/haproxy.cfg")]
    #[case("/usr/local/etc/haproxy/web.crt", "/out/web.crt")]
    #[case("/usr/local/etc/haproxy/env", "/out/env")]
    #[case("/elsewhere/a.map", "/out/elsewhere/a.map")]
    fn maps_paths_into_the_output_dir(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(
            target(Path::new("/out"), path).expect("path must stay in the output dir"),
            PathBuf::from(expected)
        );
    }

    #[rstest]
    #[case("/usr/local/etc/haproxy/../../../../etc/cron.d/evil.crt")]
    #[case("/usr/local/etc/haproxy/certs/../../web.crt")]
    #[case("../web.crt")]
    #[case("/usr/local/etc/haproxy")]
    #[case("")]
    fn refuses_paths_outside_the_output_dir(#[case] path: &str) {
        let error = target(Path::new("/out"), path).expect_err("path must be refused");
        assert!(error.to_string().starts_with("refusing to write"), "{error}");
    }
}
