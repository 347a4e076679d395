use std::io;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tracing::trace;

/// Serves regular files below a root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins a normalized request path onto the root. Paths that still
    /// contain `..` or an absolute component are refused.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        if url_path.contains("..") {
            return None;
        }

        let mut candidate = self.root.clone();
        for component in Path::new(url_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => candidate.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(candidate)
    }

    /// Reads the file at `url_path`, or `None` when there is no regular file there.
    pub async fn load(&self, url_path: &str) -> io::Result<Option<Bytes>> {
        let Some(candidate) = self.map_path(url_path) else {
            trace!(url_path, "refused static path");
            return Ok(None);
        };

        match tokio::fs::metadata(&candidate).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        }

        let bytes = tokio::fs::read(&candidate).await?;
        trace!(path = %candidate.display(), size = bytes.len(), "serving static file");
        Ok(Some(Bytes::from(bytes)))
    }
}
