//! Input-root filtering of source locations.

use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Decides whether a declaration's file lies under one of the configured
/// input roots. Roots are canonicalized once, up front.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    roots: Vec<PathBuf>,
}

impl PathFilter {
    pub fn new(roots: &[PathBuf]) -> Self {
        let roots = roots
            .iter()
            .map(|root| match root.canonicalize() {
                Ok(canonical) => canonical,
                Err(err) => {
                    warn!(
                        root = %root.display(),
                        %err,
                        "input root does not resolve, matching it literally"
                    );
                    root.clone()
                }
            })
            .collect();
        Self { roots }
    }

    /// A filter that accepts every location.
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether `path` is inside one of the roots. Without roots every path
    /// is relevant; with roots, missing or invalid paths never are.
    pub fn is_relevant(&self, path: Option<&Path>) -> bool {
        if self.roots.is_empty() {
            return true;
        }
        let Some(path) = path else {
            return false;
        };
        if path.as_os_str().is_empty() || path == Path::new("<invalid loc>") {
            return false;
        }
        let candidate = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let relevant = self.roots.iter().any(|root| candidate.starts_with(root));
        if !relevant {
            trace!(path = %candidate.display(), "outside input roots");
        }
        relevant
    }
}
