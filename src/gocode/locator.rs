//! Tool discovery
//!
//! Resolving the gocode binary to an absolute path is a collaborator concern;
//! the pipeline only sees [`ToolLocator`]. The production locator searches
//! `$PATH` and `$GOPATH/bin` (falling back to `~/go/bin`).

use std::env;
use std::path::PathBuf;

use tracing::debug;

/// Resolves a tool name to an absolute executable path, or fails.
#[async_trait::async_trait]
pub trait ToolLocator: Send + Sync {
    async fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Locator searching the process environment.
#[derive(Debug, Default)]
pub struct PathLocator;

impl PathLocator {
    fn search_dirs() -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect())
            .unwrap_or_default();

        if let Some(gopath) = env::var_os("GOPATH") {
            for root in env::split_paths(&gopath) {
                dirs.push(root.join("bin"));
            }
        } else if let Some(home) = dirs::home_dir() {
            dirs.push(home.join("go").join("bin"));
        }

        dirs
    }
}

#[async_trait::async_trait]
impl ToolLocator for PathLocator {
    async fn locate(&self, name: &str) -> Option<PathBuf> {
        for dir in Self::search_dirs() {
            let candidate = dir.join(name);
            if candidate.is_file() {
                debug!("resolved {} to {}", name, candidate.display());
                return Some(candidate);
            }
        }
        debug!("{} not found on PATH or GOPATH/bin", name);
        None
    }
}
