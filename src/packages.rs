//! Package index backed by the GOPATH workspace layout
//!
//! Maps short package identifiers (the last path segment) to the import
//! paths found under each `$GOPATH/src` tree. The scan walks the workspace
//! once and is cached for the life of the provider; the auto-import flow
//! only needs identifier-level resolution, not full build metadata.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::suggest::import_resolver::PackageIndex;

/// How deep below `$GOPATH/src` the scan descends. Covers
/// `host/org/repo/subpackage` layouts without walking entire vendor trees.
const MAX_SCAN_DEPTH: usize = 4;

pub struct GopathPackageIndex {
    roots: Vec<PathBuf>,
    cache: RwLock<Option<Arc<HashMap<String, Vec<String>>>>>,
}

impl GopathPackageIndex {
    pub fn new() -> Self {
        let roots = env::var_os("GOPATH")
            .map(|gopath| env::split_paths(&gopath).collect())
            .or_else(|| dirs::home_dir().map(|home| vec![home.join("go")]))
            .unwrap_or_default();
        GopathPackageIndex {
            roots,
            cache: RwLock::new(None),
        }
    }

    fn scan(roots: &[PathBuf]) -> HashMap<String, Vec<String>> {
        let mut packages: HashMap<String, Vec<String>> = HashMap::new();
        for root in roots {
            let src = root.join("src");
            if !src.is_dir() {
                continue;
            }
            let walker = WalkDir::new(&src)
                .min_depth(1)
                .max_depth(MAX_SCAN_DEPTH)
                .into_iter()
                .filter_entry(|e| {
                    e.file_type().is_dir()
                        && !e.file_name().to_string_lossy().starts_with('.')
                });
            for entry in walker.filter_map(Result::ok) {
                if !contains_go_sources(entry.path()) {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(&src) else {
                    continue;
                };
                let import_path = relative.to_string_lossy().replace('\\', "/");
                let Some(short) = relative.file_name().map(|n| n.to_string_lossy().into_owned())
                else {
                    continue;
                };
                packages.entry(short).or_default().push(import_path);
            }
        }
        debug!("indexed {} package identifiers", packages.len());
        packages
    }
}

fn contains_go_sources(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(Result::ok).any(|e| {
                e.path().extension().is_some_and(|ext| ext == "go")
            })
        })
        .unwrap_or(false)
}

#[async_trait::async_trait]
impl PackageIndex for GopathPackageIndex {
    async fn all_packages(&self) -> HashMap<String, Vec<String>> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return cached.as_ref().clone();
        }

        let roots = self.roots.clone();
        let packages = match tokio::task::spawn_blocking(move || Self::scan(&roots)).await {
            Ok(packages) => packages,
            Err(e) => {
                warn!("package index scan failed: {}", e);
                HashMap::new()
            }
        };

        let mut cache = self.cache.write().await;
        let shared = Arc::new(packages);
        *cache = Some(shared.clone());
        shared.as_ref().clone()
    }

    async fn is_vendor_supported(&self) -> bool {
        // Vendoring is unconditional on every toolchain new enough to run
        // this server.
        true
    }
}

impl Default for GopathPackageIndex {
    fn default() -> Self {
        Self::new()
    }
}
