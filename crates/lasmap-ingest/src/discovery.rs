//! LAS file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Options for [`list_las_files`] and [`crate::load_directory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Parser threads; `None` uses the available parallelism.
    pub threads: Option<usize>,
}

impl DiscoveryOptions {
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }
}

fn is_las(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("las"))
}

/// Lists all `.las` files in a directory.
///
/// The extension check is case-insensitive. Returns paths sorted by name.
pub fn list_las_files(dir: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| IngestError::DirectoryRead {
            path: current.clone(),
            source: e,
        })?;

        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: current.clone(),
                source: e,
            })?;
            let path = entry.path();

            if path.is_dir() {
                if options.recursive {
                    pending.push(path);
                }
            } else if path.is_file() && is_las(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    tracing::debug!(dir = %dir.display(), files = files.len(), "LAS files discovered");
    Ok(files)
}
