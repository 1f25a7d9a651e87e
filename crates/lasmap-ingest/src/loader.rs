//! Parallel header parsing for a directory of LAS files.

use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, info};

use lasmap_model::LogFile;

use crate::discovery::{DiscoveryOptions, list_las_files};
use crate::error::Result;
use crate::las::read_las_file;

/// Result of reading one file. Errors stay with their file.
pub type ParsedFile = (PathBuf, Result<LogFile>);

fn thread_count(options: &DiscoveryOptions, files: usize) -> usize {
    let available = thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4);
    options.threads.unwrap_or(available).clamp(1, files.max(1))
}

/// Parses `paths` on scoped worker threads. Output order matches input order.
pub fn parse_files(paths: &[PathBuf], options: &DiscoveryOptions) -> Vec<ParsedFile> {
    let threads = thread_count(options, paths.len());
    if threads <= 1 {
        return paths
            .iter()
            .map(|path| (path.clone(), read_las_file(path)))
            .collect();
    }

    let chunk_size = paths.len().div_ceil(threads);
    debug!(files = paths.len(), threads, chunk_size, "parsing in parallel");
    thread::scope(|scope| {
        let workers: Vec<_> = paths
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|path| (path.clone(), read_las_file(path)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|worker| match worker.join() {
                Ok(parsed) => parsed,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

/// Discovers and parses every LAS file under `dir`.
pub fn load_directory(dir: &Path, options: &DiscoveryOptions) -> Result<Vec<ParsedFile>> {
    let paths = list_las_files(dir, options)?;
    let parsed = parse_files(&paths, options);
    let failed = parsed.iter().filter(|(_, result)| result.is_err()).count();
    info!(dir = %dir.display(), files = parsed.len(), failed, "directory loaded");
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_files_keeps_order_and_errors() {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for index in 0..7 {
            let path = dir.path().join(format!("w{index}.las"));
            let body = if index == 3 {
                "~V\n VERS. 2.0 : x\n".to_string()
            } else {
                format!("~C\n C{index}. : curve\n")
            };
            std::fs::write(&path, body).unwrap();
            paths.push(path);
        }

        let options = DiscoveryOptions::default().with_threads(3);
        let parsed = parse_files(&paths, &options);

        assert_eq!(parsed.len(), 7);
        for (index, (path, result)) in parsed.iter().enumerate() {
            assert_eq!(path, &paths[index]);
            if index == 3 {
                assert!(result.is_err());
            } else {
                let file = result.as_ref().unwrap();
                assert_eq!(file.curves[0].mnemonic, format!("C{index}"));
            }
        }
    }

    #[test]
    fn test_thread_count_is_bounded_by_files() {
        let options = DiscoveryOptions::default().with_threads(8);
        assert_eq!(thread_count(&options, 2), 2);
        assert_eq!(thread_count(&options, 0), 1);
    }
}
