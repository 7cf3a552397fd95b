//! File discovery for finding images in the input directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CaptionConfig;
use crate::error::LumenError;

/// Discovers captionable image files in a directory.
pub struct FileDiscovery {
    supported_formats: Vec<String>,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: &CaptionConfig) -> Self {
        Self {
            supported_formats: config
                .supported_formats
                .iter()
                .map(|fmt| fmt.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// List the supported image files directly inside `dir`.
    ///
    /// Subdirectories are not descended into. Results are sorted by file
    /// name so runs are reproducible. Fails only when `dir` itself cannot
    /// be read; unreadable entries are logged and skipped.
    pub fn discover(&self, dir: &Path) -> Result<Vec<DiscoveredFile>, LumenError> {
        if !dir.is_dir() {
            return Err(LumenError::Discovery {
                path: dir.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(LumenError::Discovery {
                        path: dir.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };

            let entry_path = entry.path();
            if entry.file_type().is_file() && self.is_supported(entry_path) {
                if let Ok(meta) = entry.metadata() {
                    files.push(DiscoveredFile {
                        path: entry_path.to_path_buf(),
                        size: meta.len(),
                    });
                }
            }
        }

        for (first, second) in shared_stems(&files) {
            tracing::warn!(
                "{:?} and {:?} share a file stem; the later caption overwrites the earlier one",
                first,
                second
            );
        }

        Ok(files)
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_formats.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

/// Pairs of files that would write the same caption file.
///
/// Each pair is (first seen, later file) in discovery order.
pub fn shared_stems(files: &[DiscoveredFile]) -> Vec<(&Path, &Path)> {
    let mut seen: HashMap<&std::ffi::OsStr, &Path> = HashMap::new();
    let mut shared = Vec::new();
    for file in files {
        let Some(stem) = file.path.file_stem() else {
            continue;
        };
        match seen.get(stem) {
            Some(first) => shared.push((*first, file.path.as_path())),
            None => {
                seen.insert(stem, &file.path);
            }
        }
    }
    shared
}

/// Sidecar caption path: the image path with its extension replaced.
pub fn caption_path(image: &Path, caption_extension: &str) -> PathBuf {
    image.with_extension(caption_extension.trim_start_matches('.'))
}
