// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Source file discovery under a scan root.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A shader source file found under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    relative: PathBuf,
}

impl SourceFile {
    /// Creates a source file from its full path and the scan root it was found under.
    ///
    /// Returns `None` if `path` is not a descendant of `scan_root`.
    pub fn new(scan_root: &Path, path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let relative = path.strip_prefix(scan_root).ok()?.to_path_buf();
        Some(Self { path, relative })
    }

    /// The full path, suitable for reading and for passing to the compiler.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path relative to the scan root.
    pub fn relative_path(&self) -> &Path {
        &self.relative
    }

    /// The directory containing this file, relative to the scan root.
    ///
    /// Empty for files directly under the root.
    pub fn relative_dir(&self) -> &Path {
        self.relative.parent().unwrap_or_else(|| Path::new(""))
    }

    /// The file name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The file name with its extension.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Recursively finds every file under `scan_root` whose extension equals
/// `extension`, ignoring ASCII case.
///
/// Results are sorted by path. Unreadable directory entries are skipped with
/// a warning. A missing root yields an empty list; callers that need to
/// distinguish that case check the root first.
pub fn discover_sources(scan_root: &Path, extension: &str) -> Vec<SourceFile> {
    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();

    for entry in WalkDir::new(scan_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under '{}': {e}", scan_root.display());
                continue;
            }
        };
        // Links are not followed, so a linked file shows up as a symlink.
        // Dangling links are kept and fail later, when the file is read.
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && !entry.path().is_dir());
        if !is_file {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }
        if let Some(file) = SourceFile::new(scan_root, entry.into_path()) {
            files.push(file);
        }
    }

    log::debug!("Found {} {} files", files.len(), extension);
    for file in &files {
        log::debug!("  - {}", file.relative_path().display());
    }

    files
}
