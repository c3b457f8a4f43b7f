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

//! One-time resolution of the external compiler executable.
//!
//! The probe runs once per build. Its result is handed to
//! [`ExternalCompiler`](crate::ExternalCompiler), so a missing tool makes every
//! task fail with the same outcome instead of aborting the run.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default compiler executable name for the host.
#[cfg(windows)]
pub const DEFAULT_TOOL: &str = "fxc.exe";
/// Default compiler executable name for the host.
#[cfg(not(windows))]
pub const DEFAULT_TOOL: &str = "fxc";

/// The result of probing for the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTool {
    /// The executable was found at this path.
    Found(PathBuf),
    /// Nothing matching this name was found anywhere.
    Missing {
        /// The name that was searched for.
        name: String,
    },
}

impl ResolvedTool {
    /// The resolved path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolvedTool::Found(path) => Some(path),
            ResolvedTool::Missing { .. } => None,
        }
    }

    /// A display name for messages.
    pub fn name(&self) -> String {
        match self {
            ResolvedTool::Found(path) => path.display().to_string(),
            ResolvedTool::Missing { name } => name.clone(),
        }
    }
}

/// Resolves `tool` to an executable path.
///
/// In order:
/// 1. `tool` itself, if it contains a path separator and exists;
/// 2. each directory of the `PATH` environment variable;
/// 3. each directory in `extra_dirs` (from the build manifest);
/// 4. the well-known Windows SDK install locations.
pub fn locate_tool(tool: &str, extra_dirs: &[PathBuf]) -> ResolvedTool {
    let direct = Path::new(tool);
    if direct.components().count() > 1 {
        return if direct.is_file() {
            ResolvedTool::Found(direct.to_path_buf())
        } else {
            log::debug!("Compiler path '{}' does not exist", direct.display());
            ResolvedTool::Missing {
                name: tool.to_owned(),
            }
        };
    }

    let path_dirs = env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).collect::<Vec<_>>())
        .unwrap_or_default();

    let candidates = path_dirs
        .into_iter()
        .chain(extra_dirs.iter().cloned())
        .chain(sdk_install_dirs());

    for dir in candidates {
        let candidate = dir.join(tool);
        if candidate.is_file() {
            log::debug!("Resolved compiler: {}", candidate.display());
            return ResolvedTool::Found(candidate);
        }
    }

    ResolvedTool::Missing {
        name: tool.to_owned(),
    }
}

/// Fixed install locations of `fxc`, newest SDK first.
fn sdk_install_dirs() -> Vec<PathBuf> {
    if !cfg!(windows) {
        return Vec::new();
    }

    let arch = if cfg!(target_arch = "x86") { "x86" } else { "x64" };
    let kits = PathBuf::from(r"C:\Program Files (x86)\Windows Kits\10\bin");

    let mut versioned: Vec<PathBuf> = fs::read_dir(&kits)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("10."))
                })
                .collect()
        })
        .unwrap_or_default();
    versioned.sort();
    versioned.reverse();

    let mut dirs: Vec<PathBuf> = versioned.into_iter().map(|v| v.join(arch)).collect();
    dirs.push(kits.join(arch));
    dirs.push(PathBuf::from(format!(
        r"C:\Program Files (x86)\Windows Kits\8.1\bin\{arch}"
    )));
    dirs.push(PathBuf::from(format!(
        r"C:\Program Files (x86)\Microsoft DirectX SDK (June 2010)\Utilities\bin\{arch}"
    )));
    dirs
}
