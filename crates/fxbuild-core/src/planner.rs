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

//! Mirrors the source layout into the output tree.

use crate::error::BuildError;
use crate::source::SourceFile;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of the compiled object files.
pub const COMPILED_EXTENSION: &str = "cso";

/// Computes where the compiled object for each entry point goes.
#[derive(Debug, Clone)]
pub struct OutputPlanner {
    output_root: PathBuf,
}

impl OutputPlanner {
    /// Creates a planner writing under `output_root`.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    /// The root of the output tree.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// The output directory for `source`: the output root joined with the
    /// source's directory relative to the scan root.
    pub fn output_dir(&self, source: &SourceFile) -> PathBuf {
        self.output_root.join(source.relative_dir())
    }

    /// `{stem}_{entry_point}.cso`
    pub fn output_file_name(&self, source: &SourceFile, entry_point: &str) -> String {
        format!("{}_{}.{}", source.stem(), entry_point, COMPILED_EXTENSION)
    }

    /// The full output path, without touching the filesystem.
    pub fn output_path(&self, source: &SourceFile, entry_point: &str) -> PathBuf {
        self.output_dir(source)
            .join(self.output_file_name(source, entry_point))
    }

    /// Creates the output directory for `source` (and any missing ancestors)
    /// and returns the output path for `entry_point`.
    ///
    /// Calling it again for the same inputs returns the same path and does not
    /// fail on the existing directory.
    pub fn prepare(&self, source: &SourceFile, entry_point: &str) -> Result<PathBuf, BuildError> {
        let dir = self.output_dir(source);
        fs::create_dir_all(&dir).map_err(|source| BuildError::DirectoryCreation {
            path: dir.clone(),
            source,
        })?;
        Ok(dir.join(self.output_file_name(source, entry_point)))
    }
}
