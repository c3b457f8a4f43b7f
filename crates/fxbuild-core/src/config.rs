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

//! Build configuration and the optional `Shaders.toml` manifest.

use crate::error::BuildError;
use crate::source::{discover_sources, SourceFile};
use crate::tool::DEFAULT_TOOL;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// The manifest file looked up in the project root.
pub const MANIFEST_FILE: &str = "Shaders.toml";

/// Represents the structure of the `Shaders.toml` manifest file.
///
/// Every key is optional. Relative paths are resolved against the project root.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShaderManifest {
    /// Directory scanned for shader sources.
    pub source_dir: Option<PathBuf>,
    /// Directory the compiled objects are mirrored into.
    pub output_dir: Option<PathBuf>,
    /// Source file extension, without the dot.
    pub extension: Option<String>,
    /// Compiler settings.
    pub compiler: CompilerManifest,
}

/// The `[compiler]` table of the manifest.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerManifest {
    /// Executable name or path.
    pub tool: Option<String>,
    /// Extra directories searched for the executable.
    pub search_paths: Vec<PathBuf>,
    /// Per-invocation timeout, in seconds.
    pub timeout_secs: Option<u64>,
}

impl ShaderManifest {
    /// Loads `path` if it exists; otherwise returns the default manifest.
    pub fn load_or_default(path: &Path) -> Result<Self, BuildError> {
        if !path.exists() {
            log::debug!("No '{}' found. Using default configuration.", path.display());
            return Ok(Self::default());
        }

        log::debug!("Found '{}'. Loading configuration.", path.display());
        let text = fs::read_to_string(path).map_err(|source| BuildError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| BuildError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Settings for locating and running the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerSettings {
    /// Executable name or path.
    pub tool: String,
    /// Extra directories searched after `PATH`.
    pub search_paths: Vec<PathBuf>,
    /// Optional per-invocation timeout.
    pub timeout: Option<Duration>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_owned(),
            search_paths: Vec::new(),
            timeout: None,
        }
    }
}

/// Everything a build run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// The project root; relative paths are resolved against it.
    pub project_root: PathBuf,
    /// Scan root.
    pub source_dir: PathBuf,
    /// Output root.
    pub output_dir: PathBuf,
    /// Source extension, without the dot.
    pub extension: String,
    /// When non-empty, only sources whose relative path or file name is
    /// listed here are processed.
    pub only: Vec<PathBuf>,
    /// Compiler settings.
    pub compiler: CompilerSettings,
}

impl BuildConfig {
    /// The default layout: `<root>/shaders` compiled into `<root>/build/bin/shaders`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            source_dir: project_root.join("shaders"),
            output_dir: project_root.join("build").join("bin").join("shaders"),
            extension: "hlsl".to_owned(),
            only: Vec::new(),
            compiler: CompilerSettings::default(),
            project_root,
        }
    }

    /// Applies the manifest on top of the default layout.
    pub fn from_manifest(project_root: impl Into<PathBuf>, manifest: ShaderManifest) -> Self {
        let mut config = Self::new(project_root);
        if let Some(dir) = manifest.source_dir {
            config.source_dir = config.project_root.join(dir);
        }
        if let Some(dir) = manifest.output_dir {
            config.output_dir = config.project_root.join(dir);
        }
        if let Some(ext) = manifest.extension {
            config.extension = ext.trim_start_matches('.').to_owned();
        }
        if let Some(tool) = manifest.compiler.tool {
            config.compiler.tool = tool;
        }
        config.compiler.search_paths = manifest
            .compiler
            .search_paths
            .into_iter()
            .map(|p| config.project_root.join(p))
            .collect();
        config.compiler.timeout = manifest.compiler.timeout_secs.map(Duration::from_secs);
        config
    }

    /// Returns `true` if `relative` (a path under the scan root) passes the
    /// `only` filter.
    ///
    /// Requested names may be bare file names, paths relative to the scan
    /// root, or paths that lead into the scan root from the project root
    /// (`shaders/a/foo.hlsl`) or the filesystem root. `.` components are
    /// ignored.
    pub fn selects(&self, relative: &Path) -> bool {
        self.only.is_empty() || self.only.iter().any(|wanted| self.matches(wanted, relative))
    }

    /// Lists the source files this configuration would process, or `None`
    /// if the scan root does not exist.
    ///
    /// Every `only` entry that matches none of the discovered files is
    /// logged as a warning.
    pub fn sources(&self) -> Option<Vec<SourceFile>> {
        if !self.source_dir.is_dir() {
            return None;
        }

        let all = discover_sources(&self.source_dir, &self.extension);
        for wanted in &self.only {
            if !all.iter().any(|f| self.matches(wanted, f.relative_path())) {
                log::warn!(
                    "'{}' does not match any shader under '{}'",
                    wanted.display(),
                    self.source_dir.display()
                );
            }
        }

        Some(
            all.into_iter()
                .filter(|f| self.selects(f.relative_path()))
                .collect(),
        )
    }

    fn matches(&self, wanted: &Path, relative: &Path) -> bool {
        let wanted = without_cur_dir(wanted);
        if wanted.components().count() == 1 {
            return relative.file_name() == Some(wanted.as_os_str());
        }

        let source_dir = without_cur_dir(&self.source_dir);
        let anchored = without_cur_dir(&self.project_root.join(&wanted));
        let under_root = anchored
            .strip_prefix(&source_dir)
            .map(Path::to_path_buf)
            .unwrap_or(wanted);
        under_root == relative
    }
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
