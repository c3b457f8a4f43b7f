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

//! Defines the error type shared by every stage of a shader build.
//!
//! Compiler failures and a missing compiler executable are not errors here:
//! they are [`CompilationOutcome`](crate::CompilationOutcome) variants, since
//! the build keeps going after them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// An error isolated to a single source file or compilation task.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A shader source file could not be read. The file is skipped.
    #[error("Failed to read shader source '{}': {source}", path.display())]
    SourceRead {
        /// The path of the file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The mirrored output directory for a task could not be created.
    #[error("Failed to create output directory '{}': {source}", path.display())]
    DirectoryCreation {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The build manifest exists but could not be read.
    #[error("Failed to read manifest file at '{}': {source}", path.display())]
    ManifestRead {
        /// The manifest path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The build manifest is not valid TOML for [`ShaderManifest`](crate::ShaderManifest).
    #[error("Failed to parse TOML from '{}': {source}", path.display())]
    ManifestParse {
        /// The manifest path.
        path: PathBuf,
        /// The deserialization error.
        #[source]
        source: toml::de::Error,
    },
}
