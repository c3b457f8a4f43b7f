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

//! # fxbuild Core
//!
//! Scans a tree of HLSL sources, discovers every entry point by naming
//! convention, and drives an external compiler once per entry point while
//! mirroring the source layout into an output tree.
//!
//! The pipeline is strictly one-directional:
//! tree walk → source text → [`EntryPoints`] → [`CompilationProfile`] →
//! planned output path → [`CompilationOutcome`] → [`BuildReport`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extract;
pub mod invoker;
pub mod orchestrator;
pub mod planner;
pub mod profile;
pub mod report;
pub mod source;
pub mod tool;

pub use config::{BuildConfig, CompilerSettings, ShaderManifest};
pub use error::BuildError;
pub use extract::{extract_entry_points, read_source, EntryPoints};
pub use invoker::{CompilationOutcome, CompilationTask, ExternalCompiler, ShaderCompiler};
pub use orchestrator::{BuildOrchestrator, BuildReporter, NullReporter};
pub use planner::{OutputPlanner, COMPILED_EXTENSION};
pub use profile::{CompilationProfile, ShaderStage};
pub use report::{BuildReport, BuildStatus, FileReport, FileStatus, SkipReason, TaskRecord};
pub use source::{discover_sources, SourceFile};
pub use tool::{locate_tool, ResolvedTool};
