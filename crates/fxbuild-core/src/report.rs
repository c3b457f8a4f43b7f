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

//! The per-task, per-file and per-run results of a build.

use crate::error::BuildError;
use crate::invoker::CompilationOutcome;
use crate::profile::ShaderStage;
use crate::source::SourceFile;
use std::path::{Path, PathBuf};

/// The recorded result of one compilation task.
#[derive(Debug)]
pub struct TaskRecord {
    /// The compiled function.
    pub entry_point: String,
    /// Its stage.
    pub stage: ShaderStage,
    /// The planned output path.
    pub output: PathBuf,
    /// The compiler outcome, or the error that prevented the invocation.
    pub result: Result<CompilationOutcome, BuildError>,
}

impl TaskRecord {
    /// Returns `true` if the compiler ran and succeeded.
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_success())
    }
}

/// Why a file contributed no tasks.
#[derive(Debug)]
pub enum SkipReason {
    /// The file has no recognized entry points.
    NoEntryPoints,
    /// The file could not be read.
    Unreadable(BuildError),
}

/// What happened to one source file.
#[derive(Debug)]
pub enum FileStatus {
    /// The file produced no tasks.
    Skipped(SkipReason),
    /// The file's entry points were compiled, in order.
    Compiled(Vec<TaskRecord>),
}

/// The result for one source file.
#[derive(Debug)]
pub struct FileReport {
    /// The processed file.
    pub source: SourceFile,
    /// Its status.
    pub status: FileStatus,
}

impl FileReport {
    /// The tasks attempted for this file.
    pub fn tasks(&self) -> &[TaskRecord] {
        match &self.status {
            FileStatus::Compiled(tasks) => tasks,
            FileStatus::Skipped(_) => &[],
        }
    }

    /// Number of entry points that compiled.
    pub fn compiled(&self) -> usize {
        self.tasks().iter().filter(|t| t.succeeded()).count()
    }

    /// Number of entry points that failed.
    pub fn failed(&self) -> usize {
        self.tasks().iter().filter(|t| !t.succeeded()).count()
    }
}

/// Terminal state of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Every attempted task succeeded, including when none were attempted.
    AllSucceeded,
    /// At least one task failed.
    AnyFailed,
}

/// The result of a whole run.
#[derive(Debug)]
pub struct BuildReport {
    /// The directory that was scanned.
    pub scan_root: PathBuf,
    /// The directory outputs were written under.
    pub output_root: PathBuf,
    /// `true` if the scan root did not exist; nothing was done.
    pub root_missing: bool,
    /// One report per processed file, in processing order.
    pub files: Vec<FileReport>,
}

impl BuildReport {
    pub(crate) fn new(scan_root: &Path, output_root: &Path) -> Self {
        Self {
            scan_root: scan_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            root_missing: false,
            files: Vec::new(),
        }
    }

    /// Number of files processed, including skipped ones.
    pub fn files_processed(&self) -> usize {
        self.files.len()
    }

    /// Total tasks attempted.
    pub fn tasks_attempted(&self) -> usize {
        self.files.iter().map(|f| f.tasks().len()).sum()
    }

    /// Total entry points compiled.
    pub fn total_compiled(&self) -> usize {
        self.files.iter().map(FileReport::compiled).sum()
    }

    /// Total entry points that failed.
    pub fn total_failed(&self) -> usize {
        self.files.iter().map(FileReport::failed).sum()
    }

    /// `AnyFailed` if and only if some task failed.
    pub fn status(&self) -> BuildStatus {
        if self.total_failed() == 0 {
            BuildStatus::AllSucceeded
        } else {
            BuildStatus::AnyFailed
        }
    }
}
