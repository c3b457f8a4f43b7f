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

//! Drives a whole build: discovery, extraction, planning and invocation.
//!
//! Failures are isolated to the task or file that produced them. The only
//! early exit is a missing scan root, which is reported as an empty,
//! successful run.

use crate::config::BuildConfig;
use crate::extract::{extract_entry_points, read_source, EntryPoints};
use crate::invoker::{CompilationOutcome, CompilationTask, ShaderCompiler};
use crate::planner::OutputPlanner;
use crate::report::{BuildReport, FileReport, FileStatus, SkipReason, TaskRecord};
use crate::source::SourceFile;
use std::path::Path;

/// Receives progress notifications while a build runs.
///
/// Every method has an empty default so implementors pick what they need.
pub trait BuildReporter {
    /// The scan root does not exist; the run ends immediately.
    fn root_missing(&mut self, _scan_root: &Path) {}
    /// Discovery finished with `count` files to process.
    fn scan_finished(&mut self, _output_root: &Path, _count: usize) {}
    /// Processing of `source` begins.
    fn file_started(&mut self, _source: &SourceFile) {}
    /// Entry points were found in `source`.
    fn entry_points_found(&mut self, _source: &SourceFile, _entry_points: &EntryPoints) {}
    /// One task finished.
    fn task_finished(&mut self, _source: &SourceFile, _task: &TaskRecord) {}
    /// The compiler could not be found. Called at most once per run.
    fn tool_missing(&mut self, _tool: &str) {}
    /// `file` has been fully processed.
    fn file_finished(&mut self, _file: &FileReport) {}
}

/// A reporter that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl BuildReporter for NullReporter {}

/// Runs builds for one configuration with one compiler.
pub struct BuildOrchestrator<'a> {
    config: &'a BuildConfig,
    compiler: &'a dyn ShaderCompiler,
    planner: OutputPlanner,
}

impl<'a> BuildOrchestrator<'a> {
    /// Creates an orchestrator. The compiler is injected so callers decide
    /// how (and whether) the external tool was resolved.
    pub fn new(config: &'a BuildConfig, compiler: &'a dyn ShaderCompiler) -> Self {
        Self {
            config,
            compiler,
            planner: OutputPlanner::new(&config.output_dir),
        }
    }

    /// The planner used for output paths.
    pub fn planner(&self) -> &OutputPlanner {
        &self.planner
    }

    /// Lists the source files this configuration would process, or `None`
    /// if the scan root does not exist.
    pub fn discover(&self) -> Option<Vec<SourceFile>> {
        self.config.sources()
    }

    /// Runs the build to completion.
    pub fn run(&self, reporter: &mut dyn BuildReporter) -> BuildReport {
        let mut report = BuildReport::new(&self.config.source_dir, &self.config.output_dir);

        let Some(sources) = self.discover() else {
            log::warn!(
                "Shaders directory not found: {}",
                self.config.source_dir.display()
            );
            report.root_missing = true;
            reporter.root_missing(&self.config.source_dir);
            return report;
        };
        reporter.scan_finished(&self.config.output_dir, sources.len());

        let mut tool_missing_reported = false;
        for source in sources {
            reporter.file_started(&source);
            let status = self.process_file(&source, reporter, &mut tool_missing_reported);
            let file = FileReport { source, status };
            reporter.file_finished(&file);
            report.files.push(file);
        }

        log::debug!(
            "Build finished: {} compiled, {} failed",
            report.total_compiled(),
            report.total_failed()
        );
        report
    }

    fn process_file(
        &self,
        source: &SourceFile,
        reporter: &mut dyn BuildReporter,
        tool_missing_reported: &mut bool,
    ) -> FileStatus {
        let text = match read_source(source.path()) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{e}");
                return FileStatus::Skipped(SkipReason::Unreadable(e));
            }
        };

        let entry_points = extract_entry_points(&text);
        if entry_points.is_empty() {
            log::debug!("No entry points found in {}", source.file_name());
            return FileStatus::Skipped(SkipReason::NoEntryPoints);
        }
        reporter.entry_points_found(source, &entry_points);

        let mut tasks = Vec::with_capacity(entry_points.len());
        for (stage, entry_point) in entry_points.iter() {
            let record = match self.planner.prepare(source, entry_point) {
                Ok(output) => {
                    let task = CompilationTask {
                        source,
                        entry_point,
                        stage,
                        output,
                    };
                    let outcome = self.compiler.compile(&task);
                    if let CompilationOutcome::ToolMissing { tool } = &outcome {
                        if !*tool_missing_reported {
                            *tool_missing_reported = true;
                            reporter.tool_missing(tool);
                        }
                    }
                    TaskRecord {
                        entry_point: entry_point.to_owned(),
                        stage,
                        output: task.output,
                        result: Ok(outcome),
                    }
                }
                Err(e) => {
                    log::error!("{e}");
                    TaskRecord {
                        entry_point: entry_point.to_owned(),
                        stage,
                        output: self.planner.output_path(source, entry_point),
                        result: Err(e),
                    }
                }
            };
            reporter.task_finished(source, &record);
            tasks.push(record);
        }

        FileStatus::Compiled(tasks)
    }
}
