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

use crate::helpers::*;
use anyhow::Result;
use fxbuild_core::{
    locate_tool, BuildConfig, BuildOrchestrator, BuildReport, BuildReporter, BuildStatus,
    CompilationOutcome, ExternalCompiler, FileReport, FileStatus, SkipReason, SourceFile,
    TaskRecord,
};
use std::path::Path;
use std::time::Instant;

pub fn run(config: &BuildConfig) -> Result<bool> {
    print_task_start("Compiling HLSL Shaders", HAMMER, BLUE);

    let tool = locate_tool(&config.compiler.tool, &config.compiler.search_paths);
    log::debug!("Compiler: {}", tool.name());
    let compiler = ExternalCompiler::new(tool).with_timeout(config.compiler.timeout);

    let start_time = Instant::now();
    let report = BuildOrchestrator::new(config, &compiler).run(&mut ConsoleReporter);
    print_summary(&report, start_time.elapsed().as_secs_f64());

    Ok(report.status() == BuildStatus::AllSucceeded)
}

/// Prints progress as the build runs.
struct ConsoleReporter;

impl BuildReporter for ConsoleReporter {
    fn root_missing(&mut self, scan_root: &Path) {
        print_error(&format!(
            "Shaders directory not found: {}",
            scan_root.display()
        ));
        print_info("No HLSL files found to compile.");
    }

    fn scan_finished(&mut self, output_root: &Path, count: usize) {
        println!("{}📁 Output Directory:{} {}", BOLD, RESET, output_root.display());
        println!(
            "{}🔎 Found:{} {} HLSL files to process.\n",
            BOLD, RESET, count
        );
    }

    fn file_started(&mut self, source: &SourceFile) {
        println!(
            "{}{}Processing:{} {}",
            BOLD,
            CYAN,
            RESET,
            source.relative_path().display()
        );
    }

    fn task_finished(&mut self, source: &SourceFile, task: &TaskRecord) {
        let description = task.stage.profile().description;
        let file_name = source.file_name();
        match &task.result {
            Ok(CompilationOutcome::Success { .. }) => {
                let output_name = task
                    .output
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                println!(
                    "  {}{}{} {}: {} -> {} -> {}",
                    GREEN, CHECK, RESET, description, file_name, task.entry_point, output_name
                );
            }
            Ok(CompilationOutcome::CompilerError {
                exit_code,
                stdout,
                stderr,
            }) => {
                print_task_failure(&task.entry_point, &file_name);
                println!("    Error Code: {}", exit_code);
                print_stream("Stdout", stdout);
                print_stream("Stderr", stderr);
            }
            Ok(CompilationOutcome::ToolMissing { tool }) => {
                print_task_failure(&task.entry_point, &file_name);
                println!("    Compiler unavailable: {}", tool);
            }
            Ok(CompilationOutcome::TimedOut { after }) => {
                print_task_failure(&task.entry_point, &file_name);
                println!("    Compiler killed after {:.1}s", after.as_secs_f64());
            }
            Err(e) => {
                print_task_failure(&task.entry_point, &file_name);
                println!("    {}", e);
            }
        }
    }

    fn tool_missing(&mut self, tool: &str) {
        print_error(&format!(
            "{} not found! Please ensure the DirectX / Windows SDK is installed and \
             the compiler is in PATH or listed under [compiler] search_paths in Shaders.toml.",
            tool
        ));
    }

    fn file_finished(&mut self, file: &FileReport) {
        match &file.status {
            FileStatus::Skipped(SkipReason::NoEntryPoints) => {
                println!(
                    "  {}No entry points found in {}{}\n",
                    YELLOW,
                    file.source.file_name(),
                    RESET
                );
            }
            FileStatus::Skipped(SkipReason::Unreadable(e)) => {
                print_error(&format!("{}", e));
                println!();
            }
            FileStatus::Compiled(_) => {
                println!(
                    "  Result: {} compiled, {} failed\n",
                    file.compiled(),
                    file.failed()
                );
            }
        }
    }
}

fn print_task_failure(entry_point: &str, file_name: &str) {
    println!(
        "  {}{}{} FAILED to compile {} in {}",
        RED, CROSS, RESET, entry_point, file_name
    );
}

fn print_summary(report: &BuildReport, seconds: f64) {
    println!(
        "\n{}{}╔═══════════════════════════════════════╗{}",
        BOLD, CYAN, RESET
    );
    println!(
        "{}{}║          COMPILATION SUMMARY          ║{}",
        BOLD, CYAN, RESET
    );
    println!(
        "{}{}╚═══════════════════════════════════════╝{}",
        BOLD, CYAN, RESET
    );
    println!("Files Processed: {}", report.files_processed());
    println!("Total Entry Points Compiled: {}", report.total_compiled());
    println!("Total Failures: {}", report.total_failed());
    println!(
        "{}{}Total time: {:.2}s{}",
        BOLD, BLUE, seconds, RESET
    );

    match report.status() {
        BuildStatus::AllSucceeded => {
            print_success(&format!("All shaders compiled successfully! {}", ROCKET))
        }
        BuildStatus::AnyFailed => print_error("Some shaders failed to compile."),
    }
}
