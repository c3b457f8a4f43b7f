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

//! Invocation of the external shader compiler, one entry point at a time.
//!
//! The backend is `fxc`, driven with this argument grammar, each flag and
//! value being a separate argument:
//!
//! ```text
//! fxc /T <profile> /E <entry point> /Fo <output file> <source file>
//! ```

use crate::profile::{CompilationProfile, ShaderStage};
use crate::source::SourceFile;
use crate::tool::ResolvedTool;
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Target profile flag.
pub const PROFILE_FLAG: &str = "/T";
/// Entry point flag.
pub const ENTRY_POINT_FLAG: &str = "/E";
/// Output object flag.
pub const OUTPUT_FLAG: &str = "/Fo";

const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// How long an exited compiler's streams are awaited.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// One compiler invocation: a source file, one of its entry points, the
/// profile of that entry point's stage and the planned output path.
#[derive(Debug, Clone)]
pub struct CompilationTask<'a> {
    /// The file being compiled.
    pub source: &'a SourceFile,
    /// The function to compile.
    pub entry_point: &'a str,
    /// The stage the entry point was attributed to.
    pub stage: ShaderStage,
    /// Where the compiled object is written.
    pub output: PathBuf,
}

impl CompilationTask<'_> {
    /// The profile for this task's stage.
    pub fn profile(&self) -> CompilationProfile {
        self.stage.profile()
    }

    /// The compiler arguments, in order.
    pub fn arguments(&self) -> Vec<OsString> {
        vec![
            PROFILE_FLAG.into(),
            self.profile().target.into(),
            ENTRY_POINT_FLAG.into(),
            self.entry_point.into(),
            OUTPUT_FLAG.into(),
            self.output.clone().into_os_string(),
            self.source.path().as_os_str().to_owned(),
        ]
    }
}

/// How a single invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationOutcome {
    /// The compiler exited with status zero.
    Success {
        /// Whatever the compiler printed on stdout.
        stdout: String,
    },
    /// The compiler exited with a non-zero status.
    CompilerError {
        /// The exit code, or `-1` if the process was terminated by a signal.
        exit_code: i32,
        /// Captured stdout.
        stdout: String,
        /// Captured stderr.
        stderr: String,
    },
    /// The compiler executable could not be found or launched.
    ToolMissing {
        /// The tool that was looked for.
        tool: String,
    },
    /// The compiler ran past the configured timeout and was killed.
    TimedOut {
        /// The timeout that elapsed.
        after: Duration,
    },
}

impl CompilationOutcome {
    /// Returns `true` only for [`CompilationOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, CompilationOutcome::Success { .. })
    }
}

/// Compiles one entry point. The seam between orchestration and the actual
/// compiler process.
pub trait ShaderCompiler {
    /// Runs the compilation described by `task`.
    fn compile(&self, task: &CompilationTask<'_>) -> CompilationOutcome;
}

/// Runs the resolved `fxc` executable as a child process.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    tool: ResolvedTool,
    timeout: Option<Duration>,
}

impl ExternalCompiler {
    /// Creates an invoker around an already-resolved tool.
    pub fn new(tool: ResolvedTool) -> Self {
        Self {
            tool,
            timeout: None,
        }
    }

    /// Kills any invocation that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The tool this invoker runs.
    pub fn tool(&self) -> &ResolvedTool {
        &self.tool
    }

    fn run(&self, program: &Path, task: &CompilationTask<'_>) -> CompilationOutcome {
        let mut command = Command::new(program);
        command.args(task.arguments());

        log::debug!(
            "Compiling {}: {}",
            task.profile().description,
            task.entry_point
        );
        log::debug!(
            "  Command: {} {}",
            program.display(),
            task.arguments()
                .iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let result = match self.timeout {
            None => command
                .output()
                .map(|o| Finished::Exited(o.status, lossy(&o.stdout), lossy(&o.stderr))),
            Some(timeout) => run_with_timeout(command, timeout),
        };

        match result {
            Ok(Finished::Exited(status, stdout, stderr)) => {
                if status.success() {
                    if !stdout.trim().is_empty() {
                        log::debug!("  Output: {}", stdout.trim());
                    }
                    CompilationOutcome::Success { stdout }
                } else {
                    CompilationOutcome::CompilerError {
                        exit_code: status.code().unwrap_or(-1),
                        stdout,
                        stderr,
                    }
                }
            }
            Ok(Finished::Killed) => CompilationOutcome::TimedOut {
                after: self.timeout.unwrap_or_default(),
            },
            Err(e) => {
                log::error!("Failed to launch '{}': {e}", program.display());
                CompilationOutcome::ToolMissing {
                    tool: self.tool.name(),
                }
            }
        }
    }
}

impl ShaderCompiler for ExternalCompiler {
    fn compile(&self, task: &CompilationTask<'_>) -> CompilationOutcome {
        match self.tool.path() {
            Some(program) => self.run(program, task),
            None => CompilationOutcome::ToolMissing {
                tool: self.tool.name(),
            },
        }
    }
}

enum Finished {
    Exited(ExitStatus, String, String),
    Killed,
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Spawns `command` and polls it until it exits or `timeout` elapses.
///
/// Both pipes are drained on helper threads so a chatty compiler cannot
/// block on a full pipe while we wait. Processes spawned by the compiler may
/// keep the pipes open after it is gone: a killed compiler's streams are
/// abandoned, and an exited one's are collected for at most [`DRAIN_GRACE`].
fn run_with_timeout(mut command: Command, timeout: Duration) -> std::io::Result<Finished> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            let deadline = Instant::now() + DRAIN_GRACE;
            let stdout = stdout.recv_deadline(deadline).unwrap_or_default();
            let stderr = stderr.recv_deadline(deadline).unwrap_or_default();
            return Ok(Finished::Exited(status, stdout, stderr));
        }
        if started.elapsed() >= timeout {
            kill(&mut child);
            return Ok(Finished::Killed);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Reads `pipe` to its end on a detached thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> flume::Receiver<String> {
    let (sender, receiver) = flume::bounded(1);
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        // The receiver is gone if the invocation was abandoned.
        let _ = sender.send(lossy(&buffer));
    });
    receiver
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::warn!("Failed to kill timed-out compiler: {e}");
    }
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(source: &SourceFile) -> CompilationTask<'_> {
        CompilationTask {
            source,
            entry_point: "PS_Main",
            stage: ShaderStage::Pixel,
            output: PathBuf::from("/out/a/foo_PS_Main.cso"),
        }
    }

    #[test]
    fn arguments_follow_the_fxc_grammar() {
        let source = SourceFile::new(Path::new("/src"), "/src/a/foo.hlsl").unwrap();
        let args: Vec<String> = task(&source)
            .arguments()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            [
                "/T",
                "ps_5_0",
                "/E",
                "PS_Main",
                "/Fo",
                "/out/a/foo_PS_Main.cso",
                "/src/a/foo.hlsl"
            ]
        );
    }

    #[test]
    fn missing_tool_yields_tool_missing() {
        let source = SourceFile::new(Path::new("/src"), "/src/a/foo.hlsl").unwrap();
        let compiler = ExternalCompiler::new(ResolvedTool::Missing {
            name: "fxc".into(),
        });

        assert_eq!(
            compiler.compile(&task(&source)),
            CompilationOutcome::ToolMissing { tool: "fxc".into() }
        );
    }

    #[test]
    fn unlaunchable_tool_yields_tool_missing() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceFile::new(Path::new("/src"), "/src/a/foo.hlsl").unwrap();
        let compiler =
            ExternalCompiler::new(ResolvedTool::Found(dir.path().join("vanished-fxc")));

        let outcome = compiler.compile(&task(&source));
        assert!(matches!(outcome, CompilationOutcome::ToolMissing { .. }));
        assert!(!outcome.is_success());
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-fxc");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn zero_exit_is_success_with_stdout() {
            let dir = tempfile::tempdir().unwrap();
            let tool = script(dir.path(), "echo compiled \"$2\"");
            let source = SourceFile::new(Path::new("/src"), "/src/a/foo.hlsl").unwrap();

            let outcome = ExternalCompiler::new(ResolvedTool::Found(tool)).compile(&task(&source));
            assert_eq!(
                outcome,
                CompilationOutcome::Success {
                    stdout: "compiled ps_5_0\n".into()
                }
            );
        }

        #[test]
        fn non_zero_exit_carries_code_and_streams() {
            let dir = tempfile::tempdir().unwrap();
            let tool = script(dir.path(), "echo partial; echo 'error X3000' >&2; exit 3");
            let source = SourceFile::new(Path::new("/src"), "/src/a/foo.hlsl").unwrap();

            let outcome = ExternalCompiler::new(ResolvedTool::Found(tool))
                .with_timeout(Some(Duration::from_secs(30)))
                .compile(&task(&source));
            assert_eq!(
                outcome,
                CompilationOutcome::CompilerError {
                    exit_code: 3,
                    stdout: "partial\n".into(),
                    stderr: "error X3000\n".into(),
                }
            );
        }

        #[test]
        fn hung_compiler_is_killed_after_timeout() {
            let dir = tempfile::tempdir().unwrap();
            let tool = script(dir.path(), "exec sleep 30");
            let source = SourceFile::new(Path::new("/src"), "/src/a/foo.hlsl").unwrap();

            let started = Instant::now();
            let outcome = ExternalCompiler::new(ResolvedTool::Found(tool))
                .with_timeout(Some(Duration::from_millis(200)))
                .compile(&task(&source));

            assert_eq!(
                outcome,
                CompilationOutcome::TimedOut {
                    after: Duration::from_millis(200)
                }
            );
            assert!(started.elapsed() < Duration::from_secs(10));
        }

        #[test]
        fn timeout_holds_when_the_compiler_leaves_children_behind() {
            let dir = tempfile::tempdir().unwrap();
            // Without `exec`, the sleeping child outlives the killed shell and
            // keeps both pipes open.
            let tool = script(dir.path(), "sleep 8\necho done");
            let source = SourceFile::new(Path::new("/src"), "/src/a/foo.hlsl").unwrap();

            let started = Instant::now();
            let outcome = ExternalCompiler::new(ResolvedTool::Found(tool))
                .with_timeout(Some(Duration::from_millis(200)))
                .compile(&task(&source));

            assert!(matches!(outcome, CompilationOutcome::TimedOut { .. }));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[test]
        fn exited_compiler_does_not_wait_on_background_children() {
            let dir = tempfile::tempdir().unwrap();
            let tool = script(dir.path(), "sleep 8 &\necho started");
            let source = SourceFile::new(Path::new("/src"), "/src/a/foo.hlsl").unwrap();

            let started = Instant::now();
            let outcome = ExternalCompiler::new(ResolvedTool::Found(tool))
                .with_timeout(Some(Duration::from_secs(30)))
                .compile(&task(&source));

            assert!(outcome.is_success());
            assert!(started.elapsed() < Duration::from_secs(4));
        }
    }
}
