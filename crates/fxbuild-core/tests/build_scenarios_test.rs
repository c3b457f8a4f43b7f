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

//! End-to-end builds against a stand-in compiler script.

#![cfg(unix)]

use fxbuild_core::{
    locate_tool, BuildConfig, BuildOrchestrator, BuildStatus, CompilationOutcome,
    ExternalCompiler, NullReporter, ResolvedTool,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

// Mimics fxc: parses `/T /E /Fo <src>`, writes the object, fails on `*Broken*`.
const FAKE_FXC: &str = r#"#!/bin/sh
out=""
entry=""
while [ $# -gt 0 ]; do
  case "$1" in
    /T) shift 2 ;;
    /E) entry="$2"; shift 2 ;;
    /Fo) out="$2"; shift 2 ;;
    *) src="$1"; shift ;;
  esac
done
case "$entry" in
  *Broken*) echo "$src: error X3000: syntax error" >&2; exit 1 ;;
esac
printf 'DXBC' > "$out"
echo "compiled $entry"
"#;

fn install_fake_fxc(dir: &Path) -> PathBuf {
    let bin = dir.join("bin");
    fs::create_dir_all(&bin).unwrap();
    let tool = bin.join("fxc");
    fs::write(&tool, FAKE_FXC).unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    tool
}

fn project(sources: &[(&str, &str)]) -> (TempDir, BuildConfig) {
    let dir = tempdir().unwrap();
    let mut config = BuildConfig::new(dir.path());
    config.output_dir = dir.path().join("out");
    for (relative, text) in sources {
        let path = config.source_dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }
    (dir, config)
}

#[test]
fn test_two_stages_in_one_file_are_compiled_into_mirrored_tree() {
    let (dir, config) = project(&[(
        "a/foo.hlsl",
        "VS_OUTPUT VS_Main(VS_INPUT input)\n{\n}\n\nfloat4 PS_Main(VS_OUTPUT input) : SV_Target\n{\n}\n",
    )]);
    let compiler = ExternalCompiler::new(ResolvedTool::Found(install_fake_fxc(dir.path())));

    let report = BuildOrchestrator::new(&config, &compiler).run(&mut NullReporter);

    assert_eq!(report.tasks_attempted(), 2);
    assert_eq!(report.total_compiled(), 2);
    assert_eq!(report.status(), BuildStatus::AllSucceeded);
    assert!(dir.path().join("out/a/foo_VS_Main.cso").is_file());
    assert!(dir.path().join("out/a/foo_PS_Main.cso").is_file());

    let outputs: Vec<_> = report.files[0].tasks().iter().map(|t| t.output.clone()).collect();
    assert_eq!(
        outputs,
        vec![
            dir.path().join("out/a/foo_VS_Main.cso"),
            dir.path().join("out/a/foo_PS_Main.cso"),
        ]
    );
}

#[test]
fn test_missing_scan_root_is_a_successful_no_op() {
    let dir = tempdir().unwrap();
    let mut config = BuildConfig::new(dir.path());
    config.output_dir = dir.path().join("out");
    let compiler = ExternalCompiler::new(ResolvedTool::Found(install_fake_fxc(dir.path())));

    let report = BuildOrchestrator::new(&config, &compiler).run(&mut NullReporter);

    assert!(report.root_missing);
    assert_eq!(report.files_processed(), 0);
    assert_eq!(report.status(), BuildStatus::AllSucceeded);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_one_failing_entry_point_keeps_the_other_output() {
    let (dir, config) = project(&[(
        "lighting.hlsl",
        "[numthreads(8, 8, 1)]\nvoid CS_Broken(uint3 id : SV_DispatchThreadID) {}\n\
         [numthreads(8, 8, 1)]\nvoid CS_Tiles(uint3 id : SV_DispatchThreadID) {}\n",
    )]);
    let compiler = ExternalCompiler::new(ResolvedTool::Found(install_fake_fxc(dir.path())));

    let report = BuildOrchestrator::new(&config, &compiler).run(&mut NullReporter);

    let file = &report.files[0];
    assert_eq!(file.compiled(), 1);
    assert_eq!(file.failed(), 1);
    assert_eq!(report.status(), BuildStatus::AnyFailed);
    assert!(dir.path().join("out/lighting_CS_Tiles.cso").is_file());
    assert!(!dir.path().join("out/lighting_CS_Broken.cso").exists());

    match &file.tasks()[0].result {
        Ok(CompilationOutcome::CompilerError {
            exit_code, stderr, ..
        }) => {
            assert_eq!(*exit_code, 1);
            assert!(stderr.contains("error X3000"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_unresolvable_tool_fails_every_task_and_run_completes() {
    let (_dir, config) = project(&[
        ("a.hlsl", "void VS_A() {}"),
        ("b/c.hlsl", "float4 PS_C() : SV_Target {}"),
    ]);
    let tool = locate_tool("fxbuild-definitely-not-installed", &[]);
    let compiler = ExternalCompiler::new(tool);

    let report = BuildOrchestrator::new(&config, &compiler).run(&mut NullReporter);

    assert_eq!(report.files_processed(), 2);
    assert_eq!(report.total_failed(), 2);
    assert_eq!(report.status(), BuildStatus::AnyFailed);
    for file in &report.files {
        assert!(matches!(
            file.tasks()[0].result,
            Ok(CompilationOutcome::ToolMissing { .. })
        ));
    }
}

#[test]
fn test_tool_found_through_search_paths() {
    let (dir, config) = project(&[("a.hlsl", "void VS_A() {}")]);
    install_fake_fxc(dir.path());
    let tool = locate_tool("fxc", &[dir.path().join("bin")]);
    // A real fxc on PATH would also do; either way it must resolve.
    assert!(tool.path().is_some());

    if tool.path() == Some(dir.path().join("bin/fxc").as_path()) {
        let compiler = ExternalCompiler::new(tool);
        let report = BuildOrchestrator::new(&config, &compiler).run(&mut NullReporter);
        assert_eq!(report.status(), BuildStatus::AllSucceeded);
        assert!(dir.path().join("out/a_VS_A.cso").is_file());
    }
}
