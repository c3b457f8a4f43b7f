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
use fxbuild_core::{extract_entry_points, read_source, BuildConfig, OutputPlanner};

/// Prints every entry point and where it would be compiled to.
///
/// Nothing is created on disk and the compiler is never run. Returns `false`
/// if some file could not be read.
pub fn run(config: &BuildConfig) -> Result<bool> {
    print_task_start("Listing Entry Points", MAGNIFIER, MAGENTA);

    let Some(sources) = config.sources() else {
        print_warning(&format!(
            "Shaders directory not found: {}",
            config.source_dir.display()
        ));
        return Ok(true);
    };

    let planner = OutputPlanner::new(&config.output_dir);
    let mut all_readable = true;
    let mut total = 0;

    for source in sources {
        let text = match read_source(source.path()) {
            Ok(text) => text,
            Err(e) => {
                print_error(&e.to_string());
                all_readable = false;
                continue;
            }
        };

        let entry_points = extract_entry_points(&text);
        println!(
            "{}{}{}{} ({} entry points)",
            BOLD,
            CYAN,
            source.relative_path().display(),
            RESET,
            entry_points.len()
        );
        for (stage, entry_point) in entry_points.iter() {
            println!(
                "  {} {}{:<8}{} {:<24} -> {}",
                GEAR,
                YELLOW,
                stage.profile().target,
                RESET,
                entry_point,
                planner.output_path(&source, entry_point).display()
            );
        }
        total += entry_points.len();
    }

    print_success(&format!("{} entry points found", total));
    Ok(all_readable)
}
