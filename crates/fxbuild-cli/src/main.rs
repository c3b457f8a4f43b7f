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

// HLSL shader build tool
// Run with: fxbuild [compile|list] [options]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fxbuild_core::config::MANIFEST_FILE;
use fxbuild_core::{BuildConfig, ShaderManifest};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod helpers;

/// Compile HLSL shaders with automatic entry point detection.
///
/// Entry points are found by name: VS_* (vs_5_0), PS_* (ps_5_0),
/// CS_* (cs_5_0), GS_* (gs_5_0), HS_* (hs_5_0) and DS_* (ds_5_0).
/// Each one is compiled to `<file>_<EntryPoint>.cso`.
#[derive(Parser, Debug)]
#[command(name = "fxbuild", version, about, long_about)]
struct Cli {
    /// Project root directory.
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Output directory for compiled shaders (default: build/bin/shaders).
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Manifest file (default: <project-root>/Shaders.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile every entry point (the default).
    Compile {
        /// Only compile these files, by file name or path relative to the shader directory.
        files: Vec<PathBuf>,

        /// Kill a compiler invocation after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List discovered entry points without compiling.
    List {
        /// Only list these files, by file name or path relative to the shader directory.
        files: Vec<PathBuf>,
    },
}

fn init_logger(verbose: bool) {
    use env_logger::{Builder, Env};

    let level = if verbose { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<BuildConfig> {
    let project_root = std::path::absolute(&cli.project_root).with_context(|| {
        format!(
            "Failed to resolve project root '{}'",
            cli.project_root.display()
        )
    })?;
    let manifest_path = cli
        .config
        .clone()
        .unwrap_or_else(|| project_root.join(MANIFEST_FILE));
    let manifest = ShaderManifest::load_or_default(&manifest_path)?;

    let mut config = BuildConfig::from_manifest(project_root, manifest);
    if let Some(dir) = &cli.output_dir {
        config.output_dir = std::path::absolute(dir)
            .with_context(|| format!("Failed to resolve output directory '{}'", dir.display()))?;
    }

    log::debug!("Project Root: {}", config.project_root.display());
    log::debug!("Shaders Directory: {}", config.source_dir.display());
    log::debug!("Output Directory: {}", config.output_dir.display());
    Ok(config)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = load_config(&cli)?;

    let succeeded = match cli.command {
        None => commands::compile::run(&config)?,
        Some(Commands::Compile { files, timeout }) => {
            config.only = files;
            if let Some(secs) = timeout {
                config.compiler.timeout = Some(std::time::Duration::from_secs(secs));
            }
            commands::compile::run(&config)?
        }
        Some(Commands::List { files }) => {
            config.only = files;
            commands::list::run(&config)?
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
