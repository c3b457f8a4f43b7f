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

//! The static naming-convention table: which function-name prefix designates
//! which pipeline stage, and which compiler profile that stage targets.

use std::fmt;

/// A pipeline stage recognized by its entry point naming prefix.
///
/// Declaration order is significant: it is the order stages are reported in,
/// and the first declared stage wins should two prefixes ever overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderStage {
    /// `VS_*` functions, compiled with `vs_5_0`.
    Vertex,
    /// `PS_*` functions, compiled with `ps_5_0`.
    Pixel,
    /// `CS_*` functions, compiled with `cs_5_0`.
    Compute,
    /// `GS_*` functions, compiled with `gs_5_0`.
    Geometry,
    /// `HS_*` functions, compiled with `hs_5_0`.
    Hull,
    /// `DS_*` functions, compiled with `ds_5_0`.
    Domain,
}

/// The target passed to the compiler along with a human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilationProfile {
    /// The profile string, e.g. `vs_5_0`.
    pub target: &'static str,
    /// A descriptive label, e.g. `Vertex Shader`.
    pub description: &'static str,
}

impl ShaderStage {
    /// Every stage, in table order.
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::Pixel,
        ShaderStage::Compute,
        ShaderStage::Geometry,
        ShaderStage::Hull,
        ShaderStage::Domain,
    ];

    /// The function-name prefix designating this stage.
    pub const fn prefix(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VS_",
            ShaderStage::Pixel => "PS_",
            ShaderStage::Compute => "CS_",
            ShaderStage::Geometry => "GS_",
            ShaderStage::Hull => "HS_",
            ShaderStage::Domain => "DS_",
        }
    }

    /// Resolves the compilation profile for this stage.
    pub const fn profile(self) -> CompilationProfile {
        match self {
            ShaderStage::Vertex => CompilationProfile {
                target: "vs_5_0",
                description: "Vertex Shader",
            },
            ShaderStage::Pixel => CompilationProfile {
                target: "ps_5_0",
                description: "Pixel Shader",
            },
            ShaderStage::Compute => CompilationProfile {
                target: "cs_5_0",
                description: "Compute Shader",
            },
            ShaderStage::Geometry => CompilationProfile {
                target: "gs_5_0",
                description: "Geometry Shader",
            },
            ShaderStage::Hull => CompilationProfile {
                target: "hs_5_0",
                description: "Hull Shader",
            },
            ShaderStage::Domain => CompilationProfile {
                target: "ds_5_0",
                description: "Domain Shader",
            },
        }
    }

    /// Looks a stage up by its exact prefix token, ignoring ASCII case.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.prefix().eq_ignore_ascii_case(prefix))
    }

    /// Returns the first stage, in table order, whose prefix starts `name`.
    ///
    /// The comparison ignores ASCII case, like the rest of the scanner.
    pub fn for_function_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| {
            let prefix = stage.prefix();
            name.len() >= prefix.len()
                && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
        })
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().description)
    }
}
