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

//! Static discovery of entry points in HLSL source text.
//!
//! A function is an entry point when its declaration has the shape
//!
//! ```text
//! [optional(attribute)]
//! ReturnType   STAGE_Name (
//! ```
//!
//! where `STAGE_` is one of the [`ShaderStage`] prefixes. Matching ignores
//! ASCII case and is not limited to a single line. The attribute is optional
//! and does not take part in the decision: only the return-type word, the
//! whitespace after it, the prefixed name and the opening parenthesis do.

use crate::error::BuildError;
use crate::profile::ShaderStage;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The entry points found in one source file, grouped by stage.
///
/// Stages iterate in table order; names keep their order of appearance and
/// duplicates are preserved as found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPoints {
    by_stage: BTreeMap<ShaderStage, Vec<String>>,
}

impl EntryPoints {
    /// Returns `true` if no entry point was found for any stage.
    pub fn is_empty(&self) -> bool {
        self.by_stage.is_empty()
    }

    /// The total number of entry points across all stages.
    pub fn len(&self) -> usize {
        self.by_stage.values().map(Vec::len).sum()
    }

    /// The names found for `stage`, in order of appearance.
    pub fn get(&self, stage: ShaderStage) -> &[String] {
        self.by_stage.get(&stage).map_or(&[], Vec::as_slice)
    }

    /// Iterates over the stages that have at least one entry point.
    pub fn stages(&self) -> impl Iterator<Item = (ShaderStage, &[String])> {
        self.by_stage
            .iter()
            .map(|(stage, names)| (*stage, names.as_slice()))
    }

    /// Iterates over every `(stage, name)` pair, stage by stage.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderStage, &str)> {
        self.by_stage
            .iter()
            .flat_map(|(stage, names)| names.iter().map(move |name| (*stage, name.as_str())))
    }

    fn push(&mut self, stage: ShaderStage, name: &str) {
        self.by_stage
            .entry(stage)
            .or_default()
            .push(name.to_owned());
    }
}

/// Reads a shader source file, replacing malformed UTF-8 instead of failing.
///
/// Only an I/O failure is an error.
pub fn read_source(path: &Path) -> Result<String, BuildError> {
    let bytes = fs::read(path).map_err(|source| BuildError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Where the scanner stands relative to a potential return type.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Lookbehind {
    /// Nothing usable precedes the current position.
    None,
    /// Directly after a word that can serve as a return type.
    ReturnType,
    /// After a return-type word and at least one whitespace character.
    ReturnTypeSpaced,
}

/// Scans `source` for entry point declarations.
///
/// A file with no match yields an empty [`EntryPoints`]; that is not an error.
pub fn extract_entry_points(source: &str) -> EntryPoints {
    let bytes = source.as_bytes();
    let mut found = EntryPoints::default();
    let mut state = Lookbehind::None;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];

        if is_word_byte(byte) {
            let start = i;
            while i < bytes.len() && is_word_byte(bytes[i]) {
                i += 1;
            }
            let word = &source[start..i];

            if state == Lookbehind::ReturnTypeSpaced {
                if let Some(stage) = ShaderStage::for_function_name(word) {
                    let paren = skip_whitespace(bytes, i);
                    if bytes.get(paren) == Some(&b'(') {
                        found.push(stage, word);
                        i = paren + 1;
                        state = Lookbehind::None;
                        continue;
                    }
                }
            }

            state = if can_be_return_type(word) {
                Lookbehind::ReturnType
            } else {
                Lookbehind::None
            };
        } else if byte.is_ascii_whitespace() {
            if state == Lookbehind::ReturnType {
                state = Lookbehind::ReturnTypeSpaced;
            }
            i += 1;
        } else {
            state = Lookbehind::None;
            i += 1;
        }
    }

    if !found.is_empty() {
        for (stage, names) in found.stages() {
            log::debug!(
                "  Found {} {} entry points: {:?}",
                names.len(),
                stage.prefix(),
                names
            );
        }
    }

    found
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// An identifier needs a letter or underscore somewhere; `4x` reads as `x`.
fn can_be_return_type(word: &str) -> bool {
    word.bytes().any(|b| b.is_ascii_alphabetic() || b == b'_')
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_without_entry_points_yields_empty_mapping() {
        let src = "cbuffer Globals : register(b0) { float4x4 view; };\n\
                   float4 Shade(float3 n) { return float4(n, 1); }\n";
        let found = extract_entry_points(src);
        assert!(found.is_empty());
        assert_eq!(found.len(), 0);
        assert!(extract_entry_points("").is_empty());
    }

    #[test]
    fn single_line_declaration_is_attributed_once() {
        let found = extract_entry_points("PS_INPUT PS_EntryMain(VS_OUTPUT input) : SV_Target");
        assert_eq!(found.get(ShaderStage::Pixel), ["PS_EntryMain"]);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn multi_line_declaration_with_attribute_matches() {
        let src = "[numthreads(8, 8, 1)]\nvoid\n    CS_Blur\n    (uint3 id : SV_DispatchThreadID)\n{\n}\n";
        let found = extract_entry_points(src);
        assert_eq!(found.get(ShaderStage::Compute), ["CS_Blur"]);
    }

    #[test]
    fn matching_ignores_case() {
        let found = extract_entry_points("VOID vs_main() {}\nfloat4 Ps_Main() {}");
        assert_eq!(found.get(ShaderStage::Vertex), ["vs_main"]);
        assert_eq!(found.get(ShaderStage::Pixel), ["Ps_Main"]);
    }

    #[test]
    fn names_keep_order_of_appearance_and_duplicates() {
        let src = "float4 PS_B() {}\nfloat4 PS_A() {}\n// float4 PS_B() {}\n";
        let found = extract_entry_points(src);
        assert_eq!(found.get(ShaderStage::Pixel), ["PS_B", "PS_A", "PS_B"]);
    }

    #[test]
    fn stages_iterate_in_table_order() {
        let src = "[numthreads(1,1,1)] void CS_Main() {}\nfloat4 PS_Main() {}\nVS_OUT VS_Main() {}";
        let found = extract_entry_points(src);
        let order: Vec<_> = found.iter().collect();
        assert_eq!(
            order,
            vec![
                (ShaderStage::Vertex, "VS_Main"),
                (ShaderStage::Pixel, "PS_Main"),
                (ShaderStage::Compute, "CS_Main"),
            ]
        );
    }

    #[test]
    fn calls_and_type_names_are_not_entry_points() {
        let src = "struct PS_INPUT { float4 pos : SV_Position; };\n\
                   float4 c = PS_Helper(x);\n\
                   PS_INPUT o;\n\
                   foo(VS_Thing (1));\n";
        assert!(extract_entry_points(src).is_empty());
    }

    #[test]
    fn return_type_must_contain_a_letter() {
        assert!(extract_entry_points("123 VS_Main()").is_empty());
        assert_eq!(
            extract_entry_points("4x VS_Main()").get(ShaderStage::Vertex),
            ["VS_Main"]
        );
    }

    #[test]
    fn prefixed_word_without_parenthesis_becomes_the_next_return_type() {
        let found = extract_entry_points("void VS_A VS_B(");
        assert_eq!(found.get(ShaderStage::Vertex), ["VS_B"]);
    }

    #[test]
    fn read_source_tolerates_malformed_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"// \xff\xfe broken\nfloat4 PS_Main() : SV_Target {}")
            .unwrap();

        let text = read_source(file.path()).unwrap();
        assert_eq!(
            extract_entry_points(&text).get(ShaderStage::Pixel),
            ["PS_Main"]
        );
    }

    #[test]
    fn read_source_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("absent.hlsl")).unwrap_err();
        assert!(matches!(err, BuildError::SourceRead { .. }));
    }
}
