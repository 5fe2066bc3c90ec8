//! Lookup tables from raw language-server tokens to display labels

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::ContextFields;

/// Fields that are normalized against a lookup table.
///
/// `targetArchitecture` is deliberately absent: it passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownField {
    Language,
    Compiler,
    StandardVersion,
    TargetPlatform,
}

impl KnownField {
    pub const ALL: [KnownField; 4] = [
        KnownField::Language,
        KnownField::Compiler,
        KnownField::StandardVersion,
        KnownField::TargetPlatform,
    ];

    fn value_mut(self, fields: &mut ContextFields) -> &mut String {
        match self {
            KnownField::Language => &mut fields.language,
            KnownField::Compiler => &mut fields.compiler,
            KnownField::StandardVersion => &mut fields.standard_version,
            KnownField::TargetPlatform => &mut fields.target_platform,
        }
    }
}

/// Raw token → display label tables. Keys are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KnownValues {
    pub language: BTreeMap<String, String>,
    pub compiler: BTreeMap<String, String>,
    pub standard_version: BTreeMap<String, String>,
    pub target_platform: BTreeMap<String, String>,
}

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(raw, label)| (raw.to_string(), label.to_string()))
        .collect()
}

impl Default for KnownValues {
    fn default() -> Self {
        Self {
            language: table(&[("c", "C"), ("cpp", "C++"), ("cuda-cpp", "CUDA C++")]),
            compiler: table(&[("msvc", "MSVC"), ("clang", "Clang"), ("gcc", "GCC")]),
            standard_version: table(&[
                ("c++98", "C++98"),
                ("c++03", "C++03"),
                ("c++11", "C++11"),
                ("c++14", "C++14"),
                ("c++17", "C++17"),
                ("c++20", "C++20"),
                ("c++23", "C++23"),
                ("c90", "C90"),
                ("c99", "C99"),
                ("c11", "C11"),
                ("c17", "C17"),
                ("c23", "C23"),
            ]),
            // The server reports Linux capitalized
            target_platform: table(&[("windows", "Windows"), ("Linux", "Linux"), ("macos", "macOS")]),
        }
    }
}

impl KnownValues {
    fn table_for(&self, field: KnownField) -> &BTreeMap<String, String> {
        match field {
            KnownField::Language => &self.language,
            KnownField::Compiler => &self.compiler,
            KnownField::StandardVersion => &self.standard_version,
            KnownField::TargetPlatform => &self.target_platform,
        }
    }

    /// Display label for `raw`, or `""` when the token is not in the table.
    pub fn label(&self, field: KnownField, raw: &str) -> String {
        self.table_for(field).get(raw).cloned().unwrap_or_default()
    }

    /// Replace every known field with its display label.
    ///
    /// Unrecognized values become `""`; empty values stay empty; other
    /// fields are returned untouched.
    pub fn normalize(&self, mut fields: ContextFields) -> ContextFields {
        for field in KnownField::ALL {
            let value = field.value_mut(&mut fields);
            if !value.is_empty() {
                *value = self.label(field, value);
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(language: &str, standard: &str, compiler: &str, platform: &str, arch: &str) -> ContextFields {
        ContextFields {
            language: language.to_string(),
            standard_version: standard.to_string(),
            compiler: compiler.to_string(),
            target_platform: platform.to_string(),
            target_architecture: arch.to_string(),
        }
    }

    #[test]
    fn test_normalize_known_values() {
        let normalized =
            KnownValues::default().normalize(raw("cpp", "c++20", "msvc", "windows", "x64"));

        assert_eq!(normalized, raw("C++", "C++20", "MSVC", "Windows", "x64"));
    }

    #[test]
    fn test_normalize_unknown_values_become_empty() {
        let normalized =
            KnownValues::default().normalize(raw("java", "gnu++17", "javac", "arduino", "bar"));

        assert_eq!(normalized, raw("", "", "", "", "bar"));
    }

    #[test]
    fn test_normalize_single_compiler() {
        let values = KnownValues::default();
        let gcc = values.normalize(ContextFields {
            compiler: "gcc".to_string(),
            ..Default::default()
        });
        let javac = values.normalize(ContextFields {
            compiler: "javac".to_string(),
            ..Default::default()
        });

        assert_eq!(gcc.compiler, "GCC");
        assert_eq!(javac.compiler, "");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let values = KnownValues::default();
        assert_eq!(values.label(KnownField::TargetPlatform, "Linux"), "Linux");
        assert_eq!(values.label(KnownField::TargetPlatform, "linux"), "");
        assert_eq!(values.label(KnownField::Compiler, "GCC"), "");
    }

    #[test]
    fn test_injected_table_replaces_defaults() {
        let mut values = KnownValues::default();
        values.compiler = table(&[("icx", "Intel oneAPI")]);

        let normalized = values.normalize(ContextFields {
            compiler: "icx".to_string(),
            language: "c".to_string(),
            ..Default::default()
        });
        assert_eq!(normalized.compiler, "Intel oneAPI");
        assert_eq!(normalized.language, "C");
        assert_eq!(values.label(KnownField::Compiler, "gcc"), "");
    }

    #[test]
    fn test_partial_table_deserialization_keeps_other_defaults() {
        let values: KnownValues =
            serde_json::from_str(r#"{"targetPlatform": {"freebsd": "FreeBSD"}}"#).unwrap();

        assert_eq!(values.label(KnownField::TargetPlatform, "freebsd"), "FreeBSD");
        assert_eq!(values.label(KnownField::TargetPlatform, "windows"), "");
        assert_eq!(values.label(KnownField::Language, "cuda-cpp"), "CUDA C++");
    }
}
