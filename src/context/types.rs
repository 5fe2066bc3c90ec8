//! Context shapes exchanged with the language server and returned to callers

use serde::{Deserialize, Serialize};

use crate::telemetry::TelemetryProperties;

/// Metadata fields shared by the chat and project context results.
///
/// Missing fields deserialize as empty strings, which is also the
/// "unknown" marker after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextFields {
    pub language: String,
    pub standard_version: String,
    pub compiler: String,
    pub target_platform: String,
    pub target_architecture: String,
}

impl ContextFields {
    /// Copy every non-empty field into `properties` under its camelCase name
    pub fn record_into(&self, properties: &mut TelemetryProperties) {
        let entries = [
            ("language", &self.language),
            ("standardVersion", &self.standard_version),
            ("compiler", &self.compiler),
            ("targetPlatform", &self.target_platform),
            ("targetArchitecture", &self.target_architecture),
        ];
        for (key, value) in entries {
            if !value.is_empty() {
                properties.insert(key.to_string(), value.clone());
            }
        }
    }
}

/// Result of `cpptools/getChatContext`
pub type ChatContextResult = ContextFields;

/// Per-file compilation details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileContext {
    pub compiler_arguments: Vec<String>,
}

/// Result of `cpptools/getProjectContext`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectContextResult {
    #[serde(flatten)]
    pub fields: ContextFields,
    pub file_context: FileContext,
}

/// Normalized project context handed to the completions provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub language: String,
    pub standard_version: String,
    pub compiler: String,
    pub target_platform: String,
    pub target_architecture: String,
    /// Allow-listed compiler arguments; empty unless a filter matched
    pub compiler_arguments: Vec<String>,
}

impl From<ContextFields> for ProjectContext {
    fn from(fields: ContextFields) -> Self {
        Self {
            language: fields.language,
            standard_version: fields.standard_version,
            compiler: fields.compiler,
            target_platform: fields.target_platform,
            target_architecture: fields.target_architecture,
            compiler_arguments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_context_result_wire_shape() {
        let result: ProjectContextResult = serde_json::from_str(
            r#"{
                "language": "cpp",
                "standardVersion": "c++20",
                "compiler": "gcc",
                "targetPlatform": "Linux",
                "targetArchitecture": "arm64",
                "fileContext": { "compilerArguments": ["-O2", "-fno-rtti"] }
            }"#,
        )
        .unwrap();

        assert_eq!(result.fields.language, "cpp");
        assert_eq!(result.fields.standard_version, "c++20");
        assert_eq!(result.fields.target_architecture, "arm64");
        assert_eq!(result.file_context.compiler_arguments, vec!["-O2", "-fno-rtti"]);
    }

    #[test]
    fn test_record_into_skips_empty_fields() {
        let fields = ContextFields {
            language: "C".to_string(),
            target_architecture: "arm64".to_string(),
            ..Default::default()
        };
        let mut properties = TelemetryProperties::new();
        fields.record_into(&mut properties);

        assert_eq!(properties.len(), 2);
        assert_eq!(properties["language"], "C");
        assert_eq!(properties["targetArchitecture"], "arm64");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let result: ChatContextResult = serde_json::from_str(r#"{"language": "c"}"#).unwrap();
        assert_eq!(result.language, "c");
        assert!(result.compiler.is_empty());
        assert!(result.target_architecture.is_empty());
    }
}
