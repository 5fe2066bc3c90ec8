//! Custom `cpptools/*` requests understood by the C/C++ language server

use lsp_types::Position;
use lsp_types::request::Request;
use serde::{Deserialize, Serialize};

use crate::context::{ChatContextResult, ProjectContextResult};

/// Params of `cpptools/getCopilotHoverInfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetCopilotHoverInfoParams {
    pub uri: String,
    pub position: Position,
}

/// Result of `cpptools/getCopilotHoverInfo`; `content` is the description text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetCopilotHoverInfoResult {
    #[serde(default)]
    pub content: String,
}

pub enum GetCopilotHoverInfoRequest {}

impl Request for GetCopilotHoverInfoRequest {
    type Params = GetCopilotHoverInfoParams;
    type Result = GetCopilotHoverInfoResult;
    const METHOD: &'static str = "cpptools/getCopilotHoverInfo";
}

/// Params shared by the chat and project context requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentUriParams {
    pub uri: String,
}

pub enum GetChatContextRequest {}

impl Request for GetChatContextRequest {
    type Params = DocumentUriParams;
    type Result = Option<ChatContextResult>;
    const METHOD: &'static str = "cpptools/getChatContext";
}

pub enum GetProjectContextRequest {}

impl Request for GetProjectContextRequest {
    type Params = DocumentUriParams;
    type Result = Option<ProjectContextResult>;
    const METHOD: &'static str = "cpptools/getProjectContext";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hover_params_wire_shape() {
        let params = GetCopilotHoverInfoParams {
            uri: "file:///src/a.cpp".to_string(),
            position: Position::new(10, 3),
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({ "uri": "file:///src/a.cpp", "position": { "line": 10, "character": 3 } })
        );
    }

    #[test]
    fn test_null_project_context_is_none() {
        let result: <GetProjectContextRequest as Request>::Result =
            serde_json::from_value(serde_json::Value::Null).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_project_context_result_parses_file_context() {
        let result: <GetProjectContextRequest as Request>::Result = serde_json::from_value(json!({
            "language": "cpp",
            "standardVersion": "c++17",
            "compiler": "gcc",
            "targetPlatform": "Linux",
            "targetArchitecture": "x64",
            "fileContext": { "compilerArguments": ["-O2", "-fno-rtti"] }
        }))
        .unwrap();
        let result = result.unwrap();
        assert_eq!(result.fields.compiler, "gcc");
        assert_eq!(result.file_context.compiler_arguments, vec!["-O2", "-fno-rtti"]);
    }
}
