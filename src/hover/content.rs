//! Renderable hover content

use serde::Serialize;

/// Host command bound to the generate prompt link
pub const SHOW_COPILOT_HOVER_COMMAND: &str = "C_Cpp.ShowCopilotHover";

const LOADING_MARKDOWN: &str = "$(loading~spin)";

/// What the hover shows. Markdown is rendered by the host; theme icons
/// (`$(name)`) and command links only work when the matching flag is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverContent {
    /// Generated description, shown as plain markdown
    Description(String),
    /// Spinner while generation runs
    Loading,
    /// Link that runs the generate command
    GeneratePrompt,
}

impl HoverContent {
    pub fn markdown(&self) -> String {
        match self {
            HoverContent::Description(text) => text.clone(),
            HoverContent::Loading => LOADING_MARKDOWN.to_string(),
            HoverContent::GeneratePrompt => format!(
                "$(sparkle) [Generate Copilot Description](command:{SHOW_COPILOT_HOVER_COMMAND})"
            ),
        }
    }

    pub fn supports_theme_icons(&self) -> bool {
        !matches!(self, HoverContent::Description(_))
    }

    /// Whether command links in the markdown may run
    pub fn is_trusted(&self) -> bool {
        matches!(self, HoverContent::GeneratePrompt)
    }

    /// Markdown together with its rendering flags, as a host would receive it
    pub fn rendered(&self) -> RenderedHover {
        RenderedHover {
            markdown: self.markdown(),
            is_trusted: self.is_trusted(),
            support_theme_icons: self.supports_theme_icons(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedHover {
    pub markdown: String,
    pub is_trusted: bool,
    pub support_theme_icons: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_markdown() {
        let prompt = HoverContent::GeneratePrompt;
        assert_eq!(
            prompt.markdown(),
            "$(sparkle) [Generate Copilot Description](command:C_Cpp.ShowCopilotHover)"
        );
        assert!(prompt.supports_theme_icons());
        assert!(prompt.is_trusted());
    }

    #[test]
    fn test_loading_markdown() {
        assert_eq!(HoverContent::Loading.markdown(), "$(loading~spin)");
        assert!(HoverContent::Loading.supports_theme_icons());
        assert!(!HoverContent::Loading.is_trusted());
    }

    #[test]
    fn test_description_is_untrusted_markdown() {
        let description = HoverContent::Description("Frees the buffer.".to_string());
        assert!(!description.is_trusted());
        assert!(!description.supports_theme_icons());

        assert_eq!(
            serde_json::to_value(description.rendered()).unwrap(),
            serde_json::json!({
                "markdown": "Frees the buffer.",
                "isTrusted": false,
                "supportThemeIcons": false,
            })
        );
    }
}
