//! Instruction text sent to the vision model.

use sketch2code_core::types::ComponentMode;

/// Which output fields the model is asked to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptContract {
    /// `html` and `css` only.
    HtmlCss,
    /// `html`, `css`, plus a React component and its CSS module.
    #[default]
    WithReact,
}

pub const FULL_PAGE_INSTRUCTIONS: &str = "Scope: build the complete page layout shown in the sketch. \
Include every visible region (header, navigation, main content sections, sidebars, footer) \
arranged as drawn.";

pub const BUTTON_INSTRUCTIONS: &str = "Scope: build ONLY the button component shown in the sketch. \
Do not generate a page layout, navigation, or any surrounding elements. \
Include hover, focus-visible, active, and disabled states.";

pub const CARD_INSTRUCTIONS: &str = "Scope: build ONLY the card component shown in the sketch. \
Do not generate a page layout or surrounding elements. \
The card should size itself to its container and keep its content (media, title, text, actions) in the drawn order.";

pub const FORM_INSTRUCTIONS: &str = "Scope: build ONLY the form component shown in the sketch. \
Do not generate a page layout or surrounding elements. \
Every input needs an associated <label>, use the appropriate input types, and style focus and invalid states.";

/// The fixed instruction fragment for a component mode.
pub fn mode_instructions(mode: ComponentMode) -> &'static str {
    match mode {
        ComponentMode::FullPage => FULL_PAGE_INSTRUCTIONS,
        ComponentMode::Button => BUTTON_INSTRUCTIONS,
        ComponentMode::Card => CARD_INSTRUCTIONS,
        ComponentMode::Form => FORM_INSTRUCTIONS,
    }
}

const REQUIREMENTS: &str = "Requirements:
1. Generate semantic, accessible HTML5 code
2. Create modern, responsive CSS using plain CSS only (no Tailwind, no preprocessors, no external stylesheets); use Flexbox/Grid where appropriate
3. Use the design details from the description (colors, fonts, layout, etc.)
4. Make the design mobile-first and responsive
5. Include appropriate spacing, padding, and margins
6. Use modern CSS practices (CSS variables, smooth transitions)
7. Ensure the code is clean, well-structured, and commented where helpful
8. If the sketch shows specific UI components (buttons, cards, forms), implement them accurately";

const HTML_CSS_FORMAT: &str = r#"Return your response in the following JSON format:
{
  "html": "<!-- Your HTML code here -->",
  "css": "/* Your CSS code here */"
}"#;

const WITH_REACT_FORMAT: &str = r#"Also provide the same UI as a React function component named GeneratedComponent
(default export) that imports its styles with `import styles from './GeneratedComponent.module.css'`
and applies them through `styles.<className>`, plus the matching CSS module.

Return your response in the following JSON format:
{
  "html": "<!-- Your HTML code here -->",
  "css": "/* Your CSS code here */",
  "reactComponent": "// GeneratedComponent.jsx source here",
  "reactCss": "/* GeneratedComponent.module.css here */"
}"#;

const CLOSING: &str = "IMPORTANT: Return ONLY the JSON object, no additional text or markdown formatting. \
Do not wrap the JSON in code fences.";

/// Prompt for `description` in `mode`, asking for the React output as well.
///
/// Any string converts into a mode; unrecognized values build a full-page prompt.
pub fn build_prompt(description: &str, mode: impl Into<ComponentMode>) -> String {
    build_prompt_with(description, mode, PromptContract::default())
}

pub fn build_prompt_with(
    description: &str,
    mode: impl Into<ComponentMode>,
    contract: PromptContract,
) -> String {
    let mode = mode.into();
    let mut parts = Vec::new();

    parts.push(
        "You are an expert frontend developer. Analyze this UI sketch/wireframe and convert it \
         into clean, modern HTML and CSS code."
            .to_string(),
    );
    parts.push(format!("User's Description: {}", description.trim()));
    parts.push(mode_instructions(mode).to_string());
    parts.push(REQUIREMENTS.to_string());

    let format = match contract {
        PromptContract::HtmlCss => HTML_CSS_FORMAT,
        PromptContract::WithReact => WITH_REACT_FORMAT,
    };
    parts.push(format.to_string());
    parts.push(CLOSING.to_string());

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_prompt_uses_button_fragment_only() {
        let prompt = build_prompt("A big blue sign-up button", "button");
        assert!(prompt.contains(BUTTON_INSTRUCTIONS));
        assert!(!prompt.contains(FULL_PAGE_INSTRUCTIONS));
        assert!(!prompt.contains(CARD_INSTRUCTIONS));
        assert!(prompt.contains("User's Description: A big blue sign-up button"));
    }

    #[test]
    fn test_unknown_mode_falls_back_to_full_page() {
        let prompt = build_prompt("Landing page", "hero-banner");
        assert!(prompt.contains(FULL_PAGE_INSTRUCTIONS));
        assert!(!prompt.contains(BUTTON_INSTRUCTIONS));
    }

    #[test]
    fn test_each_mode_has_distinct_fragment() {
        for mode in ComponentMode::ALL {
            let prompt = build_prompt("x", mode);
            for other in ComponentMode::ALL {
                assert_eq!(
                    prompt.contains(mode_instructions(other)),
                    mode == other,
                    "{mode} prompt vs {other} fragment"
                );
            }
        }
    }

    #[test]
    fn test_contracts() {
        let plain = build_prompt_with("Card", ComponentMode::Card, PromptContract::HtmlCss);
        assert!(plain.contains("\"css\""));
        assert!(!plain.contains("reactComponent"));

        let rich = build_prompt("Card", ComponentMode::Card);
        assert!(rich.contains("reactComponent"));
        assert!(rich.contains("GeneratedComponent.module.css"));
    }

    #[test]
    fn test_output_rules_present() {
        let prompt = build_prompt("Form", "form");
        assert!(prompt.contains("mobile-first"));
        assert!(prompt.contains("plain CSS only"));
        assert!(prompt.contains("Return ONLY the JSON object"));
        assert!(prompt.contains("code fences"));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(build_prompt("same", "card"), build_prompt("same", "card"));
    }
}
