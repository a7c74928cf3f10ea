//! Output documents built from a [`GenerationResult`](sketch2code_core::types::GenerationResult).

/// File name the React bundle's CSS module is imported under.
pub const REACT_CSS_MODULE: &str = "GeneratedComponent.module.css";

/// A standalone page with `css` inlined after a small reset.
pub fn full_html_document(html: &str, css: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <style>
    * {{ box-sizing: border-box; }}
    body {{ margin: 0; font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif; }}
{css}
  </style>
</head>
<body>
{html}
</body>
</html>
"#
    )
}

/// The component followed by its CSS module, or whichever part is present.
pub fn react_bundle(component: &str, css: &str) -> String {
    match (component.is_empty(), css.is_empty()) {
        (true, true) => String::new(),
        (false, false) => format!("{component}\n\n/* {REACT_CSS_MODULE} */\n{css}"),
        (false, true) => component.to_string(),
        (true, false) => css.to_string(),
    }
}
