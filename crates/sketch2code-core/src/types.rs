use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What kind of UI the model is asked to produce from a sketch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentMode {
    #[default]
    FullPage,
    Button,
    Card,
    Form,
}

impl ComponentMode {
    pub const ALL: [ComponentMode; 4] = [
        ComponentMode::FullPage,
        ComponentMode::Button,
        ComponentMode::Card,
        ComponentMode::Form,
    ];

    /// Wire identifier (`full-page`, `button`, `card`, `form`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentMode::FullPage => "full-page",
            ComponentMode::Button => "button",
            ComponentMode::Card => "card",
            ComponentMode::Form => "form",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComponentMode::FullPage => "Full Page",
            ComponentMode::Button => "Button",
            ComponentMode::Card => "Card",
            ComponentMode::Form => "Form",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComponentMode::FullPage => "Complete page layout",
            ComponentMode::Button => "Button component only",
            ComponentMode::Card => "Card component only",
            ComponentMode::Form => "Form component only",
        }
    }

    /// Lenient parse: anything unrecognized is treated as a full page.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "button" => ComponentMode::Button,
            "card" => ComponentMode::Card,
            "form" => ComponentMode::Form,
            _ => ComponentMode::FullPage,
        }
    }
}

impl fmt::Display for ComponentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ComponentMode {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<&str> for ComponentMode {
    fn from(value: &str) -> Self {
        Self::parse_lenient(value)
    }
}

impl From<ComponentMode> for String {
    fn from(mode: ComponentMode) -> Self {
        mode.as_str().to_string()
    }
}

impl FromStr for ComponentMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

static DATA_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^data:([A-Za-z0-9][A-Za-z0-9!#$&^_.+\-]*/[A-Za-z0-9][A-Za-z0-9!#$&^_.+\-]*);base64,(.+)$",
    )
    .expect("data URI pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUriError {
    #[error("not a base64 data URI")]
    Malformed,
    #[error("payload is not valid base64: {0}")]
    Payload(String),
}

/// A `data:<mime>;base64,<payload>` image reference.
///
/// The original string is kept as-is so it reaches the model unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUri {
    raw: String,
    mime_end: usize,
    payload_start: usize,
}

impl DataUri {
    pub fn parse(raw: &str) -> Result<Self, DataUriError> {
        let caps = DATA_URI_RE.captures(raw).ok_or(DataUriError::Malformed)?;
        let mime = caps.get(1).ok_or(DataUriError::Malformed)?;
        let payload = caps.get(2).ok_or(DataUriError::Malformed)?;
        Ok(Self {
            raw: raw.to_string(),
            mime_end: mime.end(),
            payload_start: payload.start(),
        })
    }

    /// Encode raw bytes into a data URI. `mime_type` is a `type/subtype`
    /// token, so the result always reparses with [`DataUri::parse`].
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let raw = format!("data:{mime_type};base64,{}", STANDARD.encode(bytes));
        let mime_end = "data:".len() + mime_type.len();
        Self {
            payload_start: mime_end + ";base64,".len(),
            mime_end,
            raw,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn mime_type(&self) -> &str {
        &self.raw["data:".len()..self.mime_end]
    }

    pub fn payload(&self) -> &str {
        &self.raw[self.payload_start..]
    }

    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        STANDARD
            .decode(self.payload())
            .map_err(|e| DataUriError::Payload(e.to_string()))
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for DataUri {
    type Error = DataUriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DataUri> for String {
    fn from(uri: DataUri) -> Self {
        uri.raw
    }
}

impl FromStr for DataUri {
    type Err = DataUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub image: DataUri,
    pub description: String,
    #[serde(default)]
    pub component_mode: ComponentMode,
}

impl GenerationRequest {
    /// Returns `None` when the description is blank.
    pub fn new(image: DataUri, description: &str, component_mode: ComponentMode) -> Option<Self> {
        let description = description.trim();
        if description.is_empty() {
            return None;
        }
        Some(Self {
            image,
            description: description.to_string(),
            component_mode,
        })
    }
}

/// Generated code returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub html: String,
    pub css: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub react_component: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub react_css: String,
}

impl GenerationResult {
    pub fn has_react(&self) -> bool {
        !self.react_component.is_empty() || !self.react_css.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_mode_lenient_parse() {
        assert_eq!(ComponentMode::parse_lenient("button"), ComponentMode::Button);
        assert_eq!(ComponentMode::parse_lenient(" Card "), ComponentMode::Card);
        assert_eq!(ComponentMode::parse_lenient("form"), ComponentMode::Form);
        assert_eq!(ComponentMode::parse_lenient("navbar"), ComponentMode::FullPage);
        assert_eq!(ComponentMode::parse_lenient(""), ComponentMode::FullPage);
    }

    #[test]
    fn test_component_mode_serde_roundtrip() {
        let json = serde_json::to_string(&ComponentMode::FullPage).unwrap();
        assert_eq!(json, r#""full-page""#);
        let mode: ComponentMode = serde_json::from_str(r#""sidebar""#).unwrap();
        assert_eq!(mode, ComponentMode::FullPage);
    }

    #[test]
    fn test_data_uri_parts() {
        let uri = DataUri::parse("data:image/png;base64,aWtlcG5n").unwrap();
        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.payload(), "aWtlcG5n");
        assert_eq!(uri.as_str(), "data:image/png;base64,aWtlcG5n");
        assert_eq!(uri.decode().unwrap(), b"ikepng");
    }

    #[test]
    fn test_data_uri_rejects_non_base64_uris() {
        assert_eq!(
            DataUri::parse("https://example.com/a.png"),
            Err(DataUriError::Malformed)
        );
        assert_eq!(DataUri::parse("data:image/png;base64,"), Err(DataUriError::Malformed));
        assert_eq!(DataUri::parse("data:image/svg+xml,<svg/>"), Err(DataUriError::Malformed));
    }

    #[test]
    fn test_data_uri_from_bytes_matches_parse() {
        let uri = DataUri::from_bytes("image/jpeg", b"\xff\xd8\xff");
        let reparsed = DataUri::parse(uri.as_str()).unwrap();
        assert_eq!(uri, reparsed);
        assert_eq!(reparsed.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_data_uri_accepts_dotted_and_numeric_subtypes() {
        for mime in ["image/vnd.microsoft.icon", "image/svg+xml", "image/x-3ds", "image/jp2"] {
            let uri = DataUri::from_bytes(mime, b"\x00\x01");
            let reparsed = DataUri::parse(uri.as_str()).unwrap();
            assert_eq!(reparsed.mime_type(), mime);
            assert_eq!(reparsed, uri);
        }

        let json = r#"{"image":"data:image/vnd.microsoft.icon;base64,AAAB","description":"favicon"}"#;
        let req: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.image.mime_type(), "image/vnd.microsoft.icon");
    }

    #[test]
    fn test_generation_request_wire_format() {
        let json = r#"{"image":"data:image/png;base64,AAAA","description":"login card"}"#;
        let req: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.component_mode, ComponentMode::FullPage);
        assert_eq!(req.image.as_str(), "data:image/png;base64,AAAA");

        let back = serde_json::to_value(&req).unwrap();
        assert_eq!(back["componentMode"], "full-page");
        assert_eq!(back["image"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_generation_request_rejects_blank_description() {
        let image = DataUri::parse("data:image/png;base64,AAAA").unwrap();
        assert!(GenerationRequest::new(image.clone(), "   ", ComponentMode::Card).is_none());
        let req = GenerationRequest::new(image, "  a pricing card ", ComponentMode::Card).unwrap();
        assert_eq!(req.description, "a pricing card");
    }

    #[test]
    fn test_generation_result_omits_empty_react_fields() {
        let result = GenerationResult {
            html: "<div/>".into(),
            css: "div{}".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("reactComponent").is_none());
        assert!(!result.has_react());
    }
}
