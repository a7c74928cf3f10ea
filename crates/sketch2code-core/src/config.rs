//! Configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::ComponentMode;

/// Top-level Sketch2Code configuration, read from a JSON5 file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub canvas: Option<CanvasConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Configuration for the vision model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider id: "openrouter" (default), "openai", "ollama" or "google".
    #[serde(default = "default_provider_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sent as `HTTP-Referer` to OpenRouter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    /// Sent as `X-Title` to OpenRouter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_provider_id() -> String {
    "openrouter".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            id: default_provider_id(),
            api_key_env: None,
            api_key: None,
            base_url: None,
            model: None,
            site_url: None,
            app_name: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ProviderConfig {
    /// Resolve the API key: `api_key` first, then `api_key_env`, then the
    /// provider's conventional environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        let env_var = self
            .api_key_env
            .clone()
            .or_else(|| self.default_api_key_env().map(String::from));
        resolve_secret_field(&self.api_key, &env_var)
    }

    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self.id.as_str() {
            "openrouter" => Some("OPENROUTER_API_KEY"),
            "openai" => Some("OPENAI_API_KEY"),
            "google" => Some("GEMINI_API_KEY"),
            _ => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        self.id != "ollama"
    }

    /// Model name, falling back to a vision-capable default per provider.
    pub fn model(&self) -> String {
        if let Some(model) = &self.model {
            return model.clone();
        }
        match self.id.as_str() {
            "openai" => "gpt-4o-mini",
            "google" => "gemini-1.5-flash",
            "ollama" => "llava",
            _ => "openai/gpt-4o-mini",
        }
        .to_string()
    }

    pub fn app_name(&self) -> String {
        self.app_name
            .clone()
            .unwrap_or_else(|| "Sketch2Code AI".to_string())
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(0.2)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(4096)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on a single generation round-trip, in seconds (default: 60).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Base URL of a remote `/api/generate` service. Unset means generate in-process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<ComponentMode>,

    /// Ask the model for a React component alongside HTML/CSS (default: true).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub react_output: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_width")]
    pub width: u32,

    #[serde(default = "default_canvas_height")]
    pub height: u32,

    /// Background color as hex (default: "#ffffff").
    #[serde(default = "default_canvas_background")]
    pub background: String,

    /// TTF/OTF font used to rasterize text objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<String>,
}

fn default_canvas_width() -> u32 {
    600
}

fn default_canvas_height() -> u32 {
    400
}

fn default_canvas_background() -> String {
    "#ffffff".into()
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            background: default_canvas_background(),
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "sketch2code_codegen=debug").
    #[serde(default)]
    pub filters: Vec<String>,

    /// Output target: "stderr" (default) or "stdout".
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_format() -> String {
    "plain".into()
}

fn default_log_output() -> String {
    "stderr".into()
}

/// Resolve a secret: check the direct value first, then the env-var reference.
pub fn resolve_secret_field(direct: &Option<String>, env_var: &Option<String>) -> Option<String> {
    if let Some(val) = direct {
        if !val.is_empty() {
            return Some(val.clone());
        }
    }
    if let Some(env) = env_var {
        if let Ok(val) = std::env::var(env) {
            if !val.is_empty() {
                return Some(val);
            }
        }
    }
    None
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment variable values.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid");
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::Sketch2CodeError::Io)?;
        let substituted = substitute_env_vars(&raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::Sketch2CodeError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Default config file location.
    pub fn config_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// Provider settings, defaulting to OpenRouter.
    pub fn provider(&self) -> ProviderConfig {
        self.provider.clone().unwrap_or_default()
    }

    pub fn canvas(&self) -> CanvasConfig {
        self.canvas.clone().unwrap_or_default()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.generation
            .as_ref()
            .and_then(|g| g.timeout_secs)
            .unwrap_or(60)
    }

    pub fn endpoint(&self) -> Option<String> {
        self.generation
            .as_ref()
            .and_then(|g| g.endpoint.clone())
            .filter(|e| !e.trim().is_empty())
    }

    pub fn default_mode(&self) -> ComponentMode {
        self.generation
            .as_ref()
            .and_then(|g| g.default_mode)
            .unwrap_or_default()
    }

    pub fn react_output(&self) -> bool {
        self.generation
            .as_ref()
            .and_then(|g| g.react_output)
            .unwrap_or(true)
    }

    /// Resolve the font path, expanding `~`.
    pub fn font_path(&self) -> Option<PathBuf> {
        self.canvas
            .as_ref()
            .and_then(|c| c.font_path.as_ref())
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
    }

    /// Get a config value by dotted path (e.g. "provider.model", "canvas.width").
    pub fn get_path(&self, path: &str) -> Option<serde_json::Value> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        let provider = self.provider();
        if provider.requires_api_key() && provider.resolve_api_key().is_none() {
            warnings.push(format!(
                "Provider '{}' has no API key configured",
                provider.id
            ));
        }
        if !matches!(
            provider.id.as_str(),
            "openrouter" | "openai" | "ollama" | "google"
        ) {
            errors.push(format!("Unknown provider '{}'", provider.id));
        }

        if self.timeout_secs() == 0 {
            errors.push("Generation timeout cannot be 0".to_string());
        }

        if let Some(canvas) = &self.canvas {
            if canvas.width == 0 || canvas.height == 0 {
                errors.push(format!(
                    "Canvas dimensions must be non-zero (got {}x{})",
                    canvas.width, canvas.height
                ));
            }
            if !is_hex_color(&canvas.background) {
                errors.push(format!(
                    "Canvas background is not a hex color: {}",
                    canvas.background
                ));
            }
        }

        if let Some(font) = self.font_path() {
            if !font.exists() {
                errors.push(format!("Font file not found: {}", font.display()));
            }
        }

        (warnings, errors)
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Base directory for Sketch2Code data: `~/.sketch2code/`
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sketch2code")
}
