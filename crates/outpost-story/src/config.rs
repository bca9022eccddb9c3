//! Backend configuration.
//!
//! The API credential is mandatory and comes from the environment; the
//! client cannot be built without it.

use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// Checked in order; the first non-empty value wins.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key found; set GEMINI_API_KEY or API_KEY in the environment")]
    MissingApiKey,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Clone)]
pub struct StoryConfig {
    pub api_key: String,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
}

impl std::fmt::Debug for StoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .finish()
    }
}

impl StoryConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| non_empty(*name))
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key.trim());
        if let Some(base) = non_empty("OUTPOST_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = non_empty("OUTPOST_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(model) = non_empty("OUTPOST_IMAGE_MODEL") {
            config.image_model = model;
        }
        Ok(config)
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn text_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.text_model)
    }

    pub fn image_url(&self) -> String {
        format!("{}/models/{}:predict", self.api_base, self.image_model)
    }
}
