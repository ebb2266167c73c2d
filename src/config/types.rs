// Configuration type definitions

use serde::{Deserialize, Serialize};

use super::keys::KeyBinding;
use crate::classifier::DEFAULT_MINIMUM_FRAGMENT_LENGTH;
use crate::overlay::GhostTextStyle;

pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 8000;

/// Inline suggestion behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// When false the engine does no work at all
    pub enabled: bool,
    /// Quiet period after the last edit before a suggestion is requested
    pub debounce_ms: u64,
    /// Minimum trailing fragment length (in characters) worth completing
    pub min_fragment_length: usize,
    /// Upper bound for one provider call, 0 disables the bound
    pub fetch_timeout_ms: u64,
    pub accept_key: KeyBinding,
    pub dismiss_key: KeyBinding,
    /// Badge shown next to the ghost text, defaults to the accept key's name
    pub badge_label: Option<String>,
    pub ghost_style: GhostTextStyle,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        SuggestionConfig {
            enabled: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_fragment_length: DEFAULT_MINIMUM_FRAGMENT_LENGTH,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            accept_key: KeyBinding::tab(),
            dismiss_key: KeyBinding::esc(),
            badge_label: None,
            ghost_style: GhostTextStyle::default(),
        }
    }
}

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderType {
    #[default]
    Anthropic,
    #[serde(alias = "openai-compatible")]
    OpenAi,
}

/// `[ai.anthropic]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        AnthropicConfig {
            api_key: None,
            model: Some("claude-3-5-haiku-latest".to_string()),
            max_tokens: 64,
        }
    }
}

/// `[ai.openai]` section, also used for OpenAI-compatible servers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            model: Some("gpt-4o-mini".to_string()),
            max_tokens: 64,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// `[ai]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AiConfig {
    pub provider: AiProviderType,
    pub anthropic: AnthropicConfig,
    pub openai: OpenAiConfig,
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub suggestion: SuggestionConfig,
    pub ai: AiConfig,
}
