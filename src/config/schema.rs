/// Configuration schema and defaults for szk.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[backend]`, `[ai]`, and `[shop]`.
///
/// Every field has a built-in default matching the hosted deployment, so a
/// fresh install works against a local backend without any config file.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default merchant-admin backend base URL (local dev server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Fixed timeout for backend requests, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default OpenAI-compatible chat completion endpoint.
pub const DEFAULT_AI_URL: &str = "https://api.silra.cn/v1/chat/completions";

/// Default vision-capable model for review generation.
pub const DEFAULT_MODEL: &str = "qwen3-vl-plus";

/// Default sampling temperature for review generation.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default shop name used in prompt construction.
pub const DEFAULT_SHOP_NAME: &str = "Mahjong";

/// English truthfulness brief injected into every generation prompt.
pub const DEFAULT_BRIEF_EN: &str = "Mahjong is a small-bowl restaurant. \
Near the entrance on the right is a milk-tea counter; further ahead is the \
food serving counter where staff serve small bowls. Only state facts; do \
not invent dishes.";

/// Chinese truthfulness brief injected into every generation prompt.
pub const DEFAULT_BRIEF_ZH: &str = "Mahjong 为小碗菜餐馆。门口右侧为奶茶\
柜台，前方是打饭台，顾客按点单由前台打成小碗上菜。仅陈述事实，不要杜撰菜品。";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level szk configuration.
///
/// Maps directly to the `~/.szk/config.toml` and `.szk.toml` file schemas.
/// All sections and fields are optional — missing values fall back to
/// built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SzkConfig {
    pub backend: BackendConfig,
    pub ai: AiConfig,
    pub shop: ShopConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Merchant-admin backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend base URL. Overridable per-invocation via `--backend` or the
    /// `SZK_BACKEND_URL` environment variable.
    pub base_url: String,
    /// Request timeout for backend calls (milliseconds). No retries.
    pub timeout_ms: u64,
    /// Mock mode — every domain call returns canned data without any
    /// network I/O. Also settable via `SZK_MOCK=1`.
    pub mock: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            mock: false,
        }
    }
}

// ---------------------------------------------------------------------------
// [ai]
// ---------------------------------------------------------------------------

/// Streaming AI endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Chat completion endpoint URL (OpenAI-compatible).
    pub api_url: String,
    /// Bearer API key. Empty means unset; `SILRA_API_KEY` / `SZK_AI_KEY`
    /// environment variables take precedence over this field.
    pub api_key: String,
    /// Model name sent in the request body.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_AI_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

// ---------------------------------------------------------------------------
// [shop]
// ---------------------------------------------------------------------------

/// Shop facts used when building generation prompts.
///
/// The briefs are the ground-truth description the model is told to stick
/// to; they exist so generated reviews never invent dishes or layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Shop display name.
    pub name: String,
    /// English factual brief.
    pub brief_en: String,
    /// Chinese factual brief.
    pub brief_zh: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SHOP_NAME.to_string(),
            brief_en: DEFAULT_BRIEF_EN.to_string(),
            brief_zh: DEFAULT_BRIEF_ZH.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl SzkConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `szk config init` to create a starting config file with all
    /// settings documented.
    pub fn default_toml() -> String {
        r#"# szk Configuration
# Songzike merchant console and review client
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (SZK_BACKEND_URL, SZK_MOCK, SILRA_API_KEY, SZK_AI_KEY, SZK_AI_URL)
#   2. Project config (.szk.toml in current directory)
#   3. User global config (~/.szk/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://localhost:8001"
timeout_ms = 10000                    # Fixed per-request timeout, no retries
mock = false                          # Set true or SZK_MOCK=1 for canned offline data

[ai]
api_url = "https://api.silra.cn/v1/chat/completions"
api_key = ""                          # Prefer SILRA_API_KEY env var over storing the key here
model = "qwen3-vl-plus"
temperature = 0.7

[shop]
name = "Mahjong"
# brief_en / brief_zh are the factual briefs the model must stick to.
# Defaults describe the Mahjong small-bowl restaurant; override per shop.
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
