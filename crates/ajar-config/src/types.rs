//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [storage]     # data dir and backing files
//! [memory]      # retrieval defaults
//! [assistant]   # models used by the chat / slicing flows
//! [dataset]     # dataset build settings
//! ```

use serde::{Deserialize, Serialize};

use crate::storage::StorageConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AjarConfig {
    /// Storage layout.
    pub storage: Option<StorageConfig>,

    /// Memory retrieval configuration.
    pub memory: Option<MemoryConfig>,

    /// Assistant flow configuration.
    pub assistant: Option<AssistantConfig>,

    /// Dataset build configuration.
    pub dataset: Option<DatasetConfig>,
}

impl AjarConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config with every section filled with its defaults, as written by `ajar config init`.
    pub fn with_defaults() -> Self {
        Self {
            storage: Some(StorageConfig::default()),
            memory: Some(MemoryConfig::default()),
            assistant: Some(AssistantConfig::default()),
            dataset: Some(DatasetConfig::default()),
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: AjarConfig) {
        if other.storage.is_some() {
            self.storage = other.storage;
        }
        if other.memory.is_some() {
            self.memory = other.memory;
        }
        if other.assistant.is_some() {
            self.assistant = other.assistant;
        }
        if other.dataset.is_some() {
            self.dataset = other.dataset;
        }
    }

    /// Storage section, or defaults.
    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    /// Memory section, or defaults.
    pub fn memory(&self) -> MemoryConfig {
        self.memory.clone().unwrap_or_default()
    }

    /// Assistant section, or defaults.
    pub fn assistant(&self) -> AssistantConfig {
        self.assistant.clone().unwrap_or_default()
    }

    /// Dataset section, or defaults.
    pub fn dataset(&self) -> DatasetConfig {
        self.dataset.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// Memory retrieval configuration.
///
/// ```toml
/// [memory]
/// default_limit = 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Maximum notes returned by a relevance query when the caller gives no limit.
    pub default_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { default_limit: 5 }
    }
}

/// Environment variable overriding the chat model.
pub const CODER_MODEL_ENV: &str = "AJAR_CODER_MODEL";

/// Environment variable overriding the vision model.
pub const VISION_MODEL_ENV: &str = "AJAR_VISION_MODEL";

/// Models and defaults for the request-side flows.
///
/// ```toml
/// [assistant]
/// model = "qwen2.5-coder:3b"
/// vision_model = "qwen2.5vl:3b"
/// default_session = "default"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Model used for text chat.
    pub model: String,
    /// Model used for image-to-layout slicing.
    pub vision_model: String,
    /// Session used when a request does not name one.
    pub default_session: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "qwen2.5-coder:3b".to_string(),
            vision_model: "qwen2.5vl:3b".to_string(),
            default_session: "default".to_string(),
        }
    }
}

impl AssistantConfig {
    /// Chat model, honoring `AJAR_CODER_MODEL`.
    pub fn effective_model(&self) -> String {
        env_or(CODER_MODEL_ENV, &self.model)
    }

    /// Vision model, honoring `AJAR_VISION_MODEL`.
    pub fn effective_vision_model(&self) -> String {
        env_or(VISION_MODEL_ENV, &self.vision_model)
    }
}

fn env_or(var: &str, fallback: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Dataset build configuration.
///
/// ```toml
/// [dataset]
/// fallback_instruction = "Revise the following answer to match the project's preferences."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Instruction used for a memory sample whose content normalizes to empty.
    /// Unset means the builder's built-in instruction.
    pub fallback_instruction: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
