//! Runtime settings for the copilot.

use std::path::PathBuf;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Header names looked up by the feature extractor.
#[derive(Debug, Clone)]
pub struct ColumnNames {
    pub revenue: String,
    pub quantity: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            revenue: "ca".to_string(),
            quantity: "quantite".to_string(),
        }
    }
}

/// Random forest parameters.
#[derive(Debug, Clone)]
pub struct ForestSettings {
    /// Number of trees in the ensemble (default: 100)
    pub n_trees: usize,

    /// Seed for bootstrap and feature sampling; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for ForestSettings {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl ChatSettings {
    pub fn from_env(api_url: String, model: String) -> crate::error::Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(crate::error::CopilotError::MissingCredential(API_KEY_VAR))?;

        Ok(Self {
            api_key,
            api_url,
            model,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub history_path: PathBuf,
    pub columns: ColumnNames,
    pub forest: ForestSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from("history.csv"),
            columns: ColumnNames::default(),
            forest: ForestSettings::default(),
        }
    }
}
