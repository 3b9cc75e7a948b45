use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{endpoints, env, models, paths};
use crate::error::{GrokgramError, Result};
use crate::llm::ChatId;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub telegram: TelegramSettings,
    pub grok: GrokSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelegramSettings {
    pub token: String,
    /// Chats the bot answers. Everyone else is ignored.
    pub allowed_users: Vec<i64>,
    /// Chat that receives operational errors.
    pub error_log_user: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrokSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub fast_model: String,
    pub temperature: f32,
    /// Replaces the built-in system instruction when non-blank.
    pub system_prompt: Option<String>,
}

impl Default for GrokSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: endpoints::GROK_BASE_URL.to_string(),
            model: models::GROK_MODEL.to_string(),
            fast_model: models::GROK_FAST_MODEL.to_string(),
            temperature: models::TEMPERATURE,
            system_prompt: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    /// Load settings from `path` (or the default location), then apply the
    /// process environment on top.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| GrokgramError::config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GrokgramError::config(e.to_string()))
    }

    /// Override fields from environment-style variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(token) = var(env::TELEGRAM_TOKEN) {
            self.telegram.token = token;
        }
        if let Some(key) = var(env::GROK_API_TOKEN) {
            self.grok.api_key = key;
        }
        if let Some(prompt) = var(env::SYSTEM_PROMPT) {
            self.grok.system_prompt = Some(prompt);
        }
        if let Some(users) = var(env::ALLOWED_USERS) {
            self.telegram.allowed_users = parse_chat_ids(&users)
                .map_err(|e| GrokgramError::config(format!("invalid {}: {e}", env::ALLOWED_USERS)))?;
        }
        if let Some(user) = var(env::ERROR_LOG_USER) {
            let id = user.trim().parse::<i64>().map_err(|e| {
                GrokgramError::config(format!("invalid {}: {e}", env::ERROR_LOG_USER))
            })?;
            self.telegram.error_log_user = Some(id);
        }
        Ok(())
    }

    /// Fail early on settings the bot cannot run without.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.token.trim().is_empty() {
            return Err(GrokgramError::config(format!("{} is not set", env::TELEGRAM_TOKEN)));
        }
        if self.grok.api_key.trim().is_empty() {
            return Err(GrokgramError::config(format!("{} is not set", env::GROK_API_TOKEN)));
        }
        if self.grok.model.trim().is_empty() || self.grok.fast_model.trim().is_empty() {
            return Err(GrokgramError::config("model names must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.grok.temperature) {
            return Err(GrokgramError::config(format!(
                "temperature {} is outside 0.0..=2.0",
                self.grok.temperature
            )));
        }
        Ok(())
    }

    pub fn allowed_chats(&self) -> Vec<ChatId> {
        self.telegram.allowed_users.iter().copied().map(ChatId).collect()
    }

    pub fn operator_chat(&self) -> Option<ChatId> {
        self.telegram.error_log_user.map(ChatId)
    }
}

fn parse_chat_ids(list: &str) -> std::result::Result<Vec<i64>, std::num::ParseIntError> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::parse::<i64>)
        .collect()
}
