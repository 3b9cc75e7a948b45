/// Centralized constants for grokgram.
/// Model names, endpoints, Telegram limits and fixed replies live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    /// Default, deep-thinking model
    pub const GROK_MODEL: &str = "grok-4-0709";
    /// Lower-latency model selected with [`FAST_PREFIX`]
    pub const GROK_FAST_MODEL: &str = "grok-3";
    /// Leading literal that routes a message to the fast model (dot included)
    pub const FAST_PREFIX: &str = "fast.";
    pub const TEMPERATURE: f32 = 0.5;
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const GROK_BASE_URL: &str = "https://api.x.ai";
    pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
}

// ─── Telegram Limits ──────────────────────────────────────────────────────────

pub mod limits {
    /// Hard Telegram limit for one text message
    pub const MAX_TELEGRAM_MESSAGE_LENGTH: usize = 4096;
    /// Window used when an oversized chunk has to be cut
    pub const SAFE_SPLIT_LENGTH: usize = 4000;
    /// Messages kept per chat
    pub const MAX_HISTORY: usize = 100;
    /// Sentinel the model is asked to emit between logical chunks
    pub const SPLIT_MARKER: &str = "<!--SPLIT-->";
}

// ─── Commands & Fixed Replies ─────────────────────────────────────────────────

pub mod commands {
    pub const START: &str = "/start";
    pub const CLEAR: &str = "/clear";

    pub const START_DESCRIPTION: &str = "Introduce the bot and its models";
    pub const CLEAR_DESCRIPTION: &str = "Clear chat history";

    pub const CLEARED_REPLY: &str = "Chat history cleared. Fresh start!";
    pub const THINKING_REPLY: &str = "Thinking...";
    pub const PROVIDER_ERROR_PREFIX: &str = "Error calling Grok: ";
}

// ─── Config Paths & Environment ───────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "grokgram";
    pub const CONFIG_FILE: &str = "config.toml";
}

pub mod env {
    pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
    pub const GROK_API_TOKEN: &str = "GROK_API_TOKEN";
    pub const SYSTEM_PROMPT: &str = "SYS";
    pub const ALLOWED_USERS: &str = "ALLOWED_USERS";
    pub const ERROR_LOG_USER: &str = "ERROR_LOG_USER";
}
