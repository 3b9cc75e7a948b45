// Library interface for grokgram-bot so the Telegram adapter can be tested.

pub mod telegram;

pub use telegram::{classify_request_error, run_bot, TelegramSender};
