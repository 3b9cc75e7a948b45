use crate::llm::{ChatId, MessageId};
use thiserror::Error;

/// How the client should interpret a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatting {
    Plain,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat: ChatId,
    pub text: String,
    pub reply_to: Option<MessageId>,
    pub formatting: Formatting,
}

impl OutgoingMessage {
    pub fn plain(chat: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat,
            text: text.into(),
            reply_to: None,
            formatting: Formatting::Plain,
        }
    }

    pub fn html(chat: ChatId, text: impl Into<String>) -> Self {
        Self {
            formatting: Formatting::Html,
            ..Self::plain(chat, text)
        }
    }

    pub fn replying_to(mut self, message: Option<MessageId>) -> Self {
        self.reply_to = message;
        self
    }

    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }
}

/// Why the client refused a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The markup could not be parsed. Sending the same text unformatted may work.
    #[error("formatting rejected: {0}")]
    FormattingRejected(String),

    #[error("{0}")]
    Transport(String),
}

impl SendError {
    pub fn is_formatting(&self) -> bool {
        matches!(self, Self::FormattingRejected(_))
    }
}

/// The outbound half of the chat client.
#[async_trait::async_trait]
pub trait MessageSender: Send + Sync {
    /// Send one message and return the id the client assigned to it.
    async fn send(&self, message: OutgoingMessage) -> Result<MessageId, SendError>;

    /// Delete a message previously sent by the bot.
    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<(), SendError>;
}
