use crate::delivery::sender::{MessageSender, OutgoingMessage};
use crate::llm::ChatId;
use std::fmt::Display;
use std::sync::Arc;
use tracing::Level;

/// Logs operational problems and mirrors them to the operator's chat.
#[derive(Clone)]
pub struct OperatorNotifier {
    sender: Arc<dyn MessageSender>,
    operator: Option<ChatId>,
}

impl OperatorNotifier {
    pub fn new(sender: Arc<dyn MessageSender>, operator: Option<ChatId>) -> Self {
        Self { sender, operator }
    }

    pub fn operator(&self) -> Option<ChatId> {
        self.operator
    }

    pub async fn warn(&self, message: &str, err: Option<&(dyn Display + Sync)>) {
        self.notify(Level::WARN, message, err).await;
    }

    pub async fn error(&self, message: &str, err: Option<&(dyn Display + Sync)>) {
        self.notify(Level::ERROR, message, err).await;
    }

    pub async fn notify(&self, level: Level, message: &str, err: Option<&(dyn Display + Sync)>) {
        let line = match err {
            Some(err) => format!("{message}: {err}"),
            None => message.to_string(),
        };

        if level == Level::ERROR {
            tracing::error!("{line}");
        } else if level == Level::WARN {
            tracing::warn!("{line}");
        } else if level == Level::INFO {
            tracing::info!("{line}");
        } else {
            tracing::debug!("{line}");
        }

        let Some(operator) = self.operator else {
            return;
        };
        // Plain text: error strings routinely contain characters the HTML parser rejects.
        let report = OutgoingMessage::plain(operator, format!("[{level}] {line}"));
        if let Err(e) = self.sender.send(report).await {
            tracing::error!("Failed to send operator notification: {e}");
        }
    }
}
