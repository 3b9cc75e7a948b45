use crate::delivery::notify::OperatorNotifier;
use crate::delivery::sender::{Formatting, MessageSender, OutgoingMessage, SendError};
use crate::delivery::splitter::{split_response, SplitWarning};
use crate::llm::{ChatId, MessageId};
use std::sync::Arc;
use tracing::{debug, info};

/// Where one unit is in the send-with-fallback cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitState {
    /// Nothing sent yet; the next attempt uses rich formatting.
    Pending,
    /// The rich attempt was refused for its markup; the next attempt is plain.
    RejectedFormatting(SendError),
    SentRich,
    SentPlain,
    /// Terminal failure; the unit is skipped.
    Failed(SendError),
}

impl UnitState {
    /// Formatting for the next attempt, or `None` once the unit is settled.
    pub fn next_attempt(&self) -> Option<Formatting> {
        match self {
            Self::Pending => Some(Formatting::Html),
            Self::RejectedFormatting(_) => Some(Formatting::Plain),
            Self::SentRich | Self::SentPlain | Self::Failed(_) => None,
        }
    }

    /// Fold the result of the attempt chosen by [`UnitState::next_attempt`].
    pub fn advance(self, result: Result<(), SendError>) -> Self {
        match (self, result) {
            (Self::Pending, Ok(())) => Self::SentRich,
            (Self::Pending, Err(e)) if e.is_formatting() => Self::RejectedFormatting(e),
            (Self::Pending, Err(e)) => Self::Failed(e),
            (Self::RejectedFormatting(_), Ok(())) => Self::SentPlain,
            (Self::RejectedFormatting(_), Err(e)) => Self::Failed(e),
            (settled, _) => settled,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.next_attempt().is_none()
    }
}

/// Counts of what happened to one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent_rich: usize,
    pub sent_plain: usize,
    pub failed: usize,
    /// Chunks the splitter refused to deliver.
    pub dropped: usize,
}

impl DeliveryReport {
    pub fn delivered(&self) -> usize {
        self.sent_rich + self.sent_plain
    }
}

/// Splits responses and sends them unit by unit.
pub struct DeliveryPipeline {
    sender: Arc<dyn MessageSender>,
    notifier: OperatorNotifier,
}

impl DeliveryPipeline {
    pub fn new(sender: Arc<dyn MessageSender>, notifier: OperatorNotifier) -> Self {
        Self { sender, notifier }
    }

    /// Deliver a response to `chat`, threading only the first unit to `reply_to`.
    ///
    /// Units go out one at a time in split order. A unit whose HTML is refused
    /// is resent once as plain text; any other failure skips that unit only.
    pub async fn deliver(
        &self,
        chat: ChatId,
        response: &[u8],
        reply_to: Option<MessageId>,
    ) -> DeliveryReport {
        let split = split_response(response);
        let mut report = DeliveryReport::default();

        for warning in &split.warnings {
            match warning {
                SplitWarning::Oversized { .. } => info!("{warning}"),
                SplitWarning::InvalidEncoding { .. } => {
                    report.dropped += 1;
                    self.notifier.error(&warning.to_string(), None).await;
                }
                SplitWarning::HardCut { .. } => {
                    self.notifier.warn(&warning.to_string(), None).await;
                }
            }
        }

        debug!(chat = %chat, units = split.units.len(), "Delivering response");

        for (index, unit) in split.units.into_iter().enumerate() {
            let reply_to = if index == 0 { reply_to } else { None };
            let message = OutgoingMessage::html(chat, unit).replying_to(reply_to);

            match self.send_unit(index, message).await {
                UnitState::SentRich => report.sent_rich += 1,
                UnitState::SentPlain => report.sent_plain += 1,
                _ => report.failed += 1,
            }
        }

        report
    }

    async fn send_unit(&self, index: usize, message: OutgoingMessage) -> UnitState {
        let mut state = UnitState::Pending;

        while let Some(formatting) = state.next_attempt() {
            let attempt = message.clone().with_formatting(formatting);
            let result = self.sender.send(attempt).await.map(|_| ());
            state = state.advance(result);

            match &state {
                UnitState::RejectedFormatting(e) => {
                    self.notifier
                        .warn(
                            &format!("HTML parsing failed for unit {index}, retrying without formatting"),
                            Some(e),
                        )
                        .await;
                }
                UnitState::Failed(e) if formatting == Formatting::Plain => {
                    self.notifier
                        .error(&format!("Failed to send unit {index} without formatting"), Some(e))
                        .await;
                }
                UnitState::Failed(e) => {
                    self.notifier
                        .error(&format!("Failed to send unit {index}"), Some(e))
                        .await;
                }
                _ => {}
            }
        }

        state
    }
}
