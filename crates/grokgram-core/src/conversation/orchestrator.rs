use crate::config::Settings;
use crate::constants::{commands, models};
use crate::context::{resolve_system_prompt, HistoryStore};
use crate::conversation::command::{classify, ControlCommand, Inbound, ModelVariant};
use crate::delivery::{DeliveryPipeline, DeliveryReport, MessageSender, OperatorNotifier, OutgoingMessage};
use crate::llm::{ChatId, Completion, CompletionProvider, CompletionRequest, Message, MessageId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// One text message received from the chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat: ChatId,
    pub message_id: MessageId,
    pub text: String,
}

impl InboundMessage {
    pub fn new(chat: ChatId, message_id: MessageId, text: impl Into<String>) -> Self {
        Self {
            chat,
            message_id,
            text: text.into(),
        }
    }
}

/// What [`Orchestrator::handle`] did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The chat is not on the allow-list; nothing was sent.
    Disallowed,
    Welcomed,
    Cleared,
    /// The model answered; the exchange was recorded and delivered.
    Answered(DeliveryReport),
    /// The provider body could not be interpreted; it was delivered as-is
    /// and nothing was recorded.
    Degraded(DeliveryReport),
    /// The provider call failed; the user got an error reply.
    ProviderFailed,
}

/// Answers inbound messages: commands, history, completion and delivery.
pub struct Orchestrator {
    history: Arc<dyn HistoryStore>,
    provider: Arc<dyn CompletionProvider>,
    sender: Arc<dyn MessageSender>,
    notifier: OperatorNotifier,
    pipeline: DeliveryPipeline,
    allowed_chats: HashSet<ChatId>,
    system_prompt: String,
    default_model: String,
    fast_model: String,
    temperature: f32,
}

impl Orchestrator {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        provider: Arc<dyn CompletionProvider>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        let notifier = OperatorNotifier::new(sender.clone(), None);
        Self {
            history,
            provider,
            pipeline: DeliveryPipeline::new(sender.clone(), notifier.clone()),
            sender,
            notifier,
            allowed_chats: HashSet::new(),
            system_prompt: resolve_system_prompt(None),
            default_model: models::GROK_MODEL.to_string(),
            fast_model: models::GROK_FAST_MODEL.to_string(),
            temperature: models::TEMPERATURE,
        }
    }

    /// Wire everything the settings describe around the given collaborators.
    pub fn from_settings(
        settings: &Settings,
        history: Arc<dyn HistoryStore>,
        provider: Arc<dyn CompletionProvider>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self::new(history, provider, sender)
            .with_allowed_chats(settings.allowed_chats())
            .with_operator(settings.operator_chat())
            .with_system_prompt(resolve_system_prompt(settings.grok.system_prompt.as_deref()))
            .with_models(&settings.grok.model, &settings.grok.fast_model)
            .with_temperature(settings.grok.temperature)
    }

    pub fn with_allowed_chats(mut self, chats: impl IntoIterator<Item = ChatId>) -> Self {
        self.allowed_chats = chats.into_iter().collect();
        self
    }

    /// Mirror operational errors to `operator` in addition to the log.
    pub fn with_operator(mut self, operator: Option<ChatId>) -> Self {
        self.notifier = OperatorNotifier::new(self.sender.clone(), operator);
        self.pipeline = DeliveryPipeline::new(self.sender.clone(), self.notifier.clone());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_models(mut self, default: impl Into<String>, fast: impl Into<String>) -> Self {
        self.default_model = default.into();
        self.fast_model = fast.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn is_allowed(&self, chat: ChatId) -> bool {
        self.allowed_chats.contains(&chat)
    }

    pub fn model_for(&self, variant: ModelVariant) -> &str {
        match variant {
            ModelVariant::Default => &self.default_model,
            ModelVariant::Fast => &self.fast_model,
        }
    }

    /// `[system] + history + [user]`, addressed to the variant's model.
    pub fn build_request(&self, chat: ChatId, variant: ModelVariant, text: &str) -> CompletionRequest {
        let history = self.history.get(chat);
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(history);
        messages.push(Message::user(text));
        CompletionRequest::new(self.model_for(variant), messages, self.temperature)
    }

    pub async fn handle(&self, inbound: InboundMessage) -> Outcome {
        if !self.is_allowed(inbound.chat) {
            info!(chat = %inbound.chat, text = %inbound.text, "Ignoring message from disallowed chat");
            return Outcome::Disallowed;
        }

        match classify(&inbound.text) {
            Inbound::Control(ControlCommand::Start) => {
                let welcome = OutgoingMessage::html(inbound.chat, self.welcome_text());
                if let Err(e) = self.sender.send(welcome).await {
                    self.notifier.error("Failed to send a welcome message", Some(&e)).await;
                }
                Outcome::Welcomed
            }
            Inbound::Control(ControlCommand::Clear) => {
                self.history.clear(inbound.chat);
                let ack = OutgoingMessage::plain(inbound.chat, commands::CLEARED_REPLY);
                if let Err(e) = self.sender.send(ack).await {
                    self.notifier.error("Failed to send a clear history message", Some(&e)).await;
                }
                Outcome::Cleared
            }
            Inbound::Completion { model, text } => self.answer(&inbound, model, &text).await,
        }
    }

    async fn answer(&self, inbound: &InboundMessage, variant: ModelVariant, text: &str) -> Outcome {
        let chat = inbound.chat;
        let status = OutgoingMessage::plain(chat, commands::THINKING_REPLY)
            .replying_to(Some(inbound.message_id));
        let status_id = self.sender.send(status).await.ok();

        let request = self.build_request(chat, variant, text);
        info!(chat = %chat, model = %request.model, history = request.messages.len() - 2, "Requesting completion");

        let completion = self.provider.complete(&request).await;
        self.remove_status(chat, status_id).await;

        match completion {
            Ok(Completion::Reply(reply)) => {
                self.history
                    .add_all(chat, vec![Message::user(text), Message::assistant(&reply)]);
                let report = self
                    .pipeline
                    .deliver(chat, reply.as_bytes(), Some(inbound.message_id))
                    .await;
                Outcome::Answered(report)
            }
            Ok(Completion::Degraded(raw)) => {
                warn!(chat = %chat, bytes = raw.len(), "Delivering raw provider response");
                let report = self.pipeline.deliver(chat, &raw, Some(inbound.message_id)).await;
                Outcome::Degraded(report)
            }
            Err(e) => {
                warn!(chat = %chat, "Completion failed: {e}");
                let reply = OutgoingMessage::plain(chat, format!("{}{e}", commands::PROVIDER_ERROR_PREFIX));
                if let Err(e) = self.sender.send(reply).await {
                    self.notifier
                        .error("Failed to send a grok api error message", Some(&e))
                        .await;
                }
                Outcome::ProviderFailed
            }
        }
    }

    async fn remove_status(&self, chat: ChatId, status: Option<MessageId>) {
        let Some(status) = status else {
            return;
        };
        if let Err(e) = self.sender.delete(chat, status).await {
            self.notifier.warn("Failed to delete the status message", Some(&e)).await;
        }
    }

    fn welcome_text(&self) -> String {
        format!(
            "Welcome! I'm your deep-thinking sage. Ask away. The default model is <code>{}</code>; \
to use the faster <code>{}</code>, start your message with <code>{}</code> (with the dot!). \
To clear the current chat history use /clear.",
            escape_html(&self.default_model),
            escape_html(&self.fast_model),
            escape_html(models::FAST_PREFIX),
        )
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
