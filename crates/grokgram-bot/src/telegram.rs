use std::sync::Arc;

use grokgram_core::constants::commands;
use grokgram_core::{
    ChatId, Formatting, GrokClient, InMemoryHistory, InboundMessage, MessageId, MessageSender,
    Orchestrator, OutgoingMessage, SendError, Settings,
};
use teloxide::prelude::*;
use teloxide::types::{self as tg, BotCommand, ParseMode, ReplyParameters};
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, info};

/// [`MessageSender`] over the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait::async_trait]
impl MessageSender for TelegramSender {
    async fn send(&self, message: OutgoingMessage) -> Result<MessageId, SendError> {
        let mut request = self.bot.send_message(tg::ChatId(message.chat.0), message.text);
        if message.formatting == Formatting::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(reply_to) = message.reply_to {
            request = request.reply_parameters(ReplyParameters::new(tg::MessageId(reply_to.0)));
        }

        request
            .await
            .map(|sent| MessageId(sent.id.0))
            .map_err(classify_request_error)
    }

    async fn delete(&self, chat: ChatId, message: MessageId) -> Result<(), SendError> {
        self.bot
            .delete_message(tg::ChatId(chat.0), tg::MessageId(message.0))
            .await
            .map(|_| ())
            .map_err(classify_request_error)
    }
}

/// Separate "the HTML was bad" from every other Bot API failure.
pub fn classify_request_error(err: RequestError) -> SendError {
    match err {
        RequestError::Api(ApiError::CantParseEntities(reason)) => {
            SendError::FormattingRejected(reason)
        }
        RequestError::Api(ApiError::Unknown(reason)) if reason.contains("can't parse entities") => {
            SendError::FormattingRejected(reason)
        }
        other => SendError::Transport(other.to_string()),
    }
}

/// Poll Telegram and answer messages until SIGINT or SIGTERM.
pub async fn run_bot(settings: Settings) -> anyhow::Result<()> {
    let bot = Bot::new(&settings.telegram.token);
    register_commands(&bot).await;

    let sender: Arc<dyn MessageSender> = Arc::new(TelegramSender::new(bot.clone()));
    let provider = Arc::new(GrokClient::new(&settings.grok.api_key).with_base_url(&settings.grok.base_url));
    let history = Arc::new(InMemoryHistory::new());
    let orchestrator = Arc::new(Orchestrator::from_settings(&settings, history, provider, sender));

    info!(
        allowed_chats = settings.telegram.allowed_users.len(),
        operator = ?settings.telegram.error_log_user,
        model = %settings.grok.model,
        fast_model = %settings.grok.fast_model,
        "Starting Telegram dispatcher"
    );

    let handler = Update::filter_message().endpoint(handle_message);

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(dptree::deps![orchestrator])
        .enable_ctrlc_handler()
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        wait_for_terminate().await;
        info!("Shutting down gracefully");
        if let Ok(stopped) = shutdown.shutdown() {
            stopped.await;
        }
    });

    dispatcher.dispatch().await;
    info!("Dispatcher stopped");
    Ok(())
}

async fn handle_message(msg: Message, orchestrator: Arc<Orchestrator>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        debug!(chat = msg.chat.id.0, "Ignoring non-text message");
        return Ok(());
    };

    let inbound = InboundMessage::new(ChatId(msg.chat.id.0), MessageId(msg.id.0), text);
    let outcome = orchestrator.handle(inbound).await;
    debug!(chat = msg.chat.id.0, ?outcome, "Message handled");
    Ok(())
}

async fn register_commands(bot: &Bot) {
    let menu = vec![
        BotCommand::new(command_name(commands::START), commands::START_DESCRIPTION),
        BotCommand::new(command_name(commands::CLEAR), commands::CLEAR_DESCRIPTION),
    ];
    if let Err(e) = bot.set_my_commands(menu).await {
        error!("Failed to set Telegram bot commands: {e}");
    }
}

fn command_name(command: &str) -> &str {
    command.trim_start_matches('/')
}

#[cfg(unix)]
async fn wait_for_terminate() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            term.recv().await;
        }
        Err(e) => {
            error!("Failed to listen for SIGTERM: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_terminate() {
    // ctrl-c is already handled by the dispatcher
    std::future::pending::<()>().await;
}
