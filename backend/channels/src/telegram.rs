use crate::ChannelAdapter;
use crate::stats_report::{
    self, NOTICE_CLOSED, NOTICE_RETRY, NOTICE_UPDATED, ReportAction, ReportSurface, SurfaceError,
    CLOSE_DATA, REFRESH_DATA,
};
use crate::telegram_commands::{BotCommand, GREETING, is_command_text};
use async_trait::async_trait;
use chatpulse_core::{ChatEvent, unix_now};
use chatpulse_metrics::{Aggregator, render_report};
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use teloxide::{ApiError, RequestError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

type HandlerError = Box<dyn std::error::Error + Send + Sync>;
type HandlerResult = Result<(), HandlerError>;

pub struct TelegramAdapter {
    bot: Bot,
    aggregator: Aggregator,
}

impl TelegramAdapter {
    pub fn new(token: String, aggregator: Aggregator) -> Self {
        Self {
            bot: Bot::new(token),
            aggregator,
        }
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn name(&self) -> &str { "telegram" }

    async fn start(&self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        info!("Starting Telegram adapter");

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), schema())
            .dependencies(dptree::deps![self.aggregator.clone()])
            .default_handler(|upd| async move {
                debug!(update = ?upd.id, "Ignoring unhandled Telegram update");
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "Telegram handler failed",
            ))
            .build();

        let token = dispatcher.shutdown_token();
        tokio::spawn(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
            info!("Stopping Telegram dispatcher");
            if let Ok(done) = token.shutdown() {
                done.await;
            }
        });

        dispatcher.dispatch().await;
        info!("Telegram adapter stopped");
        Ok(())
    }
}

fn schema() -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

/// Inline keyboard attached to every stats report.
pub fn report_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("♻️ Refresh", REFRESH_DATA),
        InlineKeyboardButton::callback("✖️ Close", CLOSE_DATA),
    ]])
}

async fn on_message(bot: Bot, msg: Message, aggregator: Aggregator) -> HandlerResult {
    let now = unix_now();
    let text = msg.text().unwrap_or_default();
    let command = BotCommand::parse(text);

    let event = ChatEvent::new(msg.chat.id.0.to_string(), is_command_text(text), now);
    if let Err(e) = aggregator.record(&event).await {
        warn!(subject = %event.subject_id, error = %e, "Dropping chat event, store unavailable");
    }

    match command {
        Some(BotCommand::Start) => {
            bot.send_message(msg.chat.id, GREETING).await?;
        }
        Some(BotCommand::Stats) => match aggregator.snapshot(now).await {
            Ok(snapshot) => {
                bot.send_message(msg.chat.id, render_report(&snapshot))
                    .reply_markup(report_keyboard())
                    .await?;
            }
            Err(e) => {
                error!(chat_id = msg.chat.id.0, error = %e, "Stats snapshot failed");
                bot.send_message(msg.chat.id, NOTICE_RETRY).await?;
            }
        },
        Some(BotCommand::Unknown(_)) | None => {}
    }
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, aggregator: Aggregator) -> HandlerResult {
    let action = q.data.as_deref().and_then(ReportAction::parse);
    let (Some(action), Some(message)) = (action, q.regular_message()) else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let surface = TelegramSurface {
        bot: bot.clone(),
        chat_id: message.chat.id,
        message_id: message.id,
    };

    let notice = match action {
        ReportAction::Refresh => {
            match stats_report::refresh(&surface, &aggregator, unix_now()).await {
                Ok(()) => NOTICE_UPDATED,
                Err(e) => {
                    error!(chat_id = message.chat.id.0, error = %e, "Stats refresh failed");
                    NOTICE_RETRY
                }
            }
        }
        ReportAction::Close => {
            stats_report::close(&surface, message.text().unwrap_or_default()).await;
            NOTICE_CLOSED
        }
    };

    bot.answer_callback_query(q.id.clone()).text(notice).await?;
    Ok(())
}

/// A sent report message, edited through the Bot API.
pub struct TelegramSurface {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl From<RequestError> for SurfaceError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Api(ApiError::MessageNotModified) => SurfaceError::NotModified,
            other => SurfaceError::Rejected(other.to_string()),
        }
    }
}

#[async_trait]
impl ReportSurface for TelegramSurface {
    async fn edit(&self, text: &str, with_actions: bool) -> Result<(), SurfaceError> {
        let request = self.bot.edit_message_text(self.chat_id, self.message_id, text);
        // Omitting reply_markup drops the keyboard.
        let result = if with_actions {
            request.reply_markup(report_keyboard()).await
        } else {
            request.await
        };
        result.map(|_| ()).map_err(SurfaceError::from)
    }

    async fn clear_actions(&self) -> Result<(), SurfaceError> {
        self.bot
            .edit_message_reply_markup(self.chat_id, self.message_id)
            .await
            .map(|_| ())
            .map_err(SurfaceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_has_refresh_and_close() {
        let kb = report_keyboard();
        assert_eq!(kb.inline_keyboard.len(), 1);
        let labels: Vec<&str> = kb.inline_keyboard[0].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["♻️ Refresh", "✖️ Close"]);
    }

    #[test]
    fn not_modified_maps_to_benign_error() {
        let err = RequestError::Api(ApiError::MessageNotModified);
        assert_eq!(SurfaceError::from(err), SurfaceError::NotModified);

        let err = RequestError::Api(ApiError::MessageToEditNotFound);
        assert!(matches!(SurfaceError::from(err), SurfaceError::Rejected(_)));
    }
}
