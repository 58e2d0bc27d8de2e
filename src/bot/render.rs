//! Output side of the bot.
//!
//! Handlers describe what the user should see through [`Renderer`]; the
//! Telegram implementation decides how it looks. Tests substitute a recorder.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode, ReplyMarkup};

use crate::bot::commands::TopLevelCommand;
use crate::bot::keyboards;
use crate::bot::texts;
use crate::dialog::{Ask, Instant, PromptRef, Session};
use crate::services::calendar::Event;
use crate::utils::datetime::now_in;
use crate::utils::feedback::CommandFeedback;
use crate::utils::markdown::{bold, escape_markdown};

/// Fixed messages the bot sends.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Welcome,
    Cancelled,
    DateCancelled,
    DateNotParsed,
    NothingInProgress,
    ServiceFailure,
    NotAuthorized,
    NoEventsToday,
    NoClosestEvent,
    NoEventsOnDate(Instant),
    TodayHeader,
    NextHeader,
    DateHeader(Instant),
    Created { title: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventView {
    Short,
    Full,
}

#[async_trait]
pub trait Renderer: Send + Sync {
    async fn send_notice(&self, chat_id: i64, notice: Notice) -> ResponseResult<()>;

    /// Question for the next free-text answer, with its quick-reply keyboard.
    async fn send_ask(&self, chat_id: i64, ask: Ask) -> ResponseResult<()>;

    /// Draft snapshot with the action menu. Returns where it landed.
    async fn send_draft(
        &self,
        chat_id: i64,
        session: &Session,
        reply_to: Option<i32>,
    ) -> ResponseResult<PromptRef>;

    async fn delete(&self, prompt: &PromptRef) -> ResponseResult<()>;

    /// Posts an event; `expandable` adds the "more" button.
    async fn send_event(&self, chat_id: i64, event: &Event, expandable: bool) -> ResponseResult<()>;

    /// Rewrites an already posted event in place.
    async fn show_event(&self, target: &PromptRef, event: &Event, view: EventView) -> ResponseResult<()>;

    /// Yes/no confirmation before showing calendar contents in a group.
    async fn send_group_alert(
        &self,
        chat_id: i64,
        reply_to: i32,
        command: TopLevelCommand,
    ) -> ResponseResult<()>;

    /// Shows the command list.
    async fn send_help(&self, chat_id: i64) -> ResponseResult<()>;
}

/// [`Renderer`] posting MarkdownV2 messages through the Bot API.
#[derive(Clone)]
pub struct TelegramRenderer {
    bot: Bot,
    /// IANA name the date shortcuts are computed in.
    timezone: String,
}

impl TelegramRenderer {
    pub fn new(bot: Bot, timezone: &str) -> Self {
        Self {
            bot,
            timezone: timezone.to_string(),
        }
    }

    async fn send_markdown(
        &self,
        chat_id: i64,
        text: String,
        markup: Option<ReplyMarkup>,
        reply_to: Option<i32>,
    ) -> ResponseResult<Message> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        if let Some(message_id) = reply_to {
            request = request.reply_to_message_id(MessageId(message_id));
        }
        request.await
    }
}

#[async_trait]
impl Renderer for TelegramRenderer {
    async fn send_notice(&self, chat_id: i64, notice: Notice) -> ResponseResult<()> {
        let text = texts::notice_text(&notice);
        match texts::feedback_type(&notice) {
            Some(kind) => {
                CommandFeedback::new(self.bot.clone(), ChatId(chat_id))
                    .send(kind, &text)
                    .await?;
            }
            None => {
                self.send_markdown(chat_id, bold(&text), None, None).await?;
            }
        }
        Ok(())
    }

    async fn send_ask(&self, chat_id: i64, ask: Ask) -> ResponseResult<()> {
        let markup = keyboards::ask_keyboard(ask, &now_in(&self.timezone));
        self.send_markdown(
            chat_id,
            escape_markdown(texts::ask_text(ask)),
            Some(markup),
            None,
        )
        .await?;
        Ok(())
    }

    async fn send_draft(
        &self,
        chat_id: i64,
        session: &Session,
        reply_to: Option<i32>,
    ) -> ResponseResult<PromptRef> {
        let sent = self
            .send_markdown(
                chat_id,
                texts::draft_text(&session.draft),
                Some(ReplyMarkup::InlineKeyboard(keyboards::draft_keyboard(session))),
                reply_to,
            )
            .await?;
        Ok(PromptRef {
            chat_id: sent.chat.id.0,
            message_id: sent.id.0,
        })
    }

    async fn delete(&self, prompt: &PromptRef) -> ResponseResult<()> {
        self.bot
            .delete_message(ChatId(prompt.chat_id), MessageId(prompt.message_id))
            .await?;
        Ok(())
    }

    async fn send_event(&self, chat_id: i64, event: &Event, expandable: bool) -> ResponseResult<()> {
        let markup = if expandable {
            keyboards::expand_keyboard(&event.uid).map(ReplyMarkup::InlineKeyboard)
        } else {
            None
        };
        self.send_markdown(chat_id, texts::event_text(event, EventView::Short), markup, None)
            .await?;
        Ok(())
    }

    async fn show_event(&self, target: &PromptRef, event: &Event, view: EventView) -> ResponseResult<()> {
        let keyboard = match view {
            EventView::Full => keyboards::collapse_keyboard(event),
            EventView::Short => keyboards::expand_keyboard(&event.uid),
        };
        let mut request = self
            .bot
            .edit_message_text(
                ChatId(target.chat_id),
                MessageId(target.message_id),
                texts::event_text(event, view),
            )
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn send_group_alert(
        &self,
        chat_id: i64,
        reply_to: i32,
        command: TopLevelCommand,
    ) -> ResponseResult<()> {
        self.send_markdown(
            chat_id,
            escape_markdown(&texts::group_alert_text(command)),
            Some(ReplyMarkup::InlineKeyboard(keyboards::group_alert_keyboard(command))),
            Some(reply_to),
        )
        .await?;
        Ok(())
    }

    async fn send_help(&self, chat_id: i64) -> ResponseResult<()> {
        use teloxide::utils::command::BotCommands;

        self.bot
            .send_message(
                ChatId(chat_id),
                crate::bot::commands::Command::descriptions().to_string(),
            )
            .await?;
        Ok(())
    }
}
