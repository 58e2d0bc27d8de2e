use teloxide::prelude::*;

use crate::bot::commands::events::run_top_level;
use crate::bot::context::AppContext;
use crate::bot::handlers::dialog::report_failure;
use crate::bot::handlers::dispatcher::{dispatch, CallbackAnswer, CallbackInput, Dispatched, FollowUp};
use crate::bot::render::TelegramRenderer;
use crate::bot::texts;
use crate::bot::HandlerResult;
use crate::dialog::PromptRef;

fn callback_input(q: &CallbackQuery, data: String) -> CallbackInput {
    let message = q.message.as_ref();
    let replied_to = message.and_then(|m| m.reply_to_message());

    CallbackInput {
        presser_id: q.from.id.0,
        chat_id: message.map(|m| m.chat.id.0).unwrap_or_default(),
        chat_is_private: message.is_some_and(|m| m.chat.is_private()),
        message: message.map(|m| PromptRef {
            chat_id: m.chat.id.0,
            message_id: m.id.0,
        }),
        reply_to_message_id: replied_to.map(|r| r.id.0),
        replied_to_sender: replied_to.and_then(|r| r.from()).map(|u| u.id.0),
        data,
    }
}

pub async fn callback_handler(bot: Bot, q: CallbackQuery, ctx: AppContext) -> HandlerResult {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    let input = callback_input(&q, data);
    let renderer = TelegramRenderer::new(bot.clone(), &ctx.timezone);

    let dispatched = match dispatch(&ctx, &renderer, &input).await {
        Ok(dispatched) => dispatched,
        Err(e) => {
            tracing::error!("Callback '{}' from {} failed: {}", input.data, input.presser_id, e);
            Dispatched {
                answer: CallbackAnswer::Failure,
                follow_up: None,
            }
        }
    };

    let mut answer = bot.answer_callback_query(q.id);
    if let Some(text) = texts::answer_text(&dispatched.answer) {
        answer = answer.text(text).show_alert(dispatched.answer.is_alert());
    }
    answer.await?;

    if let Some(FollowUp::Reinvoke { command, input }) = dispatched.follow_up {
        if let Err(e) = run_top_level(&ctx, &renderer, command, &input).await {
            report_failure(&renderer, input.chat_id, command.as_str(), &e).await?;
        }
    }
    Ok(())
}
