//! Free-text driver for the active dialog, and the render-then-save step
//! shared with the button dispatcher.

use teloxide::prelude::ResponseResult;

use crate::bot::commands::{events, CommandInput};
use crate::bot::context::AppContext;
use crate::bot::render::{Notice, Renderer};
use crate::dialog::{machine, ActiveDialog, DateCaptureOutcome, Prompt, PromptRef, Transition};
use crate::error::{BotError, BotResult, CalendarError};
use crate::utils::logging::{log_dialog_step, log_external_error, log_store_error};

/// A plain text message from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub user_id: u64,
    pub chat_id: i64,
    pub chat_is_private: bool,
    pub message_id: i32,
    pub text: String,
}

/// Deletes a stale prompt. Failure is logged only: the message may already be gone.
pub async fn retire_prompt(renderer: &dyn Renderer, prompt: &PromptRef) {
    if let Err(e) = renderer.delete(prompt).await {
        tracing::debug!(
            "Could not delete prompt {} in chat {}: {}",
            prompt.message_id,
            prompt.chat_id,
            e
        );
    }
}

/// Renders what a transition asks for, then persists the session.
///
/// Transitions that leave the session untouched are not saved.
pub async fn apply_transition(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    user_id: u64,
    chat_id: i64,
    reply_to: Option<i32>,
    transition: Transition,
) -> BotResult<()> {
    let Transition {
        mut session,
        prompt,
        retired,
    } = transition;

    if let Some(prompt) = &retired {
        retire_prompt(renderer, prompt).await;
    }

    match prompt {
        Prompt::Idle => {
            renderer.send_notice(chat_id, Notice::NothingInProgress).await?;
            return Ok(());
        }
        Prompt::DateNotParsed => {
            renderer.send_notice(chat_id, Notice::DateNotParsed).await?;
            return Ok(());
        }
        Prompt::Cancelled => renderer.send_notice(chat_id, Notice::Cancelled).await?,
        Prompt::Ask(ask) => renderer.send_ask(chat_id, ask).await?,
        Prompt::Draft { ask } => {
            let sent = renderer.send_draft(chat_id, &session, reply_to).await?;
            session.prompt_ref = Some(sent);
            if let Some(ask) = ask {
                renderer.send_ask(chat_id, ask).await?;
            }
        }
    }

    ctx.sessions.save(user_id, &session).await?;
    Ok(())
}

/// Routes a text message into whichever dialog the user has open.
pub async fn handle_text(ctx: &AppContext, renderer: &dyn Renderer, input: &TextInput) -> BotResult<()> {
    let session = ctx.sessions.load(input.user_id).await?;

    match session.active {
        ActiveDialog::Create => {
            let step = session.step;
            let transition =
                machine::advance(session, &input.text, ctx.resolver.as_ref(), &ctx.timezone).await?;
            log_dialog_step(input.user_id, step.as_str(), &format!("{:?}", transition.prompt));
            apply_transition(
                ctx,
                renderer,
                input.user_id,
                input.chat_id,
                Some(input.message_id),
                transition,
            )
            .await
        }
        ActiveDialog::DateCapture => {
            let (session, outcome) = machine::advance_date_capture(
                session,
                &input.text,
                ctx.resolver.as_ref(),
                &ctx.timezone,
            )
            .await?;
            log_dialog_step(input.user_id, "date", &format!("{outcome:?}"));

            match outcome {
                DateCaptureOutcome::Cancelled => {
                    ctx.sessions.save(input.user_id, &session).await?;
                    renderer.send_notice(input.chat_id, Notice::DateCancelled).await?;
                }
                DateCaptureOutcome::NotParsed => {
                    renderer.send_notice(input.chat_id, Notice::DateNotParsed).await?;
                }
                DateCaptureOutcome::Resolved(date) => {
                    ctx.sessions.save(input.user_id, &session).await?;
                    let command = CommandInput {
                        user_id: input.user_id,
                        chat_id: input.chat_id,
                        chat_is_private: input.chat_is_private,
                        message_id: input.message_id,
                    };
                    events::show_date(ctx, renderer, &command, date).await?;
                }
                DateCaptureOutcome::Idle => {}
            }
            Ok(())
        }
        ActiveDialog::None => {
            if input.chat_is_private {
                renderer.send_notice(input.chat_id, Notice::NothingInProgress).await?;
            }
            Ok(())
        }
    }
}

/// Logs a failed update and tells the user something went wrong.
///
/// Telegram errors are only logged; answering would most likely fail too.
pub async fn report_failure(
    renderer: &dyn Renderer,
    chat_id: i64,
    operation: &str,
    err: &BotError,
) -> ResponseResult<()> {
    let notice = match err {
        BotError::Telegram(e) => {
            tracing::error!("Telegram error during {}: {}", operation, e);
            return Ok(());
        }
        BotError::Calendar(CalendarError::Unauthorized) => Notice::NotAuthorized,
        BotError::Calendar(e) => {
            log_external_error("calendar", operation, &e.to_string());
            Notice::ServiceFailure
        }
        BotError::Resolution(e) => {
            log_external_error("date parser", operation, &e.to_string());
            Notice::ServiceFailure
        }
        BotError::Store(e) => {
            log_store_error(operation, &chat_id.to_string(), &e.to_string());
            Notice::ServiceFailure
        }
        other => {
            tracing::error!("{} failed: {}", operation, other);
            Notice::ServiceFailure
        }
    };
    renderer.send_notice(chat_id, notice).await
}
