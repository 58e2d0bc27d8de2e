//! Inline-button handling, independent of the Telegram transport.
//!
//! Every button press runs the ownership check before anything is loaded or
//! mutated. Domain failures end up as a [`CallbackAnswer`]; only Telegram
//! errors escape [`dispatch`].

use crate::bot::commands::{CommandInput, TopLevelCommand};
use crate::bot::context::AppContext;
use crate::bot::handlers::dialog::{apply_transition, retire_prompt};
use crate::bot::render::{EventView, Notice, Renderer};
use crate::dialog::{machine, PromptRef, Step};
use crate::error::{BotError, BotResult, CalendarError};
use crate::services::calendar::EventInput;
use crate::utils::logging::{
    log_callback, log_external_error, log_permission_denied, log_store_error,
};
use crate::utils::validation::validate_event_token;

/// Decoded inline-button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Show the full card of the event with this uid.
    Expand(String),
    /// Back to the short card.
    Collapse(String),
    Create,
    Cancel,
    /// Re-enter a wizard step from the draft menu.
    Menu(Step),
    FullDay,
    AlertYes(TopLevelCommand),
    AlertNo,
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Expand(uid) => format!("more:{uid}"),
            CallbackAction::Collapse(uid) => format!("less:{uid}"),
            CallbackAction::Create => "create".to_string(),
            CallbackAction::Cancel => "cancel".to_string(),
            CallbackAction::Menu(step) => format!("step:{}", step.as_str()),
            CallbackAction::FullDay => "fullday".to_string(),
            CallbackAction::AlertYes(command) => format!("alert_yes:{}", command.as_str()),
            CallbackAction::AlertNo => "alert_no".to_string(),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "create" => return Some(CallbackAction::Create),
            "cancel" => return Some(CallbackAction::Cancel),
            "fullday" => return Some(CallbackAction::FullDay),
            "alert_no" => return Some(CallbackAction::AlertNo),
            _ => {}
        }

        let (kind, value) = data.split_once(':')?;
        match kind {
            "more" | "less" => {
                validate_event_token(value).ok()?;
                let uid = value.to_string();
                Some(if kind == "more" {
                    CallbackAction::Expand(uid)
                } else {
                    CallbackAction::Collapse(uid)
                })
            }
            "step" => Step::from_menu(value).map(CallbackAction::Menu),
            "alert_yes" => TopLevelCommand::parse(value).map(CallbackAction::AlertYes),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            CallbackAction::Expand(_) => "expand",
            CallbackAction::Collapse(_) => "collapse",
            CallbackAction::Create => "create",
            CallbackAction::Cancel => "cancel",
            CallbackAction::Menu(_) => "menu",
            CallbackAction::FullDay => "fullday",
            CallbackAction::AlertYes(_) => "alert_yes",
            CallbackAction::AlertNo => "alert_no",
        }
    }
}

/// One button press as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackInput {
    pub presser_id: u64,
    pub chat_id: i64,
    pub chat_is_private: bool,
    /// Message the pressed button is attached to.
    pub message: Option<PromptRef>,
    /// The message that message replies to, and who sent it.
    pub reply_to_message_id: Option<i32>,
    pub replied_to_sender: Option<u64>,
    pub data: String,
}

/// What the pressing user is told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAnswer {
    Silent,
    EventTitle(String),
    NotAllowed,
    NotFound,
    Unavailable,
    Incomplete(Vec<&'static str>),
    Created,
    Cancelled,
    NoDialog,
    NotAuthorized,
    Failure,
}

impl CallbackAnswer {
    /// Failures are shown as a modal alert, everything else as a toast.
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            CallbackAnswer::NotAllowed
                | CallbackAnswer::NotFound
                | CallbackAnswer::Unavailable
                | CallbackAnswer::Incomplete(_)
                | CallbackAnswer::NotAuthorized
                | CallbackAnswer::Failure
        )
    }
}

/// Work to do after the callback has been answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Run a top-level command as if typed, skipping the group guard.
    Reinvoke {
        command: TopLevelCommand,
        input: CommandInput,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub answer: CallbackAnswer,
    pub follow_up: Option<FollowUp>,
}

impl Dispatched {
    fn answer(answer: CallbackAnswer) -> Self {
        Self {
            answer,
            follow_up: None,
        }
    }
}

/// Only the user a prompt was addressed to may press its buttons.
///
/// Prompts reply to the message that caused them, so the owner is the sender
/// of that message. Unanswered prompts are accepted only in the presser's own
/// private chat.
pub fn check_ownership(input: &CallbackInput) -> BotResult<()> {
    match input.replied_to_sender {
        Some(owner) if owner == input.presser_id => Ok(()),
        None if input.chat_is_private && input.chat_id == input.presser_id as i64 => Ok(()),
        owner => Err(BotError::Permission {
            presser: input.presser_id,
            owner,
        }),
    }
}

fn answer_for_error(action: &str, input: &CallbackInput, err: &BotError) -> CallbackAnswer {
    match err {
        BotError::Permission { presser, owner } => {
            log_permission_denied(action, *presser, *owner);
            CallbackAnswer::NotAllowed
        }
        BotError::NotFound(what) => {
            tracing::debug!("{} by {}: {} not found", action, input.presser_id, what);
            CallbackAnswer::NotFound
        }
        BotError::Validation(missing) => CallbackAnswer::Incomplete(missing.clone()),
        BotError::Calendar(CalendarError::NotFound(_)) => CallbackAnswer::Unavailable,
        BotError::Calendar(CalendarError::Unauthorized) => CallbackAnswer::NotAuthorized,
        BotError::Calendar(e) => {
            log_external_error("calendar", action, &e.to_string());
            CallbackAnswer::Failure
        }
        BotError::Resolution(e) => {
            log_external_error("date parser", action, &e.to_string());
            CallbackAnswer::Failure
        }
        BotError::Store(e) => {
            log_store_error(action, &input.presser_id.to_string(), &e.to_string());
            CallbackAnswer::Failure
        }
        BotError::Telegram(e) => {
            tracing::error!("Telegram error during {}: {}", action, e);
            CallbackAnswer::Failure
        }
    }
}

/// Handles one button press.
pub async fn dispatch(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    input: &CallbackInput,
) -> BotResult<Dispatched> {
    let Some(action) = CallbackAction::parse(&input.data) else {
        tracing::warn!("Unknown callback data '{}' from {}", input.data, input.presser_id);
        return Ok(Dispatched::answer(CallbackAnswer::Silent));
    };
    log_callback(action.name(), input.presser_id, input.chat_id);

    // Event cards are per viewer: anyone who sees one may expand or collapse it.
    let owned = match action {
        CallbackAction::Expand(_) | CallbackAction::Collapse(_) => Ok(()),
        _ => check_ownership(input),
    };
    let result = match owned {
        Ok(()) => run_action(ctx, renderer, input, &action).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(dispatched) => Ok(dispatched),
        Err(BotError::Telegram(e)) => Err(BotError::Telegram(e)),
        Err(e) => Ok(Dispatched::answer(answer_for_error(action.name(), input, &e))),
    }
}

async fn run_action(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    input: &CallbackInput,
    action: &CallbackAction,
) -> BotResult<Dispatched> {
    match action {
        CallbackAction::Expand(uid) => expand(ctx, renderer, input, uid).await,
        CallbackAction::Collapse(uid) => collapse(ctx, renderer, input, uid).await,
        CallbackAction::Create => finalize(ctx, renderer, input).await,
        CallbackAction::Cancel => cancel(ctx, renderer, input).await,
        CallbackAction::Menu(step) => {
            let session = ctx.sessions.load(input.presser_id).await?;
            if !session.is_create_active() {
                return Ok(Dispatched::answer(CallbackAnswer::NoDialog));
            }
            let transition = machine::jump(session, *step);
            apply_transition(ctx, renderer, input.presser_id, input.chat_id, input.reply_to_message_id, transition)
                .await?;
            Ok(Dispatched::answer(CallbackAnswer::Silent))
        }
        CallbackAction::FullDay => {
            let session = ctx.sessions.load(input.presser_id).await?;
            if !session.is_create_active() {
                return Ok(Dispatched::answer(CallbackAnswer::NoDialog));
            }
            let transition = machine::select_full_day(session);
            apply_transition(ctx, renderer, input.presser_id, input.chat_id, input.reply_to_message_id, transition)
                .await?;
            Ok(Dispatched::answer(CallbackAnswer::Silent))
        }
        CallbackAction::AlertYes(command) => {
            if let Some(alert) = &input.message {
                retire_prompt(renderer, alert).await;
            }
            Ok(Dispatched {
                answer: CallbackAnswer::Silent,
                follow_up: Some(FollowUp::Reinvoke {
                    command: *command,
                    input: CommandInput {
                        user_id: input.presser_id,
                        chat_id: input.chat_id,
                        chat_is_private: input.chat_is_private,
                        message_id: input
                            .reply_to_message_id
                            .or(input.message.map(|m| m.message_id))
                            .unwrap_or_default(),
                    },
                }),
            })
        }
        CallbackAction::AlertNo => {
            if let Some(alert) = &input.message {
                retire_prompt(renderer, alert).await;
            }
            Ok(Dispatched::answer(CallbackAnswer::Silent))
        }
    }
}

async fn expand(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    input: &CallbackInput,
    event_uid: &str,
) -> BotResult<Dispatched> {
    let calendar_uid = ctx
        .correlations
        .lookup(event_uid)
        .await?
        .ok_or_else(|| BotError::NotFound(format!("correlation for {event_uid}")))?;

    let event = ctx
        .calendar
        .event_by_id(input.presser_id, &calendar_uid, event_uid)
        .await?;

    if let Some(target) = &input.message {
        renderer.show_event(target, &event, EventView::Full).await?;
    }
    Ok(Dispatched::answer(CallbackAnswer::EventTitle(event.title)))
}

async fn collapse(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    input: &CallbackInput,
    event_uid: &str,
) -> BotResult<Dispatched> {
    let calendar_uid = ctx
        .correlations
        .lookup(event_uid)
        .await?
        .ok_or_else(|| BotError::NotFound(format!("correlation for {event_uid}")))?;

    let event = ctx
        .calendar
        .event_by_id(input.presser_id, &calendar_uid, event_uid)
        .await?;

    if let Some(target) = &input.message {
        renderer.show_event(target, &event, EventView::Short).await?;
    }
    // The short card carries the expand button again.
    ctx.correlations
        .remember(&event.uid, &event.calendar.uid)
        .await?;
    Ok(Dispatched::answer(CallbackAnswer::Silent))
}

async fn finalize(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    input: &CallbackInput,
) -> BotResult<Dispatched> {
    let mut session = ctx.sessions.load(input.presser_id).await?;
    if !session.is_create_active() {
        return Ok(Dispatched::answer(CallbackAnswer::NoDialog));
    }

    let missing = session.draft.missing_for_finalize();
    if !missing.is_empty() {
        return Err(BotError::Validation(missing));
    }

    let event = EventInput::from_draft(&session.draft)?;
    ctx.calendar.create_event(input.presser_id, &event).await?;
    tracing::info!("Event {} created for user {}", event.uid, input.presser_id);

    if let Some(prompt) = session.close() {
        retire_prompt(renderer, &prompt).await;
    }
    ctx.sessions.save(input.presser_id, &session).await?;

    renderer
        .send_notice(input.chat_id, Notice::Created { title: event.title })
        .await?;
    Ok(Dispatched::answer(CallbackAnswer::Created))
}

async fn cancel(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    input: &CallbackInput,
) -> BotResult<Dispatched> {
    let mut session = ctx.sessions.load(input.presser_id).await?;
    let retired = session.close();
    // The pressed menu may not be the one the session remembers.
    let pressed = input.message.filter(|m| Some(*m) != retired);

    for prompt in retired.iter().chain(pressed.iter()) {
        retire_prompt(renderer, prompt).await;
    }
    ctx.sessions.save(input.presser_id, &session).await?;

    renderer.send_notice(input.chat_id, Notice::Cancelled).await?;
    Ok(Dispatched::answer(CallbackAnswer::Cancelled))
}
