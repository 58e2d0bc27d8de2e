//! `/today`, `/next` and `/date`.

use crate::bot::commands::{CommandInput, TopLevelCommand};
use crate::bot::context::AppContext;
use crate::bot::handlers::dialog::retire_prompt;
use crate::bot::render::{Notice, Renderer};
use crate::dialog::{Ask, Instant};
use crate::error::BotResult;
use crate::services::calendar::Event;
use crate::utils::logging::log_store_error;

/// Entry point for a typed command. In groups the user confirms first,
/// since the listing would be visible to every member.
pub async fn guard_top_level(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    command: TopLevelCommand,
    input: &CommandInput,
) -> BotResult<()> {
    if !input.chat_is_private {
        renderer
            .send_group_alert(input.chat_id, input.message_id, command)
            .await?;
        return Ok(());
    }
    run_top_level(ctx, renderer, command, input).await
}

pub async fn run_top_level(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    command: TopLevelCommand,
    input: &CommandInput,
) -> BotResult<()> {
    match command {
        TopLevelCommand::Today => show_today(ctx, renderer, input).await,
        TopLevelCommand::Next => show_next(ctx, renderer, input).await,
        TopLevelCommand::Date => start_date_capture(ctx, renderer, input).await,
    }
}

pub async fn show_today(ctx: &AppContext, renderer: &dyn Renderer, input: &CommandInput) -> BotResult<()> {
    let events = ctx.calendar.events_today(input.user_id).await?;
    if events.is_empty() {
        renderer.send_notice(input.chat_id, Notice::NoEventsToday).await?;
        return Ok(());
    }

    renderer.send_notice(input.chat_id, Notice::TodayHeader).await?;
    send_events(ctx, renderer, input, &events).await
}

pub async fn show_next(ctx: &AppContext, renderer: &dyn Renderer, input: &CommandInput) -> BotResult<()> {
    match ctx.calendar.closest_event(input.user_id).await? {
        Some(event) => {
            renderer.send_notice(input.chat_id, Notice::NextHeader).await?;
            send_events(ctx, renderer, input, std::slice::from_ref(&event)).await
        }
        None => {
            renderer.send_notice(input.chat_id, Notice::NoClosestEvent).await?;
            Ok(())
        }
    }
}

/// Opens the date dialog; an unfinished creation dialog is dropped.
pub async fn start_date_capture(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    input: &CommandInput,
) -> BotResult<()> {
    let mut session = ctx.sessions.load(input.user_id).await?;
    let retired = session.close();
    session.start_date_capture();
    ctx.sessions.save(input.user_id, &session).await?;

    if let Some(prompt) = &retired {
        retire_prompt(renderer, prompt).await;
    }
    renderer.send_ask(input.chat_id, Ask::Date).await?;
    Ok(())
}

pub async fn show_date(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    input: &CommandInput,
    date: Instant,
) -> BotResult<()> {
    let events = ctx.calendar.events_on(input.user_id, date).await?;
    if events.is_empty() {
        renderer.send_notice(input.chat_id, Notice::NoEventsOnDate(date)).await?;
        return Ok(());
    }

    renderer.send_notice(input.chat_id, Notice::DateHeader(date)).await?;
    send_events(ctx, renderer, input, &events).await
}

/// Posts each event. In private chats the event is first remembered so its
/// "more" button can find it again; without that entry the button is left off.
async fn send_events(
    ctx: &AppContext,
    renderer: &dyn Renderer,
    input: &CommandInput,
    events: &[Event],
) -> BotResult<()> {
    for event in events {
        let expandable = input.chat_is_private && remember(ctx, event).await;
        renderer.send_event(input.chat_id, event, expandable).await?;
    }
    Ok(())
}

async fn remember(ctx: &AppContext, event: &Event) -> bool {
    match ctx.correlations.remember(&event.uid, &event.calendar.uid).await {
        Ok(()) => true,
        Err(e) => {
            log_store_error("remember", &event.uid, &e.to_string());
            false
        }
    }
}
