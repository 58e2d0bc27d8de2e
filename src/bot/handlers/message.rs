use teloxide::prelude::*;

use crate::bot::commands::{create, events, Command, CommandInput, TopLevelCommand};
use crate::bot::context::AppContext;
use crate::bot::handlers::dialog::{handle_text, report_failure, TextInput};
use crate::bot::render::{Notice, Renderer, TelegramRenderer};
use crate::bot::HandlerResult;
use crate::error::BotResult;
use crate::utils::logging::{log_command_error, log_command_start, log_command_success};

fn command_name(cmd: &Command) -> &'static str {
    match cmd {
        Command::Help => "help",
        Command::Start => "start",
        Command::Today => "today",
        Command::Next => "next",
        Command::Date => "date",
        Command::Create => "create",
    }
}

pub async fn command_handler(bot: Bot, msg: Message, cmd: Command, ctx: AppContext) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let input = CommandInput {
        user_id: user.id.0,
        chat_id: msg.chat.id.0,
        chat_is_private: msg.chat.is_private(),
        message_id: msg.id.0,
    };
    let name = command_name(&cmd);
    log_command_start(name, input.user_id, input.chat_id, None);

    let renderer = TelegramRenderer::new(bot, &ctx.timezone);
    let result: BotResult<()> = match cmd {
        Command::Help => renderer.send_help(input.chat_id).await.map_err(Into::into),
        Command::Start => renderer
            .send_notice(input.chat_id, Notice::Welcome)
            .await
            .map_err(Into::into),
        Command::Today => events::guard_top_level(&ctx, &renderer, TopLevelCommand::Today, &input).await,
        Command::Next => events::guard_top_level(&ctx, &renderer, TopLevelCommand::Next, &input).await,
        Command::Date => events::guard_top_level(&ctx, &renderer, TopLevelCommand::Date, &input).await,
        Command::Create => create::start_create(&ctx, &renderer, &input).await,
    };

    match result {
        Ok(()) => log_command_success(name, input.user_id, input.chat_id, None),
        Err(e) => {
            log_command_error(name, input.user_id, input.chat_id, &e.to_string());
            report_failure(&renderer, input.chat_id, name, &e).await?;
        }
    }
    Ok(())
}

/// Any non-command text: feeds the user's active dialog.
pub async fn text_handler(bot: Bot, msg: Message, ctx: AppContext) -> HandlerResult {
    let (Some(user), Some(text)) = (msg.from(), msg.text()) else {
        return Ok(());
    };
    if text.starts_with('/') {
        tracing::debug!("Ignoring unknown command '{}' from {}", text, user.id);
        return Ok(());
    }

    let input = TextInput {
        user_id: user.id.0,
        chat_id: msg.chat.id.0,
        chat_is_private: msg.chat.is_private(),
        message_id: msg.id.0,
        text: text.to_string(),
    };

    let renderer = TelegramRenderer::new(bot, &ctx.timezone);
    if let Err(e) = handle_text(&ctx, &renderer, &input).await {
        report_failure(&renderer, input.chat_id, "dialog", &e).await?;
    }
    Ok(())
}
