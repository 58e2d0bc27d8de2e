use crate::bot::commands::CommandInput;
use crate::bot::context::AppContext;
use crate::bot::handlers::dialog::apply_transition;
use crate::bot::render::{Notice, Renderer};
use crate::dialog::{machine, Attendee};
use crate::error::{BotResult, CalendarError};
use crate::utils::logging::log_external_error;

/// `/create`: opens the wizard with the user as organizer when the calendar
/// service knows who they are.
pub async fn start_create(ctx: &AppContext, renderer: &dyn Renderer, input: &CommandInput) -> BotResult<()> {
    let organizer = match ctx.calendar.user_info(input.user_id).await {
        Ok(info) => Some(Attendee::organizer(&info.email, info.name)),
        Err(CalendarError::Unauthorized) => {
            renderer.send_notice(input.chat_id, Notice::NotAuthorized).await?;
            return Ok(());
        }
        Err(e) => {
            log_external_error("calendar", "user_info", &e.to_string());
            None
        }
    };

    let session = ctx.sessions.load(input.user_id).await?;
    let transition = machine::start_create(session, organizer);
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
