use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, KeyboardRemove,
    ReplyMarkup,
};

use crate::bot::commands::TopLevelCommand;
use crate::bot::handlers::dispatcher::CallbackAction;
use crate::bot::texts;
use crate::dialog::{Ask, DurationShortcut, Instant, Session, Step, CANCEL_KEYWORD};
use crate::services::calendar::Event;
use crate::utils::validation::validate_callback_data;

const MENU_STEPS: [Step; 6] = [
    Step::From,
    Step::To,
    Step::Title,
    Step::Desc,
    Step::Location,
    Step::User,
];

/// Button carrying `action`, or `None` when its payload would be refused by Telegram.
fn callback_button(text: &str, action: &CallbackAction) -> Option<InlineKeyboardButton> {
    let data = action.encode();
    match validate_callback_data(&data) {
        Ok(()) => Some(InlineKeyboardButton::callback(text, data)),
        Err(e) => {
            tracing::warn!("Dropping button '{}': {}", text, e);
            None
        }
    }
}

pub fn expand_keyboard(event_uid: &str) -> Option<InlineKeyboardMarkup> {
    let button = callback_button(texts::BUTTON_EXPAND, &CallbackAction::Expand(event_uid.to_string()))?;
    Some(InlineKeyboardMarkup::new(vec![vec![button]]))
}

/// Buttons under an expanded event: the call link if any, then "collapse".
pub fn collapse_keyboard(event: &Event) -> Option<InlineKeyboardMarkup> {
    let mut rows = Vec::new();

    if let Some(call) = event.call.as_deref().filter(|c| !c.is_empty()) {
        match reqwest::Url::parse(call) {
            Ok(url) => rows.push(vec![InlineKeyboardButton::url(texts::BUTTON_JOIN_CALL, url)]),
            Err(e) => tracing::warn!("Ignoring call link of event {}: {}", event.uid, e),
        }
    }

    if let Some(button) =
        callback_button(texts::BUTTON_COLLAPSE, &CallbackAction::Collapse(event.uid.clone()))
    {
        rows.push(vec![button]);
    }

    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(rows))
    }
}

/// Action menu under a draft. The current step is left out, "create" only
/// appears once the draft can be finalized.
pub fn draft_keyboard(session: &Session) -> InlineKeyboardMarkup {
    let draft = &session.draft;
    let mut buttons: Vec<InlineKeyboardButton> = MENU_STEPS
        .into_iter()
        .filter(|step| *step != session.step)
        .filter_map(|step| {
            callback_button(texts::step_button_label(step, draft), &CallbackAction::Menu(step))
        })
        .collect();

    if !draft.full_day {
        buttons.extend(callback_button(texts::BUTTON_FULL_DAY, &CallbackAction::FullDay));
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> =
        buttons.chunks(2).map(|pair| pair.to_vec()).collect();

    let mut last_row = Vec::new();
    if draft.is_complete() {
        last_row.extend(callback_button(texts::BUTTON_CREATE, &CallbackAction::Create));
    }
    last_row.extend(callback_button(texts::BUTTON_CANCEL, &CallbackAction::Cancel));
    rows.push(last_row);

    InlineKeyboardMarkup::new(rows)
}

pub fn group_alert_keyboard(command: TopLevelCommand) -> InlineKeyboardMarkup {
    let buttons = [
        callback_button(texts::BUTTON_YES, &CallbackAction::AlertYes(command)),
        callback_button(texts::BUTTON_NO, &CallbackAction::AlertNo),
    ];
    InlineKeyboardMarkup::new(vec![buttons.into_iter().flatten().collect::<Vec<_>>()])
}

fn reply_keyboard<I, R>(rows: I) -> ReplyMarkup
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut keyboard: Vec<Vec<KeyboardButton>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect())
        .collect();
    keyboard.push(vec![KeyboardButton::new(CANCEL_KEYWORD)]);

    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(keyboard)
            .resize_keyboard(true)
            .one_time_keyboard(true),
    )
}

/// Quick-reply keyboard matching the question being asked. `now` seeds the
/// date shortcuts.
pub fn ask_keyboard(ask: Ask, now: &Instant) -> ReplyMarkup {
    match ask {
        Ask::From => reply_keyboard(
            texts::START_SHORTCUTS
                .iter()
                .map(|row| row.iter().map(|label| label.to_string()).collect::<Vec<_>>()),
        ),
        Ask::Duration => reply_keyboard(
            DurationShortcut::ALL
                .chunks(3)
                .map(|row| row.iter().map(|s| s.label().to_string()).collect::<Vec<_>>()),
        ),
        Ask::Date => reply_keyboard(
            texts::date_shortcuts(now)
                .chunks(3)
                .map(|row| row.to_vec())
                .collect::<Vec<_>>(),
        ),
        Ask::Title | Ask::Description | Ask::Location | Ask::Attendee => {
            ReplyMarkup::KeyboardRemove(KeyboardRemove::new())
        }
    }
}
