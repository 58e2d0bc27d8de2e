//! Russian user-facing strings. Everything returned here is MarkdownV2-ready
//! unless the function name says otherwise.

use chrono::{Datelike, Duration};

use crate::bot::commands::TopLevelCommand;
use crate::bot::handlers::dispatcher::CallbackAnswer;
use crate::bot::render::{EventView, Notice};
use crate::dialog::{Ask, EventDraft, Instant, Step};
use crate::services::calendar::Event;
use crate::utils::datetime::{format_date, format_datetime, format_span};
use crate::utils::feedback::FeedbackType;
use crate::utils::markdown::{bold, escape_markdown, escape_link_target};

pub const WELCOME: &str = "Привет! Я показываю события из вашего календаря и помогаю создавать новые.\n\n/today - события на сегодня\n/next - ближайшее событие\n/date - события на выбранную дату\n/create - создать событие";

pub const BUTTON_CREATE: &str = "✅ Создать";
pub const BUTTON_CANCEL: &str = "❌ Отмена";
pub const BUTTON_FULL_DAY: &str = "Весь день";
pub const BUTTON_EXPAND: &str = "Подробнее";
pub const BUTTON_COLLAPSE: &str = "Свернуть";
pub const BUTTON_JOIN_CALL: &str = "Подключиться к звонку";
pub const BUTTON_YES: &str = "Да";
pub const BUTTON_NO: &str = "Нет";

/// Quick answers offered when the wizard asks for a start time.
pub const START_SHORTCUTS: [[&str; 4]; 3] = [
    ["Через полчаса", "Через час", "Через два часа", "Через три часа"],
    ["Сегодня в 9:00", "Сегодня в 12:00", "Сегодня в 15:00", "Сегодня в 18:00"],
    ["Завтра в 9:00", "Завтра в 12:00", "Завтра в 15:00", "Завтра в 18:00"],
];

const MONTHS_GENITIVE: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
    "октября", "ноября", "декабря",
];

/// Plain-text day label such as "17 мая".
pub fn day_label(day: &Instant) -> String {
    let month = MONTHS_GENITIVE[day.month0() as usize];
    format!("{} {}", day.day(), month)
}

/// Plain-text quick answers for the date dialog: today and the five days after it.
pub fn date_shortcuts(today: &Instant) -> Vec<String> {
    (0..6)
        .map(|offset| {
            let day = *today + Duration::days(offset);
            match offset {
                0 => format!("{}, Сегодня", day_label(&day)),
                1 => format!("{}, Завтра", day_label(&day)),
                _ => day_label(&day),
            }
        })
        .collect()
}

pub fn feedback_type(notice: &Notice) -> Option<FeedbackType> {
    match notice {
        Notice::Created { .. } => Some(FeedbackType::Success),
        Notice::DateNotParsed | Notice::NotAuthorized => Some(FeedbackType::Warning),
        Notice::ServiceFailure => Some(FeedbackType::Error),
        Notice::TodayHeader | Notice::NextHeader | Notice::DateHeader(_) => None,
        _ => Some(FeedbackType::Info),
    }
}

/// Plain text of a notice; the renderer escapes and decorates it.
pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::Welcome => WELCOME.to_string(),
        Notice::Cancelled => "Создание события отменено.".to_string(),
        Notice::DateCancelled => "Хорошо, не ищем.".to_string(),
        Notice::DateNotParsed => "Не получилось распознать дату, попробуйте ещё раз.".to_string(),
        Notice::NothingInProgress => "Сейчас ничего не создаётся. Начните с /create.".to_string(),
        Notice::ServiceFailure => "Что-то пошло не так, попробуйте позже.".to_string(),
        Notice::NotAuthorized => {
            "Календарь не подключён. Авторизуйтесь в сервисе календаря и повторите.".to_string()
        }
        Notice::NoEventsToday => "На сегодня событий нет.".to_string(),
        Notice::NoClosestEvent => "Ближайших событий нет.".to_string(),
        Notice::NoEventsOnDate(day) => format!("На {} событий нет.", format_date(day)),
        Notice::TodayHeader => "События на сегодня:".to_string(),
        Notice::NextHeader => "Ближайшее событие:".to_string(),
        Notice::DateHeader(day) => format!("События на {}:", format_date(day)),
        Notice::Created { title } => format!("Событие «{title}» создано."),
    }
}

/// Plain-text question for the next wizard input.
pub fn ask_text(ask: Ask) -> &'static str {
    match ask {
        Ask::From => "Когда начало? Например: «завтра в 10:00».",
        Ask::Duration => "Сколько длится? Выберите вариант или пришлите другое время начала.",
        Ask::Title => "Как назвать событие?",
        Ask::Description => "Пришлите описание события.",
        Ask::Location => "Где пройдёт событие?",
        Ask::Attendee => "Пришлите email участника.",
        Ask::Date => "На какую дату показать события?",
    }
}

/// Label of a draft-menu button. "Add" turns into "change" once the field is set.
pub fn step_button_label(step: Step, draft: &EventDraft) -> &'static str {
    match step {
        Step::Init | Step::From => "Изменить начало",
        Step::To => "Изменить окончание",
        Step::Title if draft.title.is_empty() => "Добавить название",
        Step::Title => "Изменить название",
        Step::Desc if draft.description.is_empty() => "Добавить описание",
        Step::Desc => "Изменить описание",
        Step::Location if draft.location.is_none() => "Добавить место",
        Step::Location => "Изменить место",
        Step::User => "Добавить участника",
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "from" => "начало",
        "to" => "окончание",
        "title" => "название",
        other => other,
    }
}

/// Plain text for answering a button press, `None` when the spinner should just stop.
pub fn answer_text(answer: &CallbackAnswer) -> Option<String> {
    match answer {
        CallbackAnswer::Silent => None,
        CallbackAnswer::EventTitle(title) => Some(title.clone()),
        CallbackAnswer::NotAllowed => Some("Эта кнопка не для вас.".to_string()),
        CallbackAnswer::NotFound => {
            Some("Не удалось найти событие, запросите список заново.".to_string())
        }
        CallbackAnswer::Unavailable => Some("Событие больше недоступно.".to_string()),
        CallbackAnswer::Incomplete(missing) => {
            let fields: Vec<&str> = missing.iter().map(|field| field_label(field)).collect();
            Some(format!("Не хватает данных: {}.", fields.join(", ")))
        }
        CallbackAnswer::Created => Some("Событие создано.".to_string()),
        CallbackAnswer::Cancelled => Some("Отменено.".to_string()),
        CallbackAnswer::NoDialog => Some("Это событие уже не редактируется.".to_string()),
        CallbackAnswer::NotAuthorized => Some("Календарь не подключён.".to_string()),
        CallbackAnswer::Failure => Some("Что-то пошло не так, попробуйте позже.".to_string()),
    }
}

/// Plain-text question posted under a top-level command issued in a group.
pub fn group_alert_text(command: TopLevelCommand) -> String {
    let what = match command {
        TopLevelCommand::Today => "события на сегодня",
        TopLevelCommand::Next => "ближайшее событие",
        TopLevelCommand::Date => "события на дату",
    };
    format!("Это групповой чат. Показать {what} всем участникам?")
}

fn line(label: &str, value: &str) -> String {
    format!("{}: {}\n", bold(label), escape_markdown(value))
}

/// Snapshot of a draft with its fields, shown above the action menu.
pub fn draft_text(draft: &EventDraft) -> String {
    let mut text = format!("{}\n\n", bold("Новое событие"));

    let unset = "не задано";
    let from = draft.from.as_ref().map(format_datetime);
    let to = draft.to.as_ref().map(format_datetime);
    text.push_str(&line("Начало", from.as_deref().unwrap_or(unset)));
    if draft.full_day {
        text.push_str(&line("Длительность", "весь день"));
    } else {
        text.push_str(&line("Окончание", to.as_deref().unwrap_or(unset)));
    }

    let title = if draft.title.is_empty() { unset } else { draft.title.as_str() };
    text.push_str(&line("Название", title));

    if !draft.description.is_empty() {
        text.push_str(&line("Описание", &draft.description));
    }
    if let Some(location) = &draft.location {
        text.push_str(&line("Место", &location.description));
    }
    if !draft.attendees.is_empty() {
        let emails: Vec<&str> = draft.attendees.iter().map(|a| a.email.as_str()).collect();
        text.push_str(&line("Участники", &emails.join(", ")));
    }

    text
}

/// Listing of one event, short or with every detail the backend returned.
pub fn event_text(event: &Event, view: EventView) -> String {
    let title = if event.title.is_empty() {
        crate::services::calendar::UNTITLED_EVENT
    } else {
        event.title.as_str()
    };
    let mut text = format!(
        "{}\n{}\n",
        bold(title),
        escape_markdown(&format_span(&event.from, &event.to, event.full_day))
    );

    if let Some(location) = event.location.as_ref().filter(|l| !l.description.is_empty()) {
        text.push_str(&line("Место", &location.description));
    }

    if view == EventView::Short {
        return text;
    }

    if !event.description.is_empty() {
        text.push_str(&format!("\n{}\n\n", escape_markdown(&event.description)));
    }
    if !event.calendar.title.is_empty() {
        text.push_str(&line("Календарь", &event.calendar.title));
    }
    if let Some(organizer) = &event.organizer {
        let who = organizer.name.as_deref().unwrap_or(&organizer.email);
        text.push_str(&line("Организатор", who));
    }
    if !event.attendees.is_empty() {
        let emails: Vec<&str> = event.attendees.iter().map(|a| a.email.as_str()).collect();
        text.push_str(&line("Участники", &emails.join(", ")));
    }
    if let Some(call) = event.call.as_deref().filter(|c| !c.is_empty()) {
        text.push_str(&format!(
            "[{}]({})\n",
            escape_markdown("Ссылка на звонок"),
            escape_link_target(call)
        ));
    }

    text
}
