//! Step transitions of the event-creation wizard and the date-capture dialog.
//!
//! Every function takes the session by value and hands back the updated one
//! together with what the user should see next. Nothing here touches Telegram
//! or the session store: the caller loads, advances, renders and saves.

use chrono::Duration;

use crate::dialog::draft::{Attendee, Instant};
use crate::dialog::session::{PromptRef, Session, Step};
use crate::error::ResolutionError;
use crate::services::date_parser::DateResolver;

/// Reply that aborts whichever dialog is active, at any step.
pub const CANCEL_KEYWORD: &str = "Отмена";

/// Fixed menu of answers accepted at the `To` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationShortcut {
    HalfHour,
    Hour,
    HourAndHalf,
    TwoHours,
    FourHours,
    SixHours,
    FullDay,
}

impl DurationShortcut {
    pub const ALL: [DurationShortcut; 7] = [
        DurationShortcut::HalfHour,
        DurationShortcut::Hour,
        DurationShortcut::HourAndHalf,
        DurationShortcut::TwoHours,
        DurationShortcut::FourHours,
        DurationShortcut::SixHours,
        DurationShortcut::FullDay,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DurationShortcut::HalfHour => "30 минут",
            DurationShortcut::Hour => "1 час",
            DurationShortcut::HourAndHalf => "1,5 часа",
            DurationShortcut::TwoHours => "2 часа",
            DurationShortcut::FourHours => "4 часа",
            DurationShortcut::SixHours => "6 часов",
            DurationShortcut::FullDay => "Весь день",
        }
    }

    pub fn length(&self) -> Duration {
        match self {
            DurationShortcut::HalfHour => Duration::minutes(30),
            DurationShortcut::Hour => Duration::hours(1),
            DurationShortcut::HourAndHalf => Duration::minutes(90),
            DurationShortcut::TwoHours => Duration::hours(2),
            DurationShortcut::FourHours => Duration::hours(4),
            DurationShortcut::SixHours => Duration::hours(6),
            DurationShortcut::FullDay => Duration::hours(24),
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|shortcut| shortcut.label() == text)
    }
}

/// Question attached to a prompt, telling the user what to type next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ask {
    From,
    Duration,
    Title,
    Description,
    Location,
    Attendee,
    Date,
}

/// What the caller should render after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// The dialog was cancelled by the user.
    Cancelled,
    /// The date parser did not understand the text; ask again.
    DateNotParsed,
    /// Show the whole draft with its action menu, then the question if any.
    /// The caller stores the reference of the draft message in the session.
    Draft { ask: Option<Ask> },
    /// Only ask a question; the current draft message stays as is.
    Ask(Ask),
    /// No dialog is active for this user.
    Idle,
}

/// Result of one step of the creation wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: Session,
    pub prompt: Prompt,
    /// Prompt that no longer reflects the session and must be deleted.
    pub retired: Option<PromptRef>,
}

impl Transition {
    fn new(session: Session, prompt: Prompt) -> Self {
        Self {
            session,
            prompt,
            retired: None,
        }
    }

    /// The draft changed: the old prompt goes, a fresh one replaces it.
    fn mutated(mut session: Session) -> Self {
        let retired = session.prompt_ref.take();
        let ask = pending_ask(&session);
        Self {
            session,
            prompt: Prompt::Draft { ask },
            retired,
        }
    }
}

fn is_cancel(text: &str) -> bool {
    text.trim() == CANCEL_KEYWORD
}

/// Question implied by the current step once the draft has been updated.
fn pending_ask(session: &Session) -> Option<Ask> {
    let draft = &session.draft;
    match session.step {
        Step::Init | Step::From if draft.from.is_none() => Some(Ask::From),
        Step::To if draft.to.is_none() => Some(Ask::Duration),
        Step::Title if draft.title.is_empty() => Some(Ask::Title),
        Step::User => Some(Ask::Attendee),
        _ => None,
    }
}

/// Question asked when the user enters `step` from the menu.
pub fn ask_for(step: Step) -> Ask {
    match step {
        Step::Init | Step::From => Ask::From,
        Step::To => Ask::Duration,
        Step::Title => Ask::Title,
        Step::Desc => Ask::Description,
        Step::Location => Ask::Location,
        Step::User => Ask::Attendee,
    }
}

/// Opens the creation wizard.
pub fn start_create(mut session: Session, organizer: Option<Attendee>) -> Transition {
    let retired = session.prompt_ref.take();
    session.start_create(organizer);
    Transition {
        session,
        prompt: Prompt::Ask(Ask::From),
        retired,
    }
}

/// Feeds one free-text message into the creation wizard.
///
/// A [`ResolutionError`] aborts the step: the caller keeps the session it had.
pub async fn advance(
    mut session: Session,
    text: &str,
    resolver: &dyn DateResolver,
    timezone: &str,
) -> Result<Transition, ResolutionError> {
    if !session.is_create_active() {
        return Ok(Transition::new(session, Prompt::Idle));
    }

    if is_cancel(text) {
        let retired = session.close();
        return Ok(Transition {
            session,
            prompt: Prompt::Cancelled,
            retired,
        });
    }

    match session.step {
        Step::Init | Step::From => {
            let Some(from) = resolver.resolve(text, timezone).await? else {
                return Ok(Transition::new(session, Prompt::DateNotParsed));
            };
            session.step = Step::From;
            session.draft.set_from(from);
            if session.draft.to.is_none() {
                session.step = Step::To;
            }
        }
        Step::To => {
            if let Some(shortcut) = DurationShortcut::from_label(text) {
                let applied = match shortcut {
                    DurationShortcut::FullDay => session.draft.set_full_day(),
                    other => session.draft.apply_duration(other.length()),
                };
                if !applied {
                    session.step = Step::From;
                    return Ok(Transition::new(session, Prompt::Ask(Ask::From)));
                }
            } else {
                // Anything that is not a duration is read as a new start time.
                let Some(from) = resolver.resolve(text, timezone).await? else {
                    return Ok(Transition::new(session, Prompt::DateNotParsed));
                };
                session.draft.set_from(from);
            }
            if session.draft.title.is_empty() {
                session.step = Step::Title;
            }
        }
        Step::Title | Step::Desc | Step::Location | Step::User if text.trim().is_empty() => {
            let ask = ask_for(session.step);
            return Ok(Transition::new(session, Prompt::Ask(ask)));
        }
        Step::Title => session.draft.title = text.to_string(),
        Step::Desc => session.draft.description = text.to_string(),
        Step::Location => session.draft.set_location(text),
        Step::User => session.draft.add_attendee(text.trim()),
    }

    Ok(Transition::mutated(session))
}

/// Menu re-entry: moves the cursor to `target` without touching the draft.
pub fn jump(mut session: Session, target: Step) -> Transition {
    if !session.is_create_active() {
        return Transition::new(session, Prompt::Idle);
    }

    session.step = match target {
        Step::To if session.draft.from.is_none() => Step::From,
        Step::Init => Step::From,
        other => other,
    };
    let ask = ask_for(session.step);
    Transition::new(session, Prompt::Ask(ask))
}

/// Menu "full day" button.
pub fn select_full_day(mut session: Session) -> Transition {
    if !session.is_create_active() {
        return Transition::new(session, Prompt::Idle);
    }

    if !session.draft.set_full_day() {
        session.step = Step::From;
        return Transition::new(session, Prompt::Ask(Ask::From));
    }
    if session.draft.title.is_empty() {
        session.step = Step::Title;
    }
    Transition::mutated(session)
}

/// What the date-capture dialog decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateCaptureOutcome {
    Cancelled,
    NotParsed,
    /// Show the events of this day.
    Resolved(Instant),
    Idle,
}

/// Feeds one free-text message into the `/date` dialog.
pub async fn advance_date_capture(
    mut session: Session,
    text: &str,
    resolver: &dyn DateResolver,
    timezone: &str,
) -> Result<(Session, DateCaptureOutcome), ResolutionError> {
    if !session.is_date_capture_active() {
        return Ok((session, DateCaptureOutcome::Idle));
    }

    if is_cancel(text) {
        session.close();
        return Ok((session, DateCaptureOutcome::Cancelled));
    }

    match resolver.resolve(text, timezone).await? {
        Some(date) => {
            session.close();
            Ok((session, DateCaptureOutcome::Resolved(date)))
        }
        None => Ok((session, DateCaptureOutcome::NotParsed)),
    }
}
