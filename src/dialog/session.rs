use serde::{Deserialize, Serialize};

use crate::dialog::draft::{Attendee, EventDraft};

/// Position in the event-creation wizard.
///
/// The order below is the order the wizard walks on its own; the action menu
/// may re-enter any step directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Init,
    From,
    To,
    Title,
    Desc,
    Location,
    User,
}

impl Step {
    /// Name used in menu callback payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Init => "init",
            Step::From => "from",
            Step::To => "to",
            Step::Title => "title",
            Step::Desc => "desc",
            Step::Location => "location",
            Step::User => "user",
        }
    }

    /// Parses a menu payload. `init` is never a menu target.
    pub fn from_menu(value: &str) -> Option<Self> {
        match value {
            "from" => Some(Step::From),
            "to" => Some(Step::To),
            "title" => Some(Step::Title),
            "desc" => Some(Step::Desc),
            "location" => Some(Step::Location),
            "user" => Some(Step::User),
            _ => None,
        }
    }
}

/// Which multi-turn exchange currently owns the user's free text.
///
/// A single enum keeps "create" and "date capture" mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveDialog {
    #[default]
    None,
    Create,
    DateCapture,
}

/// Chat and message id of a prompt the bot may later delete or replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Per-user conversational state, persisted as one blob in the key-value store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub step: Step,
    pub active: ActiveDialog,
    pub draft: EventDraft,
    pub prompt_ref: Option<PromptRef>,
}

impl Session {
    pub fn is_create_active(&self) -> bool {
        self.active == ActiveDialog::Create
    }

    pub fn is_date_capture_active(&self) -> bool {
        self.active == ActiveDialog::DateCapture
    }

    /// Opens a fresh creation dialog. Any half-built draft is discarded.
    pub fn start_create(&mut self, organizer: Option<Attendee>) {
        self.active = ActiveDialog::Create;
        self.step = Step::From;
        self.draft = EventDraft {
            organizer,
            ..EventDraft::default()
        };
    }

    /// Switches to date capture; an unfinished creation dialog is abandoned.
    pub fn start_date_capture(&mut self) {
        self.active = ActiveDialog::DateCapture;
        self.step = Step::Init;
        self.draft = EventDraft::default();
    }

    /// Closes whatever dialog is active and hands back the outstanding prompt
    /// so the caller can delete it.
    pub fn close(&mut self) -> Option<PromptRef> {
        self.active = ActiveDialog::None;
        self.step = Step::Init;
        self.draft = EventDraft::default();
        self.prompt_ref.take()
    }
}
