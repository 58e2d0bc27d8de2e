//! Conversational state: the per-user session, the event draft and the
//! transitions of the creation and date-capture dialogs.

pub mod draft;
pub mod machine;
pub mod session;

pub use draft::{Attendee, AttendeeRole, AttendeeStatus, EventDraft, Instant, Location};
pub use machine::{Ask, DateCaptureOutcome, DurationShortcut, Prompt, Transition, CANCEL_KEYWORD};
pub use session::{ActiveDialog, PromptRef, Session, Step};
