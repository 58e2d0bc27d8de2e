use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// Instants carry the offset the date parser resolved them in.
pub type Instant = DateTime<FixedOffset>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendeeRole {
    #[default]
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendeeStatus {
    #[default]
    NeedsAction,
    Accepted,
    Declined,
    Tentative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: AttendeeRole,
    #[serde(default)]
    pub status: AttendeeStatus,
}

impl Attendee {
    /// An invitee added during the dialog.
    pub fn invitee(email: &str) -> Self {
        Self {
            email: email.to_string(),
            name: None,
            role: AttendeeRole::Required,
            status: AttendeeStatus::NeedsAction,
        }
    }

    pub fn organizer(email: &str, name: Option<String>) -> Self {
        Self {
            email: email.to_string(),
            name,
            role: AttendeeRole::Required,
            status: AttendeeStatus::Accepted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    pub description: String,
}

/// An event under construction. Unset times are `None`, unset texts are empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDraft {
    pub from: Option<Instant>,
    pub to: Option<Instant>,
    pub full_day: bool,
    pub title: String,
    pub description: String,
    pub location: Option<Location>,
    pub organizer: Option<Attendee>,
    pub attendees: Vec<Attendee>,
}

impl EventDraft {
    /// Sets the start; a full-day draft drags its end along.
    pub fn set_from(&mut self, from: Instant) {
        self.from = Some(from);
        if self.full_day {
            self.to = Some(from + Duration::hours(24));
        }
    }

    /// Sets `to = from + length` and drops the full-day mark. Refused while
    /// the start is unknown.
    pub fn apply_duration(&mut self, length: Duration) -> bool {
        match self.from {
            Some(from) => {
                self.to = Some(from + length);
                self.full_day = false;
                true
            }
            None => false,
        }
    }

    /// Marks the event as lasting the whole day starting at `from`.
    pub fn set_full_day(&mut self) -> bool {
        if self.apply_duration(Duration::hours(24)) {
            self.full_day = true;
            true
        } else {
            false
        }
    }

    pub fn set_location(&mut self, description: &str) {
        self.location = Some(Location {
            description: description.to_string(),
        });
    }

    pub fn add_attendee(&mut self, email: &str) {
        self.attendees.push(Attendee::invitee(email));
    }

    /// Fields that still block finalizing, in display order.
    pub fn missing_for_finalize(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.from.is_none() {
            missing.push("from");
        }
        if self.to.is_none() {
            missing.push("to");
        }
        if self.title.is_empty() {
            missing.push("title");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_for_finalize().is_empty()
    }
}
