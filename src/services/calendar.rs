//! Calendar backend client.
//!
//! The backend keeps the users' OAuth tokens and is addressed by Telegram user
//! id; this side never sees a token.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::dialog::{Attendee, AttendeeRole, EventDraft, Instant, Location};
use crate::error::{BotError, CalendarError};

/// Title sent for drafts that never got one.
pub const UNTITLED_EVENT: &str = "Без названия";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarRef {
    pub uid: String,
    #[serde(default)]
    pub title: String,
}

/// An event as stored by the calendar service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub from: Instant,
    pub to: Instant,
    #[serde(default)]
    pub full_day: bool,
    #[serde(default)]
    pub location: Option<Location>,
    pub calendar: CalendarRef,
    #[serde(default)]
    pub organizer: Option<Attendee>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Video call link, when the event has one.
    #[serde(default)]
    pub call: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    data: EventsData,
}

#[derive(Debug, Deserialize)]
struct EventsData {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct EventResponse {
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    event: Event,
}

#[derive(Debug, Serialize)]
struct EventCalendarIds<'a> {
    calendar_id: &'a str,
    event_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeeInput {
    pub email: String,
    pub role: AttendeeRole,
}

/// Body of the create-event call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub uid: String,
    pub from: String,
    pub to: String,
    pub full_day: bool,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<AttendeeInput>>,
}

impl EventInput {
    /// Builds the create payload under a freshly generated uid.
    ///
    /// Both times are required; empty title and description are filled with
    /// the placeholder title and an empty string.
    pub fn from_draft(draft: &EventDraft) -> Result<Self, BotError> {
        let (from, to) = match (draft.from, draft.to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                let missing = draft
                    .missing_for_finalize()
                    .into_iter()
                    .filter(|field| *field != "title")
                    .collect();
                return Err(BotError::Validation(missing));
            }
        };

        let title = if draft.title.is_empty() {
            UNTITLED_EVENT.to_string()
        } else {
            draft.title.clone()
        };

        let location = draft
            .location
            .as_ref()
            .filter(|location| !location.description.is_empty())
            .cloned();

        let attendees = if draft.attendees.is_empty() {
            None
        } else {
            Some(
                draft
                    .attendees
                    .iter()
                    .map(|attendee| AttendeeInput {
                        email: attendee.email.clone(),
                        role: attendee.role,
                    })
                    .collect(),
            )
        };

        Ok(Self {
            uid: Uuid::new_v4().to_string(),
            from: from.to_rfc3339_opts(SecondsFormat::Secs, true),
            to: to.to_rfc3339_opts(SecondsFormat::Secs, true),
            full_day: draft.full_day,
            title,
            description: draft.description.clone(),
            location,
            attendees,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn events_today(&self, user_id: u64) -> Result<Vec<Event>, CalendarError>;

    /// The next upcoming event, if any.
    async fn closest_event(&self, user_id: u64) -> Result<Option<Event>, CalendarError>;

    async fn events_on(&self, user_id: u64, date: Instant) -> Result<Vec<Event>, CalendarError>;

    /// Fails with [`CalendarError::NotFound`] when the event is gone.
    async fn event_by_id(
        &self,
        user_id: u64,
        calendar_uid: &str,
        event_uid: &str,
    ) -> Result<Event, CalendarError>;

    async fn create_event(&self, user_id: u64, input: &EventInput) -> Result<(), CalendarError>;

    async fn user_info(&self, user_id: u64) -> Result<UserInfo, CalendarError>;
}

/// [`CalendarClient`] over the backend's REST API.
#[derive(Clone)]
pub struct HttpCalendarClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCalendarClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn user_url(&self, user_id: u64) -> String {
        format!("{}/api/v1/telegram/user/{}", self.base_url, user_id)
    }

    fn events_url(&self, user_id: u64, path: &str) -> String {
        format!("{}/events{}", self.user_url(user_id), path)
    }

    async fn fetch_events(&self, url: String) -> Result<Vec<Event>, CalendarError> {
        let response = self.client.get(&url).send().await?;
        match checked(response, "events").await {
            Ok(response) => Ok(response.json::<EventsResponse>().await?.data.events),
            Err(CalendarError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

/// Maps HTTP statuses onto [`CalendarError`].
async fn checked(response: reqwest::Response, what: &str) -> Result<reqwest::Response, CalendarError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(CalendarError::NotFound(what.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CalendarError::Unauthorized),
        status => Err(CalendarError::Status(status.as_u16())),
    }
}

#[async_trait]
impl CalendarClient for HttpCalendarClient {
    async fn events_today(&self, user_id: u64) -> Result<Vec<Event>, CalendarError> {
        self.fetch_events(self.events_url(user_id, "/today")).await
    }

    async fn closest_event(&self, user_id: u64) -> Result<Option<Event>, CalendarError> {
        let response = self
            .client
            .get(self.events_url(user_id, "/closest"))
            .send()
            .await?;
        match checked(response, "closest event").await {
            Ok(response) => Ok(Some(response.json::<EventResponse>().await?.data.event)),
            Err(CalendarError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn events_on(&self, user_id: u64, date: Instant) -> Result<Vec<Event>, CalendarError> {
        let date = date
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        self.fetch_events(self.events_url(user_id, &format!("/date/{date}")))
            .await
    }

    async fn event_by_id(
        &self,
        user_id: u64,
        calendar_uid: &str,
        event_uid: &str,
    ) -> Result<Event, CalendarError> {
        let response = self
            .client
            .put(self.events_url(user_id, "/calendar/event"))
            .json(&EventCalendarIds {
                calendar_id: calendar_uid,
                event_id: event_uid,
            })
            .send()
            .await?;
        let response = checked(response, &format!("event {event_uid}")).await?;
        Ok(response.json::<EventResponse>().await?.data.event)
    }

    async fn create_event(&self, user_id: u64, input: &EventInput) -> Result<(), CalendarError> {
        let response = self
            .client
            .post(self.events_url(user_id, "/event/create"))
            .json(input)
            .send()
            .await?;
        checked(response, "calendar").await?;
        Ok(())
    }

    async fn user_info(&self, user_id: u64) -> Result<UserInfo, CalendarError> {
        let response = self
            .client
            .get(format!("{}/info", self.user_url(user_id)))
            .send()
            .await?;
        let response = checked(response, "user").await?;
        Ok(response.json().await?)
    }
}
