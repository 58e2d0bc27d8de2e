#![allow(dead_code)]

use async_trait::async_trait;
use chrono::DateTime;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use teloxide::prelude::ResponseResult;

use calendar_chat_bot::bot::commands::TopLevelCommand;
use calendar_chat_bot::bot::render::{EventView, Notice, Renderer};
use calendar_chat_bot::bot::AppContext;
use calendar_chat_bot::database::InMemoryKvStore;
use calendar_chat_bot::dialog::{Ask, Instant, PromptRef, Session};
use calendar_chat_bot::error::{CalendarError, ResolutionError};
use calendar_chat_bot::services::calendar::{CalendarClient, CalendarRef, Event, EventInput, UserInfo};
use calendar_chat_bot::services::correlation::CorrelationStore;
use calendar_chat_bot::services::date_parser::DateResolver;
use calendar_chat_bot::services::session_store::SessionStore;

pub const TZ: &str = "Europe/Moscow";

pub fn at(s: &str) -> Instant {
    DateTime::parse_from_rfc3339(s).unwrap()
}

pub fn event(uid: &str, calendar_uid: &str, title: &str) -> Event {
    Event {
        uid: uid.to_string(),
        title: title.to_string(),
        description: String::new(),
        from: at("2024-05-17T10:00:00+03:00"),
        to: at("2024-05-17T11:00:00+03:00"),
        full_day: false,
        location: None,
        calendar: CalendarRef {
            uid: calendar_uid.to_string(),
            title: "Работа".to_string(),
        },
        organizer: None,
        attendees: Vec::new(),
        call: None,
    }
}

/// Resolver answering from a fixed table; unknown text is "not understood".
#[derive(Default)]
pub struct FakeResolver {
    answers: Mutex<HashMap<String, Instant>>,
    failing: Mutex<bool>,
    calls: AtomicUsize,
}

impl FakeResolver {
    pub fn knows(&self, text: &str, instant: Instant) {
        self.answers.lock().unwrap().insert(text.to_string(), instant);
    }

    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DateResolver for FakeResolver {
    async fn resolve(&self, text: &str, _timezone: &str) -> Result<Option<Instant>, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.failing.lock().unwrap() {
            return Err(ResolutionError::Status(503));
        }
        Ok(self.answers.lock().unwrap().get(text).copied())
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    pub today: Mutex<Vec<Event>>,
    pub closest: Mutex<Option<Event>>,
    pub on_date: Mutex<Vec<Event>>,
    /// Keyed by (calendar uid, event uid).
    pub by_id: Mutex<HashMap<(String, String), Event>>,
    pub created: Mutex<Vec<EventInput>>,
    pub user: Mutex<Option<UserInfo>>,
    pub unauthorized: Mutex<bool>,
    pub create_fails: Mutex<bool>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCalendar {
    pub fn store(&self, event: Event) {
        self.by_id
            .lock()
            .unwrap()
            .insert((event.calendar.uid.clone(), event.uid.clone()), event);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> Result<(), CalendarError> {
        self.calls.lock().unwrap().push(call.to_string());
        if *self.unauthorized.lock().unwrap() {
            Err(CalendarError::Unauthorized)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CalendarClient for FakeCalendar {
    async fn events_today(&self, _user_id: u64) -> Result<Vec<Event>, CalendarError> {
        self.record("today")?;
        Ok(self.today.lock().unwrap().clone())
    }

    async fn closest_event(&self, _user_id: u64) -> Result<Option<Event>, CalendarError> {
        self.record("closest")?;
        Ok(self.closest.lock().unwrap().clone())
    }

    async fn events_on(&self, _user_id: u64, date: Instant) -> Result<Vec<Event>, CalendarError> {
        self.record(&format!("date:{}", date.to_rfc3339()))?;
        Ok(self.on_date.lock().unwrap().clone())
    }

    async fn event_by_id(
        &self,
        _user_id: u64,
        calendar_uid: &str,
        event_uid: &str,
    ) -> Result<Event, CalendarError> {
        self.record(&format!("event:{calendar_uid}/{event_uid}"))?;
        self.by_id
            .lock()
            .unwrap()
            .get(&(calendar_uid.to_string(), event_uid.to_string()))
            .cloned()
            .ok_or_else(|| CalendarError::NotFound(format!("event {event_uid}")))
    }

    async fn create_event(&self, _user_id: u64, input: &EventInput) -> Result<(), CalendarError> {
        self.record("create")?;
        if *self.create_fails.lock().unwrap() {
            return Err(CalendarError::Status(500));
        }
        self.created.lock().unwrap().push(input.clone());
        Ok(())
    }

    async fn user_info(&self, _user_id: u64) -> Result<UserInfo, CalendarError> {
        self.record("user_info")?;
        self.user
            .lock()
            .unwrap()
            .clone()
            .ok_or(CalendarError::Status(500))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Notice(i64, Notice),
    Ask(i64, Ask),
    Draft {
        prompt: PromptRef,
        reply_to: Option<i32>,
        complete: bool,
    },
    Deleted(PromptRef),
    Event {
        chat_id: i64,
        uid: String,
        expandable: bool,
    },
    Shown {
        target: PromptRef,
        uid: String,
        view: EventView,
    },
    GroupAlert {
        chat_id: i64,
        reply_to: i32,
        command: TopLevelCommand,
    },
    Help(i64),
}

/// Renderer that remembers everything it was asked to show.
pub struct RecordingRenderer {
    pub log: Mutex<Vec<Rendered>>,
    next_message_id: AtomicI32,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            next_message_id: AtomicI32::new(1000),
        }
    }
}

impl RecordingRenderer {
    pub fn take(&self) -> Vec<Rendered> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    fn push(&self, rendered: Rendered) {
        self.log.lock().unwrap().push(rendered);
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn send_notice(&self, chat_id: i64, notice: Notice) -> ResponseResult<()> {
        self.push(Rendered::Notice(chat_id, notice));
        Ok(())
    }

    async fn send_ask(&self, chat_id: i64, ask: Ask) -> ResponseResult<()> {
        self.push(Rendered::Ask(chat_id, ask));
        Ok(())
    }

    async fn send_draft(
        &self,
        chat_id: i64,
        session: &Session,
        reply_to: Option<i32>,
    ) -> ResponseResult<PromptRef> {
        let prompt = PromptRef {
            chat_id,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
        };
        self.push(Rendered::Draft {
            prompt,
            reply_to,
            complete: session.draft.is_complete(),
        });
        Ok(prompt)
    }

    async fn delete(&self, prompt: &PromptRef) -> ResponseResult<()> {
        self.push(Rendered::Deleted(*prompt));
        Ok(())
    }

    async fn send_event(&self, chat_id: i64, event: &Event, expandable: bool) -> ResponseResult<()> {
        self.push(Rendered::Event {
            chat_id,
            uid: event.uid.clone(),
            expandable,
        });
        Ok(())
    }

    async fn show_event(&self, target: &PromptRef, event: &Event, view: EventView) -> ResponseResult<()> {
        self.push(Rendered::Shown {
            target: *target,
            uid: event.uid.clone(),
            view,
        });
        Ok(())
    }

    async fn send_group_alert(
        &self,
        chat_id: i64,
        reply_to: i32,
        command: TopLevelCommand,
    ) -> ResponseResult<()> {
        self.push(Rendered::GroupAlert {
            chat_id,
            reply_to,
            command,
        });
        Ok(())
    }

    async fn send_help(&self, chat_id: i64) -> ResponseResult<()> {
        self.push(Rendered::Help(chat_id));
        Ok(())
    }
}

/// Wires an [`AppContext`] to in-memory fakes.
pub struct Harness {
    pub ctx: AppContext,
    pub kv: Arc<InMemoryKvStore>,
    pub resolver: Arc<FakeResolver>,
    pub calendar: Arc<FakeCalendar>,
    pub renderer: RecordingRenderer,
}

impl Harness {
    pub fn new() -> Self {
        let kv = Arc::new(InMemoryKvStore::new());
        let resolver = Arc::new(FakeResolver::default());
        let calendar = Arc::new(FakeCalendar::default());

        let ctx = AppContext {
            sessions: SessionStore::new(kv.clone()),
            correlations: CorrelationStore::new(kv.clone()),
            resolver: resolver.clone(),
            calendar: calendar.clone(),
            timezone: TZ.to_string(),
        };

        Self {
            ctx,
            kv,
            resolver,
            calendar,
            renderer: RecordingRenderer::default(),
        }
    }

    pub async fn session(&self, user_id: u64) -> Session {
        self.ctx.sessions.load(user_id).await.unwrap()
    }

    pub async fn put_session(&self, user_id: u64, session: &Session) {
        self.ctx.sessions.save(user_id, session).await.unwrap();
    }
}
