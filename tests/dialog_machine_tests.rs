mod common;

use chrono::Duration;
use common::{at, FakeResolver, TZ};

use calendar_chat_bot::dialog::machine::{advance, advance_date_capture, jump, select_full_day, start_create};
use calendar_chat_bot::dialog::{
    Ask, Attendee, DateCaptureOutcome, Prompt, PromptRef, Session, Step, CANCEL_KEYWORD,
};
use calendar_chat_bot::error::ResolutionError;
use calendar_chat_bot::services::calendar::EventInput;

fn create_session() -> Session {
    start_create(Session::default(), None).session
}

fn resolver() -> FakeResolver {
    let resolver = FakeResolver::default();
    resolver.knows("завтра в 10:00", at("2024-05-18T10:00:00+03:00"));
    resolver.knows("tomorrow 10:00", at("2024-05-18T10:00:00+03:00"));
    resolver.knows("в пятницу в 15:00", at("2024-05-17T15:00:00+03:00"));
    resolver
}

#[test]
fn test_start_create_resets_draft_and_sets_step_from() {
    let mut session = Session::default();
    session.draft.title = "Старое".to_string();
    session.draft.set_from(at("2024-01-01T09:00:00+03:00"));
    session.start_date_capture();

    let organizer = Attendee::organizer("me@example.com", None);
    let transition = start_create(session, Some(organizer.clone()));

    assert!(transition.session.is_create_active());
    assert!(!transition.session.is_date_capture_active());
    assert_eq!(transition.session.step, Step::From);
    assert_eq!(transition.session.draft.from, None);
    assert!(transition.session.draft.title.is_empty());
    assert_eq!(transition.session.draft.organizer, Some(organizer));
    assert_eq!(transition.prompt, Prompt::Ask(Ask::From));
}

#[tokio::test]
async fn test_from_step_with_resolvable_text_moves_to_end() {
    let resolver = resolver();

    let transition = advance(create_session(), "tomorrow 10:00", &resolver, TZ)
        .await
        .unwrap();

    assert_eq!(transition.session.step, Step::To);
    assert_eq!(transition.session.draft.from, Some(at("2024-05-18T10:00:00+03:00")));
    assert_eq!(transition.session.draft.to, None);
    assert_eq!(transition.prompt, Prompt::Draft { ask: Some(Ask::Duration) });
}

#[tokio::test]
async fn test_from_step_with_unparsed_text_keeps_session() {
    let resolver = resolver();
    let session = create_session();

    let transition = advance(session.clone(), "когда-нибудь", &resolver, TZ)
        .await
        .unwrap();

    assert_eq!(transition.prompt, Prompt::DateNotParsed);
    assert_eq!(transition.session, session);
    assert!(transition.retired.is_none());
}

#[tokio::test]
async fn test_resolver_failure_is_an_error_not_a_reask() {
    let resolver = resolver();
    resolver.fail();

    let result = advance(create_session(), "завтра в 10:00", &resolver, TZ).await;

    assert!(matches!(result, Err(ResolutionError::Status(503))));
}

#[tokio::test]
async fn test_one_hour_shortcut_sets_end_and_moves_to_title() {
    let resolver = resolver();
    let session = advance(create_session(), "завтра в 10:00", &resolver, TZ)
        .await
        .unwrap()
        .session;

    let transition = advance(session, "1 час", &resolver, TZ).await.unwrap();
    let draft = &transition.session.draft;

    assert_eq!(draft.to, Some(draft.from.unwrap() + Duration::hours(1)));
    assert_eq!(transition.session.step, Step::Title);
    assert_eq!(transition.prompt, Prompt::Draft { ask: Some(Ask::Title) });
    assert_eq!(resolver.calls(), 1, "shortcuts are not sent to the parser");
}

#[tokio::test]
async fn test_shortcut_with_title_already_set_stays_on_end_step() {
    let resolver = resolver();
    let mut session = create_session();
    session.draft.title = "Планёрка".to_string();
    let session = advance(session, "завтра в 10:00", &resolver, TZ)
        .await
        .unwrap()
        .session;

    let transition = advance(session, "30 минут", &resolver, TZ).await.unwrap();

    assert_eq!(transition.session.step, Step::To);
    assert_eq!(transition.prompt, Prompt::Draft { ask: None });
    assert_eq!(
        transition.session.draft.to,
        Some(at("2024-05-18T10:30:00+03:00"))
    );
}

#[tokio::test]
async fn test_full_day_shortcut_at_end_step_spans_exactly_one_day() {
    let resolver = resolver();
    let session = advance(create_session(), "завтра в 10:00", &resolver, TZ)
        .await
        .unwrap()
        .session;

    let transition = advance(session, "Весь день", &resolver, TZ).await.unwrap();
    let draft = &transition.session.draft;

    assert!(draft.full_day);
    assert_eq!(draft.to, Some(draft.from.unwrap() + Duration::hours(24)));
}

#[tokio::test]
async fn test_full_day_menu_button_without_start_asks_for_start() {
    let transition = select_full_day(create_session());

    assert!(!transition.session.draft.full_day);
    assert_eq!(transition.session.step, Step::From);
    assert_eq!(transition.prompt, Prompt::Ask(Ask::From));
}

#[tokio::test]
async fn test_full_day_menu_button_with_start() {
    let resolver = resolver();
    let session = advance(create_session(), "завтра в 10:00", &resolver, TZ)
        .await
        .unwrap()
        .session;

    let transition = select_full_day(session);

    assert!(transition.session.draft.full_day);
    assert_eq!(transition.session.draft.to, Some(at("2024-05-19T10:00:00+03:00")));
    assert_eq!(transition.session.step, Step::Title);
}

#[tokio::test]
async fn test_duration_after_full_day_turns_full_day_off() {
    let resolver = resolver();
    let mut session = create_session();
    for text in ["tomorrow 10:00", "Весь день", "Standup"] {
        session = advance(session, text, &resolver, TZ).await.unwrap().session;
    }
    assert!(session.draft.full_day);

    let session = jump(session, Step::To).session;
    let transition = advance(session, "1 час", &resolver, TZ).await.unwrap();
    let draft = &transition.session.draft;

    assert!(!draft.full_day);
    assert_eq!(draft.from, Some(at("2024-05-18T10:00:00+03:00")));
    assert_eq!(draft.to, Some(at("2024-05-18T11:00:00+03:00")));
    assert_eq!(draft.title, "Standup");
    assert!(!EventInput::from_draft(draft).unwrap().full_day);
}

/// At the end step, text that is not a duration is read as a new start time.
/// The end stays unset and the wizard still moves on to the title.
#[tokio::test]
async fn test_end_step_free_text_redefines_start() {
    let resolver = resolver();
    let session = advance(create_session(), "завтра в 10:00", &resolver, TZ)
        .await
        .unwrap()
        .session;

    let transition = advance(session, "в пятницу в 15:00", &resolver, TZ)
        .await
        .unwrap();

    assert_eq!(transition.session.draft.from, Some(at("2024-05-17T15:00:00+03:00")));
    assert_eq!(transition.session.draft.to, None);
    assert_eq!(transition.session.step, Step::Title);
    assert_eq!(transition.prompt, Prompt::Draft { ask: Some(Ask::Title) });
}

#[tokio::test]
async fn test_duration_without_start_goes_back_to_start() {
    let resolver = resolver();
    let mut session = create_session();
    session.step = Step::To;

    let transition = advance(session, "2 часа", &resolver, TZ).await.unwrap();

    assert_eq!(transition.session.step, Step::From);
    assert_eq!(transition.session.draft.to, None);
    assert_eq!(transition.prompt, Prompt::Ask(Ask::From));
}

#[tokio::test]
async fn test_cancel_at_every_step_clears_everything() {
    let resolver = resolver();
    for step in [
        Step::Init,
        Step::From,
        Step::To,
        Step::Title,
        Step::Desc,
        Step::Location,
        Step::User,
    ] {
        let mut session = create_session();
        session.step = step;
        session.draft.title = "Черновик".to_string();
        session.draft.set_from(at("2024-05-18T10:00:00+03:00"));
        session.prompt_ref = Some(PromptRef { chat_id: 5, message_id: 77 });

        let transition = advance(session, CANCEL_KEYWORD, &resolver, TZ).await.unwrap();

        assert_eq!(transition.prompt, Prompt::Cancelled, "step {step:?}");
        assert!(!transition.session.is_create_active());
        assert_eq!(transition.session, Session::default());
        assert_eq!(transition.retired, Some(PromptRef { chat_id: 5, message_id: 77 }));
    }
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_text_steps_store_verbatim_and_retire_old_prompt() {
    let resolver = resolver();
    let mut session = create_session();
    session.prompt_ref = Some(PromptRef { chat_id: 5, message_id: 10 });

    session.step = Step::Title;
    let transition = advance(session, "Ретро", &resolver, TZ).await.unwrap();
    assert_eq!(transition.session.draft.title, "Ретро");
    assert_eq!(transition.retired, Some(PromptRef { chat_id: 5, message_id: 10 }));
    assert!(transition.session.prompt_ref.is_none());

    let mut session = transition.session;
    session.step = Step::Desc;
    let session = advance(session, "Обсуждаем спринт", &resolver, TZ).await.unwrap().session;
    assert_eq!(session.draft.description, "Обсуждаем спринт");

    let mut session = session;
    session.step = Step::Location;
    let session = advance(session, "Переговорка 3", &resolver, TZ).await.unwrap().session;
    assert_eq!(session.draft.location.as_ref().unwrap().description, "Переговорка 3");

    let mut session = session;
    session.step = Step::User;
    let transition = advance(session, " ivan@example.com ", &resolver, TZ).await.unwrap();
    assert_eq!(transition.session.draft.attendees.len(), 1);
    assert_eq!(transition.session.draft.attendees[0].email, "ivan@example.com");
    assert_eq!(transition.prompt, Prompt::Draft { ask: Some(Ask::Attendee) });
}

#[tokio::test]
async fn test_empty_text_reasks() {
    let resolver = resolver();
    let mut session = create_session();
    session.step = Step::Title;

    let transition = advance(session.clone(), "   ", &resolver, TZ).await.unwrap();

    assert_eq!(transition.prompt, Prompt::Ask(Ask::Title));
    assert_eq!(transition.session, session);
}

#[tokio::test]
async fn test_text_without_dialog_is_idle() {
    let resolver = resolver();

    let transition = advance(Session::default(), "привет", &resolver, TZ).await.unwrap();

    assert_eq!(transition.prompt, Prompt::Idle);
    assert_eq!(resolver.calls(), 0);
}

#[test]
fn test_menu_jump_keeps_draft() {
    let mut session = create_session();
    session.draft.set_from(at("2024-05-18T10:00:00+03:00"));
    session.draft.title = "Ретро".to_string();

    let transition = jump(session.clone(), Step::Location);

    assert_eq!(transition.session.step, Step::Location);
    assert_eq!(transition.session.draft, session.draft);
    assert_eq!(transition.prompt, Prompt::Ask(Ask::Location));
}

#[tokio::test]
async fn test_date_capture_resolves_and_closes() {
    let resolver = resolver();
    let mut session = Session::default();
    session.start_date_capture();

    let (session, outcome) = advance_date_capture(session, "завтра в 10:00", &resolver, TZ)
        .await
        .unwrap();

    assert_eq!(outcome, DateCaptureOutcome::Resolved(at("2024-05-18T10:00:00+03:00")));
    assert!(!session.is_date_capture_active());
}

#[tokio::test]
async fn test_date_capture_not_parsed_stays_open() {
    let resolver = resolver();
    let mut session = Session::default();
    session.start_date_capture();

    let (session, outcome) = advance_date_capture(session, "???", &resolver, TZ).await.unwrap();

    assert_eq!(outcome, DateCaptureOutcome::NotParsed);
    assert!(session.is_date_capture_active());
}

#[tokio::test]
async fn test_date_capture_cancel() {
    let resolver = resolver();
    let mut session = Session::default();
    session.start_date_capture();

    let (session, outcome) = advance_date_capture(session, CANCEL_KEYWORD, &resolver, TZ)
        .await
        .unwrap();

    assert_eq!(outcome, DateCaptureOutcome::Cancelled);
    assert_eq!(session, Session::default());
}

#[tokio::test]
async fn test_dialogs_are_never_both_active() {
    let resolver = resolver();
    let mut session = create_session();
    assert!(!(session.is_create_active() && session.is_date_capture_active()));

    session.start_date_capture();
    assert!(session.is_date_capture_active() && !session.is_create_active());

    let session = start_create(session, None).session;
    assert!(session.is_create_active() && !session.is_date_capture_active());

    let session = advance(session, "завтра в 10:00", &resolver, TZ).await.unwrap().session;
    assert!(!(session.is_create_active() && session.is_date_capture_active()));
}
