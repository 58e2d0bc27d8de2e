mod common;

use common::{at, event, Harness, Rendered};

use calendar_chat_bot::bot::commands::{CommandInput, TopLevelCommand};
use calendar_chat_bot::bot::handlers::dispatcher::{
    dispatch, CallbackAction, CallbackAnswer, CallbackInput, FollowUp,
};
use calendar_chat_bot::bot::render::{EventView, Notice};
use calendar_chat_bot::dialog::{Ask, PromptRef, Session, Step};

const USER: u64 = 42;
const OTHER: u64 = 7;
const GROUP: i64 = -100_500;

fn private_press(action: CallbackAction) -> CallbackInput {
    CallbackInput {
        presser_id: USER,
        chat_id: USER as i64,
        chat_is_private: true,
        message: Some(PromptRef {
            chat_id: USER as i64,
            message_id: 900,
        }),
        reply_to_message_id: Some(899),
        replied_to_sender: Some(USER),
        data: action.encode(),
    }
}

fn group_press(presser: u64, owner: u64, action: CallbackAction) -> CallbackInput {
    CallbackInput {
        presser_id: presser,
        chat_id: GROUP,
        chat_is_private: false,
        message: Some(PromptRef {
            chat_id: GROUP,
            message_id: 31,
        }),
        reply_to_message_id: Some(30),
        replied_to_sender: Some(owner),
        data: action.encode(),
    }
}

fn complete_session() -> Session {
    let mut session = Session::default();
    session.start_create(None);
    session.step = Step::Title;
    session.draft.set_from(at("2024-05-18T10:00:00+03:00"));
    session.draft.apply_duration(chrono::Duration::hours(1));
    session.draft.title = "Ретро".to_string();
    session.prompt_ref = Some(PromptRef {
        chat_id: USER as i64,
        message_id: 900,
    });
    session
}

#[tokio::test]
async fn test_expand_with_missing_correlation_is_not_found_without_calendar_call() {
    let h = Harness::new();

    let dispatched = dispatch(
        &h.ctx,
        &h.renderer,
        &private_press(CallbackAction::Expand("gone".to_string())),
    )
    .await
    .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::NotFound);
    assert!(dispatched.answer.is_alert());
    assert!(h.calendar.calls().is_empty());
    assert!(h.renderer.take().is_empty());
}

#[tokio::test]
async fn test_expand_shows_full_card() {
    let h = Harness::new();
    h.calendar.store(event("evt-1", "cal-1", "Планёрка"));
    h.ctx.correlations.remember("evt-1", "cal-1").await.unwrap();

    let dispatched = dispatch(
        &h.ctx,
        &h.renderer,
        &private_press(CallbackAction::Expand("evt-1".to_string())),
    )
    .await
    .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::EventTitle("Планёрка".to_string()));
    assert_eq!(h.calendar.calls(), vec!["event:cal-1/evt-1".to_string()]);
    assert_eq!(
        h.renderer.take(),
        vec![Rendered::Shown {
            target: PromptRef {
                chat_id: USER as i64,
                message_id: 900
            },
            uid: "evt-1".to_string(),
            view: EventView::Full,
        }]
    );
}

#[tokio::test]
async fn test_expand_of_deleted_event_is_unavailable() {
    let h = Harness::new();
    h.ctx.correlations.remember("evt-1", "cal-1").await.unwrap();

    let dispatched = dispatch(
        &h.ctx,
        &h.renderer,
        &private_press(CallbackAction::Expand("evt-1".to_string())),
    )
    .await
    .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::Unavailable);
}

#[tokio::test]
async fn test_collapse_refetches_and_shows_short_card() {
    let h = Harness::new();
    h.calendar.store(event("evt-1", "cal-1", "Планёрка"));
    h.ctx.correlations.remember("evt-1", "cal-1").await.unwrap();

    let dispatched = dispatch(
        &h.ctx,
        &h.renderer,
        &private_press(CallbackAction::Collapse("evt-1".to_string())),
    )
    .await
    .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::Silent);
    assert!(matches!(
        h.renderer.take().as_slice(),
        [Rendered::Shown { view: EventView::Short, .. }]
    ));
    assert_eq!(
        h.ctx.correlations.lookup("evt-1").await.unwrap().as_deref(),
        Some("cal-1")
    );
}

#[tokio::test]
async fn test_foreign_presser_is_rejected_without_mutation() {
    let h = Harness::new();
    let session = complete_session();
    h.put_session(OTHER, &session).await;
    h.put_session(USER, &session).await;
    let keys_before = h.kv.keys();

    for action in [
        CallbackAction::AlertYes(TopLevelCommand::Today),
        CallbackAction::AlertNo,
        CallbackAction::Create,
        CallbackAction::Cancel,
        CallbackAction::Menu(Step::Desc),
        CallbackAction::FullDay,
    ] {
        let dispatched = dispatch(&h.ctx, &h.renderer, &group_press(OTHER, USER, action))
            .await
            .unwrap();

        assert_eq!(dispatched.answer, CallbackAnswer::NotAllowed);
        assert!(dispatched.follow_up.is_none());
    }

    assert_eq!(h.session(USER).await, session);
    assert_eq!(h.session(OTHER).await, session);
    assert_eq!(h.kv.keys(), keys_before);
    assert!(h.calendar.calls().is_empty());
    assert!(h.renderer.take().is_empty());
}

#[tokio::test]
async fn test_event_cards_open_for_any_viewer() {
    let h = Harness::new();
    h.calendar.store(event("evt-1", "cal-1", "Планёрка"));
    h.ctx.correlations.remember("evt-1", "cal-1").await.unwrap();

    let expanded = dispatch(
        &h.ctx,
        &h.renderer,
        &group_press(OTHER, USER, CallbackAction::Expand("evt-1".to_string())),
    )
    .await
    .unwrap();
    let collapsed = dispatch(
        &h.ctx,
        &h.renderer,
        &group_press(OTHER, USER, CallbackAction::Collapse("evt-1".to_string())),
    )
    .await
    .unwrap();

    assert_eq!(expanded.answer, CallbackAnswer::EventTitle("Планёрка".to_string()));
    assert_eq!(collapsed.answer, CallbackAnswer::Silent);
    assert_eq!(
        h.calendar.calls(),
        vec!["event:cal-1/evt-1".to_string(), "event:cal-1/evt-1".to_string()]
    );
    let target = PromptRef {
        chat_id: GROUP,
        message_id: 31,
    };
    assert_eq!(
        h.renderer.take(),
        vec![
            Rendered::Shown {
                target,
                uid: "evt-1".to_string(),
                view: EventView::Full,
            },
            Rendered::Shown {
                target,
                uid: "evt-1".to_string(),
                view: EventView::Short,
            },
        ]
    );
}

#[tokio::test]
async fn test_alert_yes_reinvokes_command_for_owner() {
    let h = Harness::new();

    let dispatched = dispatch(
        &h.ctx,
        &h.renderer,
        &group_press(USER, USER, CallbackAction::AlertYes(TopLevelCommand::Next)),
    )
    .await
    .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::Silent);
    assert_eq!(
        dispatched.follow_up,
        Some(FollowUp::Reinvoke {
            command: TopLevelCommand::Next,
            input: CommandInput {
                user_id: USER,
                chat_id: GROUP,
                chat_is_private: false,
                message_id: 30,
            },
        })
    );
    assert_eq!(
        h.renderer.take(),
        vec![Rendered::Deleted(PromptRef {
            chat_id: GROUP,
            message_id: 31
        })]
    );
}

#[tokio::test]
async fn test_alert_no_only_deletes_the_alert() {
    let h = Harness::new();

    let dispatched = dispatch(
        &h.ctx,
        &h.renderer,
        &group_press(USER, USER, CallbackAction::AlertNo),
    )
    .await
    .unwrap();

    assert!(dispatched.follow_up.is_none());
    assert_eq!(h.renderer.take().len(), 1);
    assert!(h.calendar.calls().is_empty());
}

#[tokio::test]
async fn test_create_with_incomplete_draft_is_validation_error() {
    let h = Harness::new();
    let mut session = complete_session();
    session.draft.title.clear();
    h.put_session(USER, &session).await;

    let dispatched = dispatch(&h.ctx, &h.renderer, &private_press(CallbackAction::Create))
        .await
        .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::Incomplete(vec!["title"]));
    assert_eq!(h.session(USER).await, session);
    assert!(h.calendar.calls().is_empty());
}

#[tokio::test]
async fn test_create_sends_event_and_closes_dialog() {
    let h = Harness::new();
    h.put_session(USER, &complete_session()).await;

    let dispatched = dispatch(&h.ctx, &h.renderer, &private_press(CallbackAction::Create))
        .await
        .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::Created);
    let created = h.calendar.created.lock().unwrap().clone();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].title, "Ретро");
    assert_eq!(created[0].from, "2024-05-18T10:00:00+03:00");
    assert_eq!(created[0].to, "2024-05-18T11:00:00+03:00");

    assert_eq!(h.session(USER).await, Session::default());
    assert_eq!(
        h.renderer.take(),
        vec![
            Rendered::Deleted(PromptRef {
                chat_id: USER as i64,
                message_id: 900
            }),
            Rendered::Notice(
                USER as i64,
                Notice::Created {
                    title: "Ретро".to_string()
                }
            ),
        ]
    );
}

#[tokio::test]
async fn test_create_failure_keeps_session() {
    let h = Harness::new();
    let session = complete_session();
    h.put_session(USER, &session).await;
    *h.calendar.create_fails.lock().unwrap() = true;

    let dispatched = dispatch(&h.ctx, &h.renderer, &private_press(CallbackAction::Create))
        .await
        .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::Failure);
    assert_eq!(h.session(USER).await, session);
    assert!(h.renderer.take().is_empty());
}

#[tokio::test]
async fn test_create_without_dialog() {
    let h = Harness::new();

    let dispatched = dispatch(&h.ctx, &h.renderer, &private_press(CallbackAction::Create))
        .await
        .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::NoDialog);
}

#[tokio::test]
async fn test_cancel_deletes_outstanding_prompt() {
    let h = Harness::new();
    let mut session = complete_session();
    session.prompt_ref = Some(PromptRef {
        chat_id: USER as i64,
        message_id: 850,
    });
    h.put_session(USER, &session).await;

    let dispatched = dispatch(&h.ctx, &h.renderer, &private_press(CallbackAction::Cancel))
        .await
        .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::Cancelled);
    assert_eq!(h.session(USER).await, Session::default());
    assert_eq!(
        h.renderer.take(),
        vec![
            Rendered::Deleted(PromptRef {
                chat_id: USER as i64,
                message_id: 850
            }),
            Rendered::Deleted(PromptRef {
                chat_id: USER as i64,
                message_id: 900
            }),
            Rendered::Notice(USER as i64, Notice::Cancelled),
        ]
    );
}

#[tokio::test]
async fn test_menu_jump_moves_step_and_asks() {
    let h = Harness::new();
    h.put_session(USER, &complete_session()).await;

    let dispatched = dispatch(
        &h.ctx,
        &h.renderer,
        &private_press(CallbackAction::Menu(Step::Location)),
    )
    .await
    .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::Silent);
    assert_eq!(h.session(USER).await.step, Step::Location);
    assert_eq!(
        h.renderer.take(),
        vec![Rendered::Ask(USER as i64, Ask::Location)]
    );
}

#[tokio::test]
async fn test_full_day_button_replaces_draft_prompt() {
    let h = Harness::new();
    let mut session = complete_session();
    session.draft.to = None;
    h.put_session(USER, &session).await;

    dispatch(&h.ctx, &h.renderer, &private_press(CallbackAction::FullDay))
        .await
        .unwrap();

    let stored = h.session(USER).await;
    assert!(stored.draft.full_day);
    assert_eq!(stored.draft.to, Some(at("2024-05-19T10:00:00+03:00")));

    let rendered = h.renderer.take();
    assert_eq!(
        rendered[0],
        Rendered::Deleted(PromptRef {
            chat_id: USER as i64,
            message_id: 900
        })
    );
    match &rendered[1] {
        Rendered::Draft {
            prompt,
            reply_to,
            complete,
        } => {
            assert_eq!(*reply_to, Some(899));
            assert!(*complete);
            assert_eq!(stored.prompt_ref, Some(*prompt));
        }
        other => panic!("expected a draft, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_payload_is_ignored() {
    let h = Harness::new();
    let mut input = private_press(CallbackAction::Cancel);
    input.data = "poll:1:yes".to_string();

    let dispatched = dispatch(&h.ctx, &h.renderer, &input).await.unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::Silent);
    assert!(h.kv.keys().is_empty());
}

#[tokio::test]
async fn test_unauthorized_calendar_is_reported() {
    let h = Harness::new();
    h.ctx.correlations.remember("evt-1", "cal-1").await.unwrap();
    *h.calendar.unauthorized.lock().unwrap() = true;

    let dispatched = dispatch(
        &h.ctx,
        &h.renderer,
        &private_press(CallbackAction::Expand("evt-1".to_string())),
    )
    .await
    .unwrap();

    assert_eq!(dispatched.answer, CallbackAnswer::NotAuthorized);
}
