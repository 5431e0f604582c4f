use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use courier_core::{
    ApiResult, BotIdentity, BoxError, BoxedResponder, CallbackQuery, Category, ChatMember,
    ChatMemberKind, ChatMemberUpdated, DispatchError, Message, Poll, Responder, Transition, Update,
    User,
};
use courier_framework::{
    Api, CommandArgs, DispatchRequest, Dispatcher, DispatcherBuilder, FanOutMode, Outcome,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Records every API call instead of sending it.
#[derive(Default)]
struct RecordingResponder {
    calls: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn call_api(&self, method: &str, params: Value) -> ApiResult<Value> {
        self.calls.lock().push((method.to_string(), params));
        Ok(Value::Bool(true))
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

type Log = Arc<Mutex<Vec<&'static str>>>;

fn responder() -> (Arc<RecordingResponder>, BoxedResponder) {
    let recording = Arc::new(RecordingResponder::default());
    let boxed: BoxedResponder = recording.clone();
    (recording, boxed)
}

fn text_update(id: i64, text: &str) -> Update {
    Update::from_message(id, Message::text(100, text))
}

fn member_update(old: ChatMemberKind, new: ChatMemberKind) -> Update {
    let user = User {
        id: 7,
        first_name: "Sam".into(),
        ..Default::default()
    };
    Update {
        update_id: 1,
        chat_member: Some(ChatMemberUpdated {
            old_chat_member: ChatMember::new(user.clone(), old),
            new_chat_member: ChatMember::new(user, new),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn builder() -> DispatcherBuilder {
    Dispatcher::builder(BotIdentity::new("ThisBot"))
}

/// Returns a handler that appends `label` to `log`.
macro_rules! logging {
    ($log:expr, $label:expr) => {{
        let log: Log = Arc::clone(&$log);
        move || {
            let log = Arc::clone(&log);
            async move { log.lock().push($label) }
        }
    }};
}

#[tokio::test]
async fn test_ban_and_blocked_scenario() {
    let log: Log = Arc::default();
    let mut builder = builder();

    builder.command("ban", logging!(log, "fn1")).register();
    builder.on().message().text(logging!(log, "fn2"));

    let mw_log = Arc::clone(&log);
    builder.use_middleware(move |msg: Option<Message>| {
        let log = Arc::clone(&mw_log);
        async move {
            log.lock().push("mw");
            match msg.as_ref().and_then(|m| m.text.as_deref()) {
                Some("blocked") => Err::<(), BoxError>("blocked by middleware".into()),
                _ => Ok(()),
            }
        }
    });
    let dispatcher = builder.build();

    let (_, api) = responder();
    let outcome = dispatcher
        .process(text_update(1, "/ban"), Arc::clone(&api))
        .await
        .unwrap();
    assert!(outcome.is_handled());
    assert_eq!(*log.lock(), vec!["mw", "fn1"]);

    log.lock().clear();
    let err = dispatcher
        .process(text_update(2, "blocked"), api)
        .await
        .unwrap_err();
    match err {
        DispatchError::MiddlewareAborted { index, source } => {
            assert_eq!(index, 0);
            assert_eq!(source.to_string(), "blocked by middleware");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(*log.lock(), vec!["mw"]);
}

#[tokio::test]
async fn test_plain_text_reaches_message_registry() {
    let log: Log = Arc::default();
    let mut builder = builder();
    builder.command("ban", logging!(log, "command"));
    builder.on().message().text(logging!(log, "text"));
    let dispatcher = builder.build();

    let (_, api) = responder();
    dispatcher.process(text_update(1, "hello"), Arc::clone(&api)).await.unwrap();
    dispatcher.process(text_update(2, "/ban@OtherBot"), api).await.unwrap();
    assert_eq!(*log.lock(), vec!["text", "text"]);
}

#[tokio::test]
async fn test_callback_equal_then_any_is_first_match() {
    let log: Log = Arc::default();
    let mut builder = builder();
    builder
        .on()
        .callback()
        .equal("x", logging!(log, "equal"))
        .any(logging!(log, "any"));
    let dispatcher = builder.build();

    let (_, api) = responder();
    let outcome = dispatcher
        .process(
            Update::from_callback(1, CallbackQuery::with_data("q1", "x")),
            Arc::clone(&api),
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Handled {
            category: Category::CallbackQuery,
            handlers: 1
        }
    );
    assert_eq!(*log.lock(), vec!["equal"]);

    dispatcher
        .process(Update::from_callback(2, CallbackQuery::with_data("q2", "y")), api)
        .await
        .unwrap();
    assert_eq!(*log.lock(), vec!["equal", "any"]);
}

#[tokio::test]
async fn test_member_transitions_fan_out() {
    let log: Log = Arc::default();
    let mut builder = builder();
    builder
        .on()
        .chat_member()
        .joined(logging!(log, "joined"))
        .banned(logging!(log, "banned"))
        .any(logging!(log, "any"));
    let dispatcher = builder.build();
    let (_, api) = responder();

    let outcome = dispatcher
        .process(
            member_update(ChatMemberKind::Left, ChatMemberKind::Member),
            Arc::clone(&api),
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Handled {
            category: Category::ChatMember,
            handlers: 2
        }
    );
    assert_eq!(*log.lock(), vec!["joined", "any"]);

    log.lock().clear();
    dispatcher
        .process(
            member_update(ChatMemberKind::Member, ChatMemberKind::Banned { until_date: 0 }),
            Arc::clone(&api),
        )
        .await
        .unwrap();
    assert_eq!(*log.lock(), vec!["banned", "any"]);

    log.lock().clear();
    let outcome = dispatcher
        .process(
            member_update(ChatMemberKind::Member, ChatMemberKind::Member),
            api,
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Unhandled {
            category: Category::ChatMember
        }
    );
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn test_restricted_member_leaving_and_rejoining() {
    let log: Log = Arc::default();
    let mut builder = builder();
    builder
        .on()
        .chat_member()
        .joined(logging!(log, "joined"))
        .left(logging!(log, "left"));
    let dispatcher = builder.build();
    let (_, api) = responder();

    let restricted = |is_member| ChatMemberKind::Restricted {
        is_member,
        can_send_messages: true,
        until_date: 0,
    };

    dispatcher
        .process(
            member_update(restricted(true), restricted(false)),
            Arc::clone(&api),
        )
        .await
        .unwrap();
    assert_eq!(*log.lock(), vec!["left"]);

    log.lock().clear();
    dispatcher
        .process(member_update(restricted(false), restricted(true)), api)
        .await
        .unwrap();
    assert_eq!(*log.lock(), vec!["joined"]);
}

#[tokio::test]
async fn test_transition_extractor() {
    let seen = Arc::new(Mutex::new(None));
    let mut builder = builder();
    let sink = Arc::clone(&seen);
    builder.on().chat_member().any(move |t: Transition| {
        let sink = Arc::clone(&sink);
        async move { *sink.lock() = Some(t) }
    });
    let dispatcher = builder.build();

    let (_, api) = responder();
    dispatcher
        .process(
            member_update(
                ChatMemberKind::Member,
                ChatMemberKind::Administrator { custom_title: None },
            ),
            api,
        )
        .await
        .unwrap();
    assert_eq!(*seen.lock(), Some(Transition::Promoted));
}

#[tokio::test]
async fn test_malformed_update_runs_middleware_then_fails() {
    let log: Log = Arc::default();
    let mut builder = builder();
    builder.use_middleware(logging!(log, "mw"));
    builder.on().message().any(logging!(log, "any"));
    let dispatcher = builder.build();

    let (_, api) = responder();
    let err = dispatcher
        .process(
            Update {
                update_id: 9,
                ..Default::default()
            },
            api,
        )
        .await
        .unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(*log.lock(), vec!["mw"]);
}

#[tokio::test]
async fn test_unmatched_is_not_an_error() {
    let dispatcher = builder().build();
    let (_, api) = responder();
    let outcome = dispatcher.process(text_update(1, "hi"), api).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Unhandled {
            category: Category::Message
        }
    );
}

#[tokio::test]
async fn test_concurrent_fan_out_joins_errors() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut builder = builder();
    builder.fanout(FanOutMode::Concurrent);

    let c = Arc::clone(&counter);
    builder
        .on()
        .poll()
        .any(|| async { Err::<(), _>("first") })
        .any(move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        })
        .any(|| async { Err::<(), _>("second") });
    let dispatcher = builder.build();

    let (_, api) = responder();
    let err = dispatcher
        .process(
            Update {
                poll: Some(Poll::default()),
                ..Default::default()
            },
            api,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Handlers(ref all) if all.len() == 2));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_handlers_reply_through_responder() {
    let mut builder = builder();
    builder
        .command("echo", |cmd: CommandArgs, msg: Message, api: BoxedResponder| async move {
            api.call_api(
                "sendMessage",
                json!({ "chat_id": msg.chat.id, "text": cmd.args }),
            )
            .await?;
            Ok::<(), BoxError>(())
        })
        .register();
    let dispatcher = builder.build();

    let (recording, api) = responder();
    dispatcher
        .process(text_update(1, "/echo hello there"), api)
        .await
        .unwrap();

    let calls = recording.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "sendMessage");
    assert_eq!(calls[0].1, json!({ "chat_id": 100, "text": "hello there" }));
}

#[tokio::test]
async fn test_concrete_responder_extractor() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut builder = builder();
    let h = Arc::clone(&hits);
    builder.on().message().any(move |api: Api<RecordingResponder>| {
        let h = Arc::clone(&h);
        async move {
            api.call_api("getMe", Value::Null).await?;
            h.fetch_add(1, Ordering::SeqCst);
            Ok::<(), BoxError>(())
        }
    });
    let dispatcher = builder.build();

    let (recording, api) = responder();
    dispatcher.process(text_update(1, "x"), api).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(recording.calls.lock().len(), 1);
}

#[tokio::test]
async fn test_tower_service_face() {
    let log: Log = Arc::default();
    let mut builder = builder();
    builder.on().message().text(logging!(log, "text"));
    let dispatcher = builder.build();

    let (_, api) = responder();
    let outcome = dispatcher
        .clone()
        .oneshot(DispatchRequest::new(text_update(1, "via tower"), api))
        .await
        .unwrap();
    assert!(outcome.is_handled());
    assert_eq!(*log.lock(), vec!["text"]);
}

#[tokio::test]
async fn test_concurrent_process_calls() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut builder = builder();
    let c = Arc::clone(&counter);
    builder.on().message().any(move || {
        let c = Arc::clone(&c);
        async move {
            c.fetch_add(1, Ordering::SeqCst);
        }
    });
    let dispatcher = builder.build();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            let (_, api) = responder();
            tokio::spawn(async move { dispatcher.process(text_update(i, "x"), api).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(counter.load(Ordering::SeqCst), 16);
}
