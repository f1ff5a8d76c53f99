mod common;

use common::{LogCapture, app_at};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use xorb::modules::ObjectModule;
use xorb::testing::{FailingHandler, RecordingHandler};
use xorb::{
    AppOptionsPatch, DispatchError, Failure, Handler, NamespaceError, SharedHandler, XorbError,
    handler_fn,
};

fn shared<H: Handler>(handler: H) -> SharedHandler {
    Arc::new(handler)
}

// ============================================================================
// Namespace registration and resolution
// ============================================================================

#[tokio::test]
async fn mixed_registrations_keep_every_handler_in_order() {
    let (mut app, _) = app_at("/");
    let log = RecordingHandler::new("a");

    assert_eq!(app.namespace("/", log.clone()).unwrap(), 1);
    assert_eq!(
        app.namespace_all("/", vec![shared(log.labelled("b")), shared(log.labelled("c"))])
            .unwrap(),
        3
    );
    assert_eq!(app.namespace("/", log.labelled("d")).unwrap(), 4);
    assert_eq!(app.namespace_all("/", vec![shared(log.labelled("e"))]).unwrap(), 5);

    app.init(AppOptionsPatch::new()).await.unwrap();

    assert_eq!(log.labels(), ["a", "b", "c", "d", "e"]);
    assert_eq!(app.current().len(), 5);
}

#[tokio::test]
async fn every_matching_prefix_contributes_in_declaration_order() {
    let (mut app, _) = app_at("/a/x");
    let log = RecordingHandler::new("root");
    app.namespace("/", log.clone()).unwrap();
    app.namespace("/a", log.labelled("a")).unwrap();
    app.namespace("/b", log.labelled("b")).unwrap();

    app.init(AppOptionsPatch::new()).await.unwrap();

    assert_eq!(log.labels(), ["root", "a"]);
    assert_eq!(app.current_path(), Some("/a/x"));
    assert_eq!(app.namespaces(), ["/", "/a", "/b"]);
}

#[tokio::test]
async fn the_current_key_is_reserved() {
    let (logs, _guard) = LogCapture::install();
    let (mut app, _) = app_at("/");

    let result = app.namespace("current", RecordingHandler::new("nope"));

    assert!(matches!(
        result,
        Err(XorbError::Namespace(NamespaceError::Reserved(key))) if key == "current"
    ));
    assert!(app.namespaces().is_empty());
    assert!(logs.contains("the namespace key `current` is reserved"));
}

// ============================================================================
// Running the chain
// ============================================================================

#[tokio::test]
async fn the_last_payload_reaches_the_end_of_the_run() {
    let (mut app, _) = app_at("/");
    app.namespace("/", handler_fn(|_ctx, _err, next, _data| next.proceed()))
        .unwrap();
    app.namespace("/", handler_fn(|_ctx, _err, next, _data| next.send(json!(42))))
        .unwrap();

    let handle = app.init(AppOptionsPatch::new()).await.unwrap();

    assert!(handle.is_completed());
    assert!(app.is_ready());
    assert_eq!(handle.wait().await.unwrap(), json!(42));
}

#[tokio::test]
async fn an_empty_table_still_completes() {
    let (mut app, _) = app_at("/anything");

    let handle = app.init(AppOptionsPatch::new()).await.unwrap();

    assert_eq!(handle.handler_count(), 0);
    assert_eq!(handle.wait().await.unwrap(), json!(null));
    assert!(app.is_ready());
}

#[tokio::test]
async fn the_first_reported_error_is_raised() {
    let (mut app, _) = app_at("/");
    let first = Failure::handler("first");
    let raised = first.clone();
    let log = RecordingHandler::new("after-first");

    app.namespace(
        "/",
        handler_fn(move |_ctx, _err, next, _data| next.fail(raised.clone())),
    )
    .unwrap();
    app.namespace("/", log.clone()).unwrap();
    app.namespace("/", FailingHandler::new("second")).unwrap();
    app.namespace("/", log.labelled("after-second")).unwrap();

    let err = app.init(AppOptionsPatch::new()).await.unwrap_err();

    let handler_error = err.handler_error().expect("a handler error");
    assert!(Arc::ptr_eq(handler_error, &first));
    assert_eq!(handler_error.to_string(), "first");
    assert!(!app.is_ready());

    // Errors never stop the run; each handler sees the error passed to it.
    let visits = log.visits();
    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].error.as_deref(), Some("first"));
    assert_eq!(visits[1].error.as_deref(), Some("second"));
}

#[tokio::test]
async fn handlers_see_the_application_state() {
    let (mut app, _) = app_at("/blog/42");
    let seen = Arc::new(Mutex::new(None));
    let slot = seen.clone();

    app.register_module("store", Arc::new(ObjectModule::new()));
    app.namespace("/blog", handler_fn(move |ctx, _err, next, _data| {
        *slot.lock().unwrap() = Some((
            ctx.current_path().to_string(),
            ctx.namespaces().to_vec(),
            ctx.module_names().map(str::to_string).collect::<Vec<_>>(),
            ctx.module("store").is_some(),
        ));
        next.proceed();
    }))
    .unwrap();
    app.namespace("/admin", RecordingHandler::new("admin")).unwrap();

    app.init(AppOptionsPatch::new()).await.unwrap();

    let (path, namespaces, modules, has_store) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(path, "/blog/42");
    assert_eq!(namespaces, ["/blog", "/admin"]);
    assert_eq!(modules, ["store"]);
    assert!(has_store);
}

#[tokio::test]
async fn a_deferred_continuation_resumes_the_run() {
    let (mut app, _) = app_at("/");
    let log = RecordingHandler::new("after");
    app.namespace("/", handler_fn(|_ctx, _err, next, _data| {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            next.send(json!("late"));
        });
    }))
    .unwrap();
    app.namespace("/", log.clone()).unwrap();

    let handle = app.init(AppOptionsPatch::new()).await.unwrap();

    assert!(!handle.is_completed());
    assert!(!app.is_ready());
    assert_eq!(log.count(), 0);

    assert_eq!(handle.wait().await.unwrap(), json!("late"));
    assert_eq!(log.visits()[0].data, json!("late"));
    assert!(app.is_ready());
}

#[tokio::test]
async fn a_deferred_failure_leaves_the_application_not_ready() {
    let (logs, _guard) = LogCapture::install();
    let (mut app, _) = app_at("/");
    app.namespace("/", handler_fn(|_ctx, _err, next, _data| {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            next.fail(Failure::handler("late failure"));
        });
    }))
    .unwrap();
    app.namespace("/", RecordingHandler::new("after")).unwrap();

    let handle = app.init(AppOptionsPatch::new()).await.unwrap();
    assert!(!app.is_ready());

    let err = handle.wait().await.unwrap_err();
    assert_eq!(err.handler_error().unwrap().to_string(), "late failure");
    assert!(!app.is_ready());
    assert!(logs.contains("handler reported an error: late failure"));
}

#[tokio::test]
async fn a_handler_that_drops_its_continuation_stalls_the_run() {
    let (mut app, _) = app_at("/");
    let log = RecordingHandler::new("never");
    app.namespace("/", handler_fn(|_ctx, _err, _next, _data| {}))
        .unwrap();
    app.namespace("/", log.clone()).unwrap();

    let handle = app.init(AppOptionsPatch::new()).await.unwrap();

    assert!(matches!(handle.wait().await, Err(DispatchError::Stalled)));
    assert_eq!(log.count(), 0);
    assert!(!app.is_ready());
}
