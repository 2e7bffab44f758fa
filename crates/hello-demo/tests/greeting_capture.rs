#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Integration tests driving the greeting service end to end and
//! asserting on its log output through a capture window.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use hello_demo::{
    router, DangerousContentError, Greeter, GreetingError, HelloGreeter, MissingParameterError,
};
use logspy::{Severity, SpyLogger};

// One capture window per process: every test takes this lock first.
static WINDOW: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

struct FailingGreeter;

impl Greeter for FailingGreeter {
    fn elaborate_greeting(&self, _name: &str) -> Result<String, GreetingError> {
        Err(GreetingError::Backend("connection refused".to_owned()))
    }
}

async fn spawn_app(greeter: Arc<dyn Greeter>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(greeter)).await.expect("serve");
    });
    addr
}

#[tokio::test]
async fn test_greets_alphanumeric_name() {
    let _window = WINDOW.lock().await;
    let spy = SpyLogger::attach().expect("attach capture window");
    let addr = spawn_app(Arc::new(HelloGreeter)).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/hello"))
        .query(&[("name", "Ferris")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.expect("body"), "Hello, Ferris");

    assert_eq!(spy.count_warning_events(), 0);
    assert_eq!(spy.count_error_events(), 0);
    spy.detach();
}

#[tokio::test]
async fn test_missing_parameter_logs_warning_event() {
    let _window = WINDOW.lock().await;
    let spy = SpyLogger::attach().expect("attach capture window");
    let addr = spawn_app(Arc::new(HelloGreeter)).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/hello"))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 400);

    // The spy can count events of different severities.
    assert!(spy.count_warning_events() > 0);
    spy.expect_event()
        .with_severity(Severity::Warn)
        .with_error_kind::<MissingParameterError>()
        .assert_exists();
    spy.detach();
}

#[tokio::test]
async fn test_dangerous_content_logs_error_event_with_attached_error() {
    let _window = WINDOW.lock().await;
    let spy = SpyLogger::attach().expect("attach capture window");
    let addr = spawn_app(Arc::new(HelloGreeter)).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/hello"))
        .query(&[("name", "<div>Malicious content</div>")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 400);

    // The spy can retrieve all events with a specific kind of error
    // attached; each event carries severity, message and the error.
    let events = spy.find_by_error_kind::<DangerousContentError>();
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| e.severity() == Severity::Error));
    spy.detach();
}

#[tokio::test]
async fn test_backend_failure_logs_error_event_and_returns_500() {
    let _window = WINDOW.lock().await;
    let spy = SpyLogger::attach().expect("attach capture window");
    let addr = spawn_app(Arc::new(FailingGreeter)).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/hello"))
        .query(&[("name", "Ferris")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 500);

    let events = spy.find_by_error_kind::<GreetingError>();
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| e.severity() == Severity::Error));
    spy.detach();
}
