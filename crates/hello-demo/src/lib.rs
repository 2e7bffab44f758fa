//! A small greeting service whose only purpose is to produce log events
//! worth observing in tests.
//!
//! `GET /hello?name=` greets alphanumeric names, logs a WARN event with an
//! attached error when the parameter is missing, and logs ERROR events
//! (with the offending error attached) for dangerous content or a failing
//! greeter backend.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use thiserror::Error;

use logspy::{AttachedError, Severity};

/// The request carried content the service refuses to repeat back.
#[derive(Debug, Error)]
#[error("received non-alphanumeric characters while handling a request: {content:?}")]
pub struct DangerousContentError {
    pub content: String,
}

/// A mandatory query parameter was absent.
#[derive(Debug, Error)]
#[error("missing required query parameter `{name}`")]
pub struct MissingParameterError {
    pub name: &'static str,
}

/// Failures raised by a [`Greeter`] implementation.
#[derive(Debug, Error)]
pub enum GreetingError {
    #[error("greeting backend unavailable: {0}")]
    Backend(String),
}

/// Produces the greeting text. Tests inject failing implementations to
/// exercise the unmapped-failure path.
pub trait Greeter: Send + Sync {
    fn elaborate_greeting(&self, name: &str) -> Result<String, GreetingError>;
}

/// The default greeter.
#[derive(Debug, Default, Clone, Copy)]
pub struct HelloGreeter;

impl Greeter for HelloGreeter {
    fn elaborate_greeting(&self, name: &str) -> Result<String, GreetingError> {
        Ok(format!("Hello, {name}"))
    }
}

#[derive(Clone)]
struct AppState {
    greeter: Arc<dyn Greeter>,
}

#[derive(Debug, Deserialize)]
struct HelloParams {
    name: Option<String>,
}

/// Builds the demo router around the given greeter.
pub fn router(greeter: Arc<dyn Greeter>) -> Router {
    Router::new()
        .route("/hello", get(hello))
        .with_state(AppState { greeter })
}

async fn hello(State(state): State<AppState>, Query(params): Query<HelloParams>) -> Response {
    let Some(name) = params.name else {
        logspy::emit(
            Severity::Warn,
            "received a request with missing value",
            Some(Arc::new(MissingParameterError { name: "name" })),
        );
        return (
            StatusCode::BAD_REQUEST,
            "missing required query parameter `name`",
        )
            .into_response();
    };

    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        let error: AttachedError = Arc::new(DangerousContentError { content: name });
        logspy::emit(
            Severity::Error,
            "received a request with dangerous content",
            Some(error),
        );
        return (
            StatusCode::BAD_REQUEST,
            "the content received is considered dangerous and will not be accepted",
        )
            .into_response();
    }

    match state.greeter.elaborate_greeting(&name) {
        Ok(greeting) => (StatusCode::OK, greeting).into_response(),
        Err(error) => {
            logspy::emit(
                Severity::Error,
                "an unmapped error was raised while handling a request",
                Some(Arc::new(error)),
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "something went wrong while processing your request",
            )
                .into_response()
        }
    }
}
