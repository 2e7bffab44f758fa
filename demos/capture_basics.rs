//! Walkthrough of a capture window: attach, log, query, assert, detach.
//!
//! Run with: `cargo run --example capture_basics`

use std::sync::Arc;

use logspy::{AttachedError, Severity, SpyLogger};

#[derive(Debug, thiserror::Error)]
#[error("refusing to greet {name:?}")]
struct RejectedNameError {
    name: String,
}

fn main() -> Result<(), logspy::AttachError> {
    println!("Attaching capture window...");
    let spy = SpyLogger::attach()?;

    println!("Emitting log events...\n");

    tracing::info!("greeting service starting");
    tracing::warn!("greeting template missing, falling back to default");

    let rejection: AttachedError = Arc::new(RejectedNameError {
        name: "<script>".to_owned(),
    });
    logspy::emit(
        Severity::Error,
        "greeting rejected",
        Some(Arc::clone(&rejection)),
    );

    println!("{}\n", spy.dump());

    println!("warnings captured: {}", spy.count_warning_events());
    println!(
        "rejections captured: {}",
        spy.find_by_error_kind::<RejectedNameError>().len()
    );

    spy.expect_event()
        .with_severity(Severity::Error)
        .with_error_instance(&rejection)
        .assert_exists();
    println!("✓ Found the ERROR event carrying the exact rejection instance");

    spy.expect_event()
        .with_severity(Severity::Warn)
        .with_message_containing("template missing")
        .assert_exists();
    println!("✓ Found the WARN event by message fragment");

    spy.detach();
    println!("\nWindow detached; a new window would start empty.");
    Ok(())
}
