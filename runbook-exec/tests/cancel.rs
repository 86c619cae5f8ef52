mod common;

use std::sync::Arc;

use common::MockApi;
use runbook_core::{ApiCall, Automation, Step};
use runbook_exec::{CancelHandle, CapabilityError, ExecutionContext, Interpreter, RecordingEventSink};

fn api_step(name: &str, api: &str) -> Step {
    Step::api_call(name, ApiCall::new("ec2", api))
}

#[tokio::test]
async fn pending_cancel_routes_first_step_to_on_cancel() {
    let automation = Automation::builder("CancelDoc")
        .then(api_step("A", "Work").on_cancel("Cleanup"))
        .then(api_step("B", "Work"))
        .then(api_step("Cleanup", "Clean"))
        .build()
        .unwrap();

    let api = Arc::new(MockApi::new());
    let events = Arc::new(RecordingEventSink::new());
    let interp = Interpreter::builder()
        .remote_api(api.clone())
        .event_sink(events.clone())
        .build();
    interp.cancel_handle().cancel();

    let mut ctx = ExecutionContext::new();
    interp.run(&automation, &mut ctx).await.unwrap();
    assert_eq!(ctx.trace(), ["A", "Cleanup"]);
    assert_eq!(api.calls_to("Work"), 0);
    assert_eq!(events.count("step.fallback_routed"), 1);
    assert!(!interp.cancel_handle().is_cancelled());
}

#[tokio::test]
async fn cancel_without_route_propagates() {
    let automation = Automation::builder("CancelDoc")
        .then(api_step("A", "Work").on_failure("B"))
        .then(api_step("B", "Work"))
        .build()
        .unwrap();

    let handle = CancelHandle::new();
    let interp = Interpreter::builder()
        .remote_api(Arc::new(MockApi::new()))
        .cancel_handle(handle.clone())
        .build();
    handle.cancel();

    let mut ctx = ExecutionContext::new();
    let err = interp.run(&automation, &mut ctx).await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.trace(), ["A"]);
}

#[tokio::test]
async fn cancellation_from_effect_is_never_retried() {
    let automation = Automation::builder("CancelDoc")
        .then(api_step("A", "Work").max_attempts(3).on_cancel("Cleanup"))
        .then(api_step("Cleanup", "Clean"))
        .build()
        .unwrap();

    let api = Arc::new(MockApi::new().respond("Work", Err(CapabilityError::Cancelled)));
    let interp = Interpreter::builder().remote_api(api.clone()).build();
    let mut ctx = ExecutionContext::new();
    interp.run(&automation, &mut ctx).await.unwrap();

    assert_eq!(api.calls_to("Work"), 1);
    assert_eq!(ctx.trace(), ["A", "Cleanup"]);
}

#[tokio::test]
async fn cancel_is_observed_at_the_next_step_boundary() {
    let handle = CancelHandle::new();
    let automation = Automation::builder("CancelDoc")
        .then(api_step("A", "Work"))
        .then(api_step("B", "Work"))
        .then(api_step("C", "Work"))
        .build()
        .unwrap();

    let api = Arc::new(MockApi::new().cancelling(handle.clone()));
    let interp = Interpreter::builder()
        .remote_api(api.clone())
        .cancel_handle(handle)
        .build();
    let mut ctx = ExecutionContext::new();
    let err = interp.run(&automation, &mut ctx).await.unwrap_err();

    assert_eq!(err.step, "B");
    assert_eq!(ctx.trace(), ["A", "B"]);
    assert_eq!(api.calls_to("Work"), 1);
}
