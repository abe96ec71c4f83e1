//! Unit tests for per-target routing and the fallback cascade.

use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rstest::rstest;

use super::*;
use crate::tests::{FailingOffload, InlineOffload, MockBroker, MockDirect, RecordingPresenter};

const SENTINEL: &str = "elevate.exe";
const PLAIN: &str = "notepad.exe";

type Harness<O> = (LaunchDispatcher<MockDirect, O>, Receiver<LaunchCompletion>);

fn harness<O>(broker: MockBroker, direct: MockDirect, offload: O) -> Harness<O> {
    let (sender, receiver) = mpsc::channel();
    (
        LaunchDispatcher::new(Arc::new(broker), direct, offload, sender),
        receiver,
    )
}

fn broker_returning(outcome: LaunchOutcome) -> MockBroker {
    let mut broker = MockBroker::new();
    broker
        .expect_invoke()
        .withf(|target: &Path| target == Path::new(SENTINEL))
        .times(1)
        .return_const(outcome);
    broker
}

fn silent_broker() -> MockBroker {
    let mut broker = MockBroker::new();
    broker.expect_invoke().never();
    broker
}

fn silent_direct() -> MockDirect {
    let mut direct = MockDirect::new();
    direct.expect_invoke().never();
    direct
}

fn direct_expecting(path: &'static str, elevated: bool, outcome: LaunchOutcome) -> MockDirect {
    let mut direct = MockDirect::new();
    direct
        .expect_invoke()
        .withf(move |target: &LaunchTarget| {
            target.path() == Path::new(path) && target.request_elevation() == elevated
        })
        .times(1)
        .return_const(outcome);
    direct
}

#[rstest]
fn plain_targets_never_consult_the_broker(#[values(false, true)] elevated: bool) {
    let (dispatcher, receiver) = harness(
        silent_broker(),
        direct_expecting(PLAIN, elevated, LaunchOutcome::Success),
        InlineOffload,
    );
    let mut presenter = RecordingPresenter::default();

    let target = LaunchTarget::new(PLAIN, elevated);
    let expected = format!("Started: {target}");
    dispatcher.launch(target, &mut presenter);

    assert_eq!(presenter.last_status(), Some((expected.as_str(), false)));
    assert_eq!(dispatcher.drain(&receiver, &mut presenter), 0);
}

#[rstest]
fn broker_success_is_reported_after_completion() {
    let (dispatcher, receiver) = harness(
        broker_returning(LaunchOutcome::Success),
        silent_direct(),
        InlineOffload,
    );
    let mut presenter = RecordingPresenter::default();

    dispatcher.launch(LaunchTarget::new(SENTINEL, true), &mut presenter);
    assert_eq!(
        presenter.last_status(),
        Some(("Requesting elevation for elevate.exe via EPM client...", false))
    );

    assert_eq!(dispatcher.drain(&receiver, &mut presenter), 1);
    assert_eq!(
        presenter.last_status(),
        Some(("Started: elevate.exe (as administrator)", false))
    );
    assert!(presenter.alerts().is_empty());
}

#[rstest]
fn permission_denial_falls_back_with_the_requested_elevation(
    #[values(false, true)] elevated: bool,
) {
    let (dispatcher, receiver) = harness(
        broker_returning(LaunchOutcome::BrokerPermissionDenied),
        direct_expecting(SENTINEL, elevated, LaunchOutcome::Success),
        InlineOffload,
    );
    let mut presenter = RecordingPresenter::default();

    let target = LaunchTarget::new(SENTINEL, elevated);
    let expected = format!("Started: {target}");
    dispatcher.launch(target, &mut presenter);
    dispatcher.drain(&receiver, &mut presenter);

    assert_eq!(presenter.last_status(), Some((expected.as_str(), false)));
    assert!(presenter.alerts().is_empty());
}

#[test]
fn unavailable_broker_falls_back_only_when_elevation_was_requested() {
    let (dispatcher, receiver) = harness(
        broker_returning(LaunchOutcome::BrokerUnavailable),
        direct_expecting(SENTINEL, true, LaunchOutcome::Success),
        InlineOffload,
    );
    let mut presenter = RecordingPresenter::default();

    dispatcher.launch(LaunchTarget::new(SENTINEL, true), &mut presenter);
    dispatcher.drain(&receiver, &mut presenter);

    assert_eq!(
        presenter.last_status(),
        Some(("Started: elevate.exe (as administrator)", false))
    );
}

#[rstest]
#[case(
    LaunchOutcome::BrokerUnavailable,
    false,
    "elevate.exe: EPM client is not installed"
)]
#[case(
    LaunchOutcome::TargetMissing,
    true,
    "elevate.exe: target executable was not found"
)]
#[case(
    LaunchOutcome::BrokerOtherFailure(String::from("broker exited with status 3 (0x00000003)")),
    true,
    "elevate.exe: EPM client failed: broker exited with status 3 (0x00000003)"
)]
fn unrecoverable_broker_failures_are_reported_without_fallback(
    #[case] outcome: LaunchOutcome,
    #[case] elevated: bool,
    #[case] expected: &str,
) {
    let (dispatcher, receiver) = harness(broker_returning(outcome), silent_direct(), InlineOffload);
    let mut presenter = RecordingPresenter::default();

    dispatcher.launch(LaunchTarget::new(SENTINEL, elevated), &mut presenter);
    dispatcher.drain(&receiver, &mut presenter);

    assert_eq!(presenter.last_status(), Some((expected, true)));
    assert_eq!(presenter.alerts(), vec![expected]);
}

#[test]
fn direct_failures_are_terminal() {
    let (dispatcher, receiver) = harness(
        broker_returning(LaunchOutcome::BrokerPermissionDenied),
        direct_expecting(
            SENTINEL,
            true,
            LaunchOutcome::DirectFailure(String::from("operation cancelled")),
        ),
        InlineOffload,
    );
    let mut presenter = RecordingPresenter::default();

    dispatcher.launch(LaunchTarget::new(SENTINEL, true), &mut presenter);
    dispatcher.drain(&receiver, &mut presenter);

    assert_eq!(
        presenter.alerts(),
        vec!["elevate.exe: failed to launch: operation cancelled"]
    );
}

#[test]
fn worker_start_failure_is_reported() {
    let (dispatcher, receiver) = harness(silent_broker(), silent_direct(), FailingOffload);
    let mut presenter = RecordingPresenter::default();

    dispatcher.launch(LaunchTarget::new(SENTINEL, true), &mut presenter);

    assert_eq!(
        presenter.alerts(),
        vec!["failed to start broker worker: thread limit reached"]
    );
    assert_eq!(dispatcher.drain(&receiver, &mut presenter), 0);
}

#[test]
fn broker_runs_on_a_named_worker_thread() {
    let seen = Arc::new(Mutex::new(None));
    let recorder = Arc::clone(&seen);
    let mut broker = MockBroker::new();
    broker.expect_invoke().times(1).returning(move |_| {
        let name = thread::current().name().map(str::to_owned);
        if let Ok(mut slot) = recorder.lock() {
            *slot = name;
        }
        LaunchOutcome::Success
    });
    let (dispatcher, receiver) = harness(broker, silent_direct(), ThreadOffload);
    let mut presenter = RecordingPresenter::default();

    dispatcher.launch(LaunchTarget::new(SENTINEL, false), &mut presenter);
    let completion = receiver
        .recv_timeout(Duration::from_secs(10))
        .expect("completion from worker");
    dispatcher.complete(completion, &mut presenter);

    assert_eq!(
        seen.lock().expect("thread name").as_deref(),
        Some(BROKER_WORKER_NAME)
    );
    assert_eq!(presenter.last_status(), Some(("Started: elevate.exe", false)));
}
