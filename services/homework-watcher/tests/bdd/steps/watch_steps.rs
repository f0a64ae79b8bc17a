//! BDD step definitions for the watch loop feature

use std::sync::Arc;
use std::time::Duration;

use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use homework_watcher::practicum::PracticumFetcher;
use homework_watcher::telegram::TelegramNotifier;
use homework_watcher::watcher::{CycleOutcome, WatchState, Watcher};

use crate::world::{as_http, test_credentials, Canned, WatcherWorld};

fn docstring(step: &Step) -> String {
    step.docstring
        .as_ref()
        .expect("step needs a docstring")
        .trim()
        .to_string()
}

fn build_watcher(world: &WatcherWorld, cancel: CancellationToken) -> Watcher {
    let credentials = test_credentials();
    let fetcher = Arc::new(PracticumFetcher::new(
        &world.config,
        &credentials,
        as_http(&world.http),
    ));
    let notifier = Arc::new(TelegramNotifier::new(
        &world.config,
        &credentials,
        as_http(&world.http),
    ));
    Watcher::new(fetcher, notifier, &world.config, cancel)
}

fn parse_outcome(name: &str) -> CycleOutcome {
    match name {
        "no new status" => CycleOutcome::NoNewStatus,
        "status sent" => CycleOutcome::StatusSent { delivered: true },
        "status sent but not delivered" => CycleOutcome::StatusSent { delivered: false },
        "status unchanged" => CycleOutcome::StatusUnchanged,
        "failure silent" => CycleOutcome::FailureSilent,
        "failure reported" => CycleOutcome::FailureReported { delivered: true },
        "failure unchanged" => CycleOutcome::FailureUnchanged,
        other => panic!("Unknown outcome: {}", other),
    }
}

#[given(expr = "the cursor is at {int}")]
fn cursor_at(world: &mut WatcherWorld, cursor: u64) {
    world.state = WatchState::new(cursor);
}

#[given("the API responds with:")]
fn api_responds_with(world: &mut WatcherWorld, step: &Step) {
    world.http.script(Canned::Reply {
        status: 200,
        body: docstring(step),
    });
}

#[given(expr = "the API responds with HTTP {int}")]
fn api_responds_with_status(world: &mut WatcherWorld, status: u16) {
    world.http.script(Canned::Reply {
        status,
        body: r#"{"code": "error"}"#.to_string(),
    });
}

#[given("the API is unreachable")]
fn api_unreachable(world: &mut WatcherWorld) {
    world.http.script(Canned::Unreachable);
}

#[given("Telegram rejects messages")]
fn telegram_rejects(world: &mut WatcherWorld) {
    *world.http.telegram_reply.lock().unwrap() = Canned::Reply {
        status: 400,
        body: r#"{"ok":false,"description":"Bad Request: chat not found"}"#.to_string(),
    };
}

#[when("a watch cycle runs")]
async fn one_cycle(world: &mut WatcherWorld) {
    run_cycles(world, 1).await;
}

#[when(expr = "{int} watch cycles run")]
async fn many_cycles(world: &mut WatcherWorld, count: usize) {
    run_cycles(world, count).await;
}

async fn run_cycles(world: &mut WatcherWorld, count: usize) {
    if world.watcher.is_none() {
        let watcher = build_watcher(world, CancellationToken::new());
        world.watcher = Some(watcher);
    }
    let watcher = world.watcher.as_ref().expect("watcher not built");

    for _ in 0..count {
        let (state, outcome) = watcher.run_cycle(std::mem::take(&mut world.state)).await;
        world.state = state;
        world.outcomes.push(outcome);
    }
}

#[when("the watcher starts and is stopped during its first rest")]
async fn watcher_starts_and_stops(world: &mut WatcherWorld) {
    world.config.poll_interval_seconds = 3600;
    let cancel = CancellationToken::new();
    let watcher = build_watcher(world, cancel.clone());

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel_clone.cancel();
    });

    world.state = watcher.run(std::mem::take(&mut world.state)).await;
}

#[then("no message should have been sent")]
fn no_message_sent(world: &mut WatcherWorld) {
    let sent = world.http.sent();
    assert!(sent.is_empty(), "Expected no messages, got {:?}", sent);
}

#[then(expr = "exactly {int} message(s) should have been sent")]
fn messages_sent(world: &mut WatcherWorld, count: usize) {
    let sent = world.http.sent();
    assert_eq!(sent.len(), count, "Sent messages: {:?}", sent);
}

#[then("the last sent message should be:")]
fn last_message_is(world: &mut WatcherWorld, step: &Step) {
    let sent = world.http.sent();
    assert_eq!(sent.last().map(String::as_str), Some(docstring(step).as_str()));
}

#[then(expr = "the last sent message should start with {string}")]
fn last_message_starts_with(world: &mut WatcherWorld, prefix: String) {
    let sent = world.http.sent();
    let last = sent.last().expect("no message was sent");
    assert!(last.starts_with(&prefix), "'{}' does not start with '{}'", last, prefix);
}

#[then(expr = "the first sent message should be {string}")]
fn first_message_is(world: &mut WatcherWorld, expected: String) {
    let sent = world.http.sent();
    assert_eq!(sent.first(), Some(&expected));
}

#[then(expr = "the cursor should be {int}")]
fn cursor_is(world: &mut WatcherWorld, cursor: u64) {
    assert_eq!(world.state.cursor, cursor);
}

#[then(expr = "the cycle outcome should be {string}")]
fn cycle_outcome_is(world: &mut WatcherWorld, name: String) {
    assert_eq!(world.outcomes.last(), Some(&parse_outcome(&name)));
}

#[then(expr = "the API should have been queried with from_date {string}")]
fn queried_with(world: &mut WatcherWorld, from_date: String) {
    let from_dates = world.http.from_dates.lock().unwrap().clone();
    assert!(
        from_dates.contains(&from_date),
        "from_date {} not in {:?}",
        from_date,
        from_dates
    );
}

#[then(expr = "the API should have been queried {int} time(s)")]
fn queried_times(world: &mut WatcherWorld, count: usize) {
    assert_eq!(world.http.from_dates.lock().unwrap().len(), count);
}
