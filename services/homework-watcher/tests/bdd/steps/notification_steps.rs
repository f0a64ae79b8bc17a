//! BDD step definitions for notification feature

use cucumber::{given, then, when};

use homework_watcher::notifier::Notifier;
use homework_watcher::telegram::TelegramNotifier;

use crate::world::{as_http, test_credentials, Canned, WatcherWorld};

#[given("a Telegram notifier with valid credentials")]
fn telegram_valid(_world: &mut WatcherWorld) {
    // The fake client accepts messages unless told otherwise
}

#[given("a Telegram notifier that returns an API error")]
fn telegram_api_error(world: &mut WatcherWorld) {
    *world.http.telegram_reply.lock().unwrap() = Canned::Reply {
        status: 401,
        body: r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#.to_string(),
    };
}

#[given("a Telegram notifier that is unreachable")]
fn telegram_unreachable(world: &mut WatcherWorld) {
    *world.http.telegram_reply.lock().unwrap() = Canned::Unreachable;
}

#[when(expr = "the message {string} is delivered")]
async fn deliver_message(world: &mut WatcherWorld, text: String) {
    let notifier = TelegramNotifier::new(&world.config, &test_credentials(), as_http(&world.http));
    world.delivered = Some(notifier.deliver(&text).await);
}

#[then("the delivery should succeed")]
fn delivery_succeeds(world: &mut WatcherWorld) {
    assert_eq!(world.delivered, Some(true));
}

#[then("the delivery should fail without an error")]
fn delivery_fails(world: &mut WatcherWorld) {
    assert_eq!(world.delivered, Some(false));
}

#[then(expr = "Telegram should have received {string}")]
fn telegram_received(world: &mut WatcherWorld, text: String) {
    assert!(world.http.sent().contains(&text));
}
