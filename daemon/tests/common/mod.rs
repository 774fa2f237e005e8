// Common test helpers for cashierd integration tests
//
// This module provides utilities for:
// - Bringing up a daemon on the simulated recognizer
// - Letting spawned tasks settle under paused time
// - Test output formatting

#![allow(dead_code)]

use cashierd::config::Config;
use cashierd::server::handle_command;
use cashierd::state::DaemonState;
use shared::ipc::{Command, Response, StatusInfo};
use shared::Page;
use tokio::time::{sleep, Duration};

/// Longer than the default startup delay.
pub const PAST_STARTUP: Duration = Duration::from_millis(600);

/// Starts a daemon and waits until its first listening session is up.
pub async fn start_listening_daemon() -> DaemonState {
    let state = DaemonState::start(Config::default()).expect("Failed to start daemon state");
    sleep(PAST_STARTUP).await;
    state
}

/// Gives the voice service and the kiosk task a chance to drain their queues.
pub async fn settle() {
    sleep(Duration::from_millis(10)).await;
}

pub async fn send(state: &DaemonState, command: Command) -> Response {
    let response = handle_command(state, command).await;
    settle().await;
    response
}

pub async fn say(state: &DaemonState, text: &str) {
    let response = send(
        state,
        Command::Speak {
            text: text.to_string(),
            is_final: true,
        },
    )
    .await;
    assert_eq!(response, Response::Ok, "speaking '{}'", text);
}

pub async fn go(state: &DaemonState, page: Page) {
    assert_eq!(send(state, Command::Navigate(page)).await, Response::Ok);
}

pub async fn status(state: &DaemonState) -> StatusInfo {
    match handle_command(state, Command::Status).await {
        Response::Status(info) => info,
        other => panic!("Expected status, got {:?}", other),
    }
}

/// Print a section header
pub fn print_header(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}", "=".repeat(60));
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("\nℹ {}", message);
}
