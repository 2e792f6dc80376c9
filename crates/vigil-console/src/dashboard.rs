//! Interactive dashboard: periodic status and log polling plus operator
//! commands, multiplexed on one task. Every poll tick is an independent
//! attempt; a failed tick is logged and the next one starts fresh.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use vigil_client::Backend;
use vigil_core::{DashboardState, Notice};

use crate::config::Config;
use crate::toast;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Toggle,
    Reload,
    TestIntegration,
    ShowStatus,
    ShowLogs,
    Help,
    Quit,
    Unknown,
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "t" => Command::Toggle,
        "r" => Command::Reload,
        "a" => Command::TestIntegration,
        "s" => Command::ShowStatus,
        "l" => Command::ShowLogs,
        "?" | "help" => Command::Help,
        "q" | "quit" => Command::Quit,
        _ => Command::Unknown,
    }
}

pub async fn run(backend: Backend, config: &Config) -> Result<()> {
    let mut state = DashboardState::new();
    // Both tickers fire immediately, so the first snapshot does not wait a
    // full interval.
    let mut status_ticker = tokio::time::interval(config.status_poll);
    let mut log_ticker = tokio::time::interval(config.log_poll);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("vigil dashboard — {}", backend.base());
    if let Ok(url) = backend.video_feed_url() {
        println!("live feed: {url}");
    }
    print_help();

    loop {
        tokio::select! {
            _ = status_ticker.tick() => poll_status(&backend, &mut state).await,
            _ = log_ticker.tick() => poll_logs(&backend, &mut state).await,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Command::Toggle => toggle(&backend, &mut state).await,
                    Command::Reload => reload(&backend, &mut state).await,
                    Command::TestIntegration => test_integration(&backend).await,
                    Command::ShowStatus => print_snapshot(&state),
                    Command::ShowLogs => print_logs(&state),
                    Command::Help => print_help(),
                    Command::Quit => break,
                    Command::Unknown => toast::show(&Notice::info("unknown command, ? for help")),
                }
            }
        }
    }

    Ok(())
}

async fn poll_status(backend: &Backend, state: &mut DashboardState) {
    match backend.status().await {
        Ok(status) => {
            if let Some(recognition) = state.apply_status(&status) {
                toast::show(&Notice::info(format!(
                    "recognized {} ({})",
                    recognition.name,
                    recognition.confidence_percent()
                )));
            }
        }
        Err(error) => tracing::warn!(%error, "status poll failed"),
    }
}

async fn poll_logs(backend: &Backend, state: &mut DashboardState) {
    match backend.logs().await {
        Ok(response) => {
            if let Some(error) = state.apply_logs(response) {
                tracing::warn!(error = %error, "backend could not read its logs");
            }
        }
        Err(error) => tracing::warn!(%error, "log poll failed"),
    }
}

async fn toggle(backend: &Backend, state: &mut DashboardState) {
    match backend.toggle_recognition().await {
        Ok(response) => {
            state.apply_toggle(&response);
            toast::show(&Notice::success(response.message));
            let indicator = if state.recognition_active() {
                "active"
            } else {
                "inactive"
            };
            println!("recognition: {indicator}");
        }
        Err(error) => toast::show(&Notice::error(format!("toggle failed: {error}"))),
    }
}

async fn reload(backend: &Backend, state: &mut DashboardState) {
    match backend.reload_faces().await {
        Ok(response) => {
            toast::show(&Notice::success(response.message));
            // A reload changes the known-face count; refresh right away.
            poll_status(backend, state).await;
        }
        Err(error) => toast::show(&Notice::error(format!("reload failed: {error}"))),
    }
}

async fn test_integration(backend: &Backend) {
    match backend.test_home_assistant().await {
        Ok(outcome) if outcome.success => toast::show(&Notice::success(outcome.message)),
        Ok(outcome) => toast::show(&Notice::error(outcome.message)),
        Err(error) => toast::show(&Notice::error(format!("integration test failed: {error}"))),
    }
}

pub fn print_snapshot(state: &DashboardState) {
    let recognition = if state.recognition_active() {
        "active"
    } else {
        "inactive"
    };
    println!(
        "recognition: {recognition} | known faces: {}",
        state.known_faces()
    );
    match state.last_recognition() {
        Some(last) => {
            let when = last
                .timestamp_display()
                .unwrap_or_else(|| "unknown time".to_string());
            println!(
                "last recognition: {} ({}) at {when}",
                last.name,
                last.confidence_percent()
            );
        }
        None => println!("last recognition: none yet"),
    }
}

fn print_logs(state: &DashboardState) {
    if state.logs().is_empty() {
        println!("no recognition logs yet");
        return;
    }
    for line in state.logs() {
        println!("{line}");
    }
}

fn print_help() {
    println!(
        "commands: t toggle recognition | r reload faces | a test home assistant | \
         s status | l logs | q quit"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("t"), Command::Toggle);
        assert_eq!(parse_command("  r "), Command::Reload);
        assert_eq!(parse_command("a"), Command::TestIntegration);
        assert_eq!(parse_command("help"), Command::Help);
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("bogus"), Command::Unknown);
    }
}
