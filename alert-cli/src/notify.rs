//! Alert delivery: OS notifications, log lines, run-status records.
//!
//! Delivery failures are warnings, never errors — a missing notifier or an
//! unwritable log must not take down a scheduled run.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use alert_core::{Config, rules::RuleResult};
use anyhow::Result;
use chrono::Local;
use tracing::warn;

const NOTIFICATION_TITLE: &str = "Weather Alert";

/// Send every triggered result through the channels enabled in config.
pub fn dispatch(results: &[RuleResult], config: &Config) {
    for result in results.iter().filter(|r| r.triggered) {
        if config.notifications.desktop {
            desktop_notification(&result.summary, NOTIFICATION_TITLE);
        }
        if config.notifications.log {
            log_alert(&result.summary, config);
        }
    }
}

/// Send a fake alert to verify the dispatch path end to end.
/// Called by `weather-alert test-notification`.
pub fn send_test_notification(config: &Config) {
    let message = "Test alert: notifications are working correctly.";
    desktop_notification(message, NOTIFICATION_TITLE);
    if config.notifications.log {
        log_alert(message, config);
    }
    println!("Test notification sent: {message}");
}

/// One timestamped ERROR line with the full cause chain. Called by the CLI
/// when a run fails for any reason.
pub fn log_failure(config: &Config, err: &anyhow::Error) {
    let line = format!("{} [ERROR] {err:#}", timestamp());
    if let Err(write_err) = append_line(&config.log.path, &line) {
        warn!("could not write failure log: {write_err}");
    }
}

fn log_alert(message: &str, config: &Config) {
    let line = format!("[{}] {}", timestamp(), message);
    if let Err(err) = append_line(&config.log.path, &line) {
        warn!("could not write alert log: {err}");
    }
}

fn desktop_notification(message: &str, title: &str) {
    let Some(mut command) = notifier_command(message, title) else {
        warn!("no desktop notifier available on this platform");
        return;
    };
    match command.output() {
        Ok(output) if !output.status.success() => {
            warn!(
                "desktop notification failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(_) => {}
        Err(err) => warn!("could not run the desktop notifier: {err}"),
    }
}

#[cfg(target_os = "macos")]
fn notifier_command(message: &str, title: &str) -> Option<Command> {
    // Quotes are escaped so the message cannot break out of the
    // AppleScript string literal
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        escape_quotes(message),
        escape_quotes(title)
    );
    let mut command = Command::new("osascript");
    command.arg("-e").arg(script);
    Some(command)
}

#[cfg(target_os = "linux")]
fn notifier_command(message: &str, title: &str) -> Option<Command> {
    let mut command = Command::new("notify-send");
    command.arg(title).arg(message);
    Some(command)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn notifier_command(_message: &str, _title: &str) -> Option<Command> {
    None
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn escape_quotes(s: &str) -> String {
    s.replace('"', "\\\"")
}

/// Most recent run record, kept beside the log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRun {
    pub timestamp: String,
    pub status: String,
    pub detail: String,
}

/// Directory holding the log file and run-status records.
pub fn log_dir(config: &Config) -> &Path {
    config.log.path.parent().unwrap_or(Path::new("."))
}

fn last_run_path(config: &Config) -> PathBuf {
    log_dir(config).join("last_run.txt")
}

/// Append a status record after each run: `2026-02-23 20:00:01|OK|No alerts`.
pub fn write_last_run(config: &Config, status: &str, detail: &str) {
    let line = format!("{}|{status}|{detail}", timestamp());
    if let Err(err) = append_line(&last_run_path(config), &line) {
        warn!("could not record run status: {err}");
    }
}

/// Read the most recent run record, if any.
pub fn read_last_run(config: &Config) -> Option<LastRun> {
    let contents = fs::read_to_string(last_run_path(config)).ok()?;
    parse_last_run(contents.lines().last()?)
}

fn parse_last_run(line: &str) -> Option<LastRun> {
    let mut parts = line.splitn(3, '|');
    Some(LastRun {
        timestamp: parts.next()?.to_string(),
        status: parts.next()?.to_string(),
        detail: parts.next()?.to_string(),
    })
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}
