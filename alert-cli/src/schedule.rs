//! Install or remove the hourly crontab entry for `run-once`.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use alert_core::Config;
use anyhow::{Context, Result, bail};

use crate::notify;

/// Marker used to find our lines in the crontab.
const CRON_TAG: &str = "weather-alert";

/// Install an hourly cron job: minute 0 of every hour, output appended to
/// `cron.log` next to the configured log file.
pub fn install(config: &Config) -> Result<()> {
    let binary =
        std::env::current_exe().context("could not resolve the weather-alert binary path")?;

    let log_dir = notify::log_dir(config);
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("could not create log directory {}", log_dir.display()))?;
    let cron_log = log_dir.join("cron.log");

    let existing = read_crontab()?;
    if existing.lines().any(|line| line.contains(CRON_TAG)) {
        println!("[schedule] Already installed. Run uninstall-schedule first.");
        return Ok(());
    }

    let updated = append_entry(&existing, &build_cron_line(&binary, &cron_log));
    write_crontab(&updated)?;

    println!("[schedule] Cron job installed. weather-alert will run every hour.");
    println!("[schedule] To verify: crontab -l");
    Ok(())
}

/// Remove our crontab entry, tolerating a missing crontab.
pub fn uninstall() -> Result<()> {
    let output = Command::new("crontab").arg("-l").output().context("failed to run crontab")?;
    if !output.status.success() {
        println!("[schedule] No crontab found. Nothing to remove.");
        return Ok(());
    }

    let existing = String::from_utf8_lossy(&output.stdout);
    let filtered = remove_entries(&existing);
    if filtered == existing {
        println!("[schedule] No weather-alert cron job found. Nothing to remove.");
        return Ok(());
    }

    write_crontab(&filtered)?;
    println!("[schedule] Cron job removed.");
    Ok(())
}

fn build_cron_line(binary: &Path, cron_log: &Path) -> String {
    format!("0 * * * * {} run-once >> {} 2>&1", binary.display(), cron_log.display())
}

fn append_entry(existing: &str, line: &str) -> String {
    let mut updated = existing.trim_end_matches('\n').to_string();
    if !updated.is_empty() {
        updated.push('\n');
    }
    updated.push_str(line);
    updated.push('\n');
    updated
}

fn remove_entries(crontab: &str) -> String {
    crontab
        .lines()
        .filter(|line| !line.contains(CRON_TAG))
        .map(|line| format!("{line}\n"))
        .collect()
}

/// Existing crontab content; `crontab -l` exits non-zero when no crontab
/// exists yet, which counts as empty.
fn read_crontab() -> Result<String> {
    let output = Command::new("crontab").arg("-l").output().context("failed to run crontab")?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Ok(String::new())
    }
}

fn write_crontab(content: &str) -> Result<()> {
    let mut child = Command::new("crontab")
        .arg("-")
        .stdin(Stdio::piped())
        .spawn()
        .context("failed to run crontab")?;

    let mut stdin = child.stdin.take().context("crontab stdin unavailable")?;
    stdin.write_all(content.as_bytes()).context("failed to write the new crontab")?;
    drop(stdin);

    let status = child.wait().context("failed to wait for crontab")?;
    if !status.success() {
        bail!("crontab rejected the new table");
    }
    Ok(())
}
