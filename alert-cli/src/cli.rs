use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use alert_core::{
    Config, Fetcher, OpenMeteoProvider,
    config::LocationConfig,
    geocode::geocode,
    rules::{self, AlertRule, RuleKind},
    window::{WindowMode, resolve_time_arg, select_window},
};

use crate::{notify, report, schedule};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-alert", version, about = "Weather threshold alerts from Open-Meteo")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Alternative config file path.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the forecast, evaluate alert rules, notify on triggers.
    RunOnce {
        /// Look up coordinates by place name, e.g. "Tokyo" or "London, UK".
        #[arg(long, value_name = "PLACE")]
        location: Option<String>,

        /// Evaluate at a specific time, e.g. "15:00" or "2026-02-25 09:00".
        #[arg(long, value_name = "TIME")]
        time: Option<String>,

        /// Also print an N-hour forecast table.
        #[arg(long, value_name = "N")]
        hours: Option<usize>,

        /// Also print an N-day forecast table.
        #[arg(long, value_name = "N")]
        days: Option<usize>,
    },

    /// Send a test notification through the real dispatch path.
    TestNotification,

    /// Install an hourly cron job running `run-once`.
    InstallSchedule,

    /// Remove the cron job.
    UninstallSchedule,

    /// Show the result of the most recent run.
    Status,

    /// Interactively create the config file.
    Init,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_path = self.config.as_deref();
        match self.command {
            Command::RunOnce { location, time, hours, days } => {
                let config = load_config(config_path)?;
                match run_pipeline(&config, location.as_deref(), time.as_deref(), hours, days)
                    .await
                {
                    Ok(detail) => {
                        notify::write_last_run(&config, "OK", &detail);
                        Ok(())
                    }
                    Err(err) => {
                        notify::log_failure(&config, &err);
                        notify::write_last_run(&config, "ERROR", &format!("{err:#}"));
                        Err(err)
                    }
                }
            }
            Command::TestNotification => {
                let config = load_config(config_path)?;
                notify::send_test_notification(&config);
                Ok(())
            }
            Command::InstallSchedule => {
                let config = load_config(config_path)?;
                schedule::install(&config)
            }
            Command::UninstallSchedule => schedule::uninstall(),
            Command::Status => {
                let config = load_config(config_path)?;
                match notify::read_last_run(&config) {
                    Some(run) => {
                        println!("Last run: {} [{}] {}", run.timestamp, run.status, run.detail);
                    }
                    None => println!("No runs recorded yet."),
                }
                Ok(())
            }
            Command::Init => init(config_path).await,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Fetch, select, evaluate, dispatch. Returns the run-status detail line.
async fn run_pipeline(
    config: &Config,
    location: Option<&str>,
    time: Option<&str>,
    hours: Option<usize>,
    days: Option<usize>,
) -> Result<String> {
    // --location overrides the configured coordinate
    let coordinate = match location {
        Some(place) => geocode(place)
            .await
            .with_context(|| format!("could not resolve location \"{place}\""))?,
        None => config.location.coordinate(),
    };

    let now = Local::now().naive_local();
    let (eval_at, time_label) = match time {
        Some(raw) => (resolve_time_arg(raw, now.date())?, "forecast"),
        None => (now, "now"),
    };

    println!("Fetching forecast for {}...", coordinate.display_name());

    // two days always cover a late-night lookahead into tomorrow
    let requested_days = days.unwrap_or(0).clamp(0, 16).max(2) as u8;
    let fetcher = Fetcher::new(OpenMeteoProvider::new()?);
    let dataset = fetcher
        .fetch(&coordinate, requested_days)
        .await
        .context("forecast fetch failed")?;

    let mode = match time {
        Some(_) => WindowMode::AtTime(eval_at),
        None => WindowMode::Now,
    };
    let current = select_window(&dataset, mode, eval_at)?
        .as_hour()
        .context("expected a single-hour selection")?;

    let report_lookahead = config
        .rules
        .iter()
        .map(|r| r.lookahead_hours)
        .max()
        .unwrap_or(rules::DEFAULT_LOOKAHEAD_HOURS);
    let report_window = select_window(&dataset, WindowMode::HourlyRange(report_lookahead), eval_at)?
        .as_hours()
        .context("expected an hourly range selection")?;
    let max_rain =
        report_window.iter().map(|h| h.precipitation_probability).max().unwrap_or(0);

    println!();
    println!(
        "{}",
        report::render_current(
            &coordinate.display_name(),
            time_label,
            current,
            max_rain,
            report_lookahead
        )
    );

    if let Some(n) = hours {
        let window = select_window(&dataset, WindowMode::HourlyRange(n), eval_at)?
            .as_hours()
            .context("expected an hourly range selection")?;
        println!();
        println!("{}", report::render_hourly_table(window, &coordinate.display_name()));
    }

    if let Some(n) = days {
        let window = select_window(&dataset, WindowMode::DailyRange(n), eval_at)?
            .as_days()
            .context("expected a daily range selection")?;
        println!();
        println!("{}", report::render_daily_table(window, &coordinate.display_name()));
    }

    let results = rules::evaluate(&dataset, &config.rules, eval_at);
    let triggered_count = results.iter().filter(|r| r.triggered).count();

    println!();
    if triggered_count == 0 {
        println!("✅ No alerts triggered.");
    } else {
        for result in results.iter().filter(|r| r.triggered) {
            println!("⚠️  ALERT: {}", result.summary);
        }
    }

    notify::dispatch(&results, config);

    Ok(match triggered_count {
        0 => "No alerts".to_string(),
        n => format!("{n} alert(s) triggered"),
    })
}

/// Interactive config bootstrap: `weather-alert init`.
async fn init(config_path: Option<&Path>) -> Result<()> {
    use inquire::{CustomType, Text};

    let place = Text::new("Place name:")
        .with_help_message("e.g. \"Tokyo\" or \"London, UK\"")
        .prompt()?;

    println!("Looking up \"{place}\"...");
    let coordinate = geocode(&place).await?;
    println!("Found {}", coordinate.display_name());

    let rain: f64 =
        CustomType::new("Rain probability threshold (%):").with_default(50.0).prompt()?;
    let wind: f64 =
        CustomType::new("Wind speed threshold (km/h):").with_default(30.0).prompt()?;
    let cold: f64 =
        CustomType::new("Feels-like cold threshold (°C):").with_default(-5.0).prompt()?;
    let lookahead: usize =
        CustomType::new("Lookahead window (hours):").with_default(6).prompt()?;

    let config = Config {
        location: LocationConfig {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            name: coordinate.display_name(),
        },
        rules: vec![
            AlertRule { kind: RuleKind::Rain, threshold: rain, lookahead_hours: lookahead },
            AlertRule { kind: RuleKind::Wind, threshold: wind, lookahead_hours: lookahead },
            AlertRule {
                kind: RuleKind::FeelsLikeCold,
                threshold: cold,
                lookahead_hours: lookahead,
            },
        ],
        notifications: Default::default(),
        log: Default::default(),
    };
    for rule in &config.rules {
        rule.validate()?;
    }

    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => Config::config_file_path()?,
    };
    config.save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
