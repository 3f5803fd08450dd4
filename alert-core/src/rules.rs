//! Threshold rules evaluated against the hourly forecast.
//!
//! Each rule kind owns its comparison direction and its policy for picking
//! the triggering record. Adding a kind means one new variant plus one arm
//! in [`pick_trigger`], nothing else.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    model::{ForecastDataset, HourlyRecord},
    window,
};

pub const DEFAULT_LOOKAHEAD_HOURS: usize = 6;

/// The closed set of alert conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Precipitation probability >= threshold (%).
    Rain,
    /// Wind speed >= threshold (km/h).
    Wind,
    /// Feels-like temperature <= threshold (°C).
    FeelsLikeCold,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Rain => "rain",
            RuleKind::Wind => "wind",
            RuleKind::FeelsLikeCold => "feels-like-cold",
        }
    }

    pub const fn all() -> &'static [RuleKind] {
        &[RuleKind::Rain, RuleKind::Wind, RuleKind::FeelsLikeCold]
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RuleKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "rain" => Ok(RuleKind::Rain),
            "wind" => Ok(RuleKind::Wind),
            "feels-like-cold" => Ok(RuleKind::FeelsLikeCold),
            _ => Err(anyhow::anyhow!(
                "Unknown rule kind '{value}'. Supported kinds: rain, wind, feels-like-cold."
            )),
        }
    }
}

/// One configured threshold check. Read-only at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub kind: RuleKind,
    pub threshold: f64,
    #[serde(default = "default_lookahead")]
    pub lookahead_hours: usize,
}

fn default_lookahead() -> usize {
    DEFAULT_LOOKAHEAD_HOURS
}

impl AlertRule {
    /// Reject impossible rules before any network call is made.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.threshold.is_finite() {
            anyhow::bail!("rule '{}' has a non-finite threshold", self.kind);
        }
        if self.kind == RuleKind::Rain && !(0.0..=100.0).contains(&self.threshold) {
            anyhow::bail!(
                "rain threshold must be a probability between 0 and 100, got {}",
                self.threshold
            );
        }
        if self.kind == RuleKind::Wind && self.threshold < 0.0 {
            anyhow::bail!("wind threshold must be non-negative, got {}", self.threshold);
        }
        if self.lookahead_hours == 0 {
            anyhow::bail!("rule '{}' has a zero-hour lookahead window", self.kind);
        }
        Ok(())
    }
}

/// Outcome of evaluating one rule over its lookahead window.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleResult {
    pub rule: AlertRule,
    pub triggered: bool,
    /// The record that caused the trigger, per the kind's tie-break policy.
    pub trigger: Option<HourlyRecord>,
    pub summary: String,
}

/// Evaluate every rule over its own lookahead window anchored at `now`.
///
/// Results come back in configuration order, deterministically. Missing
/// data never fails the evaluation: a window extending past the dataset is
/// evaluated over the available hours, and a dataset that has not started
/// yet triggers nothing.
pub fn evaluate(
    dataset: &ForecastDataset,
    rules: &[AlertRule],
    now: NaiveDateTime,
) -> Vec<RuleResult> {
    rules.iter().map(|rule| evaluate_rule(dataset, rule, now)).collect()
}

fn evaluate_rule(dataset: &ForecastDataset, rule: &AlertRule, now: NaiveDateTime) -> RuleResult {
    let window = window::hourly_window(dataset, now, rule.lookahead_hours);
    match pick_trigger(rule, window) {
        Some(hour) => RuleResult {
            rule: rule.clone(),
            triggered: true,
            summary: triggered_summary(rule, hour),
            trigger: Some(hour.clone()),
        },
        None => RuleResult {
            rule: rule.clone(),
            triggered: false,
            trigger: None,
            summary: quiet_summary(rule),
        },
    }
}

/// Apply the kind's aggregation policy to the window.
///
/// Rain reports the earliest breach: it is a binary "will it rain soon"
/// signal where onset matters most. Wind and cold report the peak severity:
/// the user needs the worst hour, not the first one over the line.
fn pick_trigger<'a>(rule: &AlertRule, window: &'a [HourlyRecord]) -> Option<&'a HourlyRecord> {
    match rule.kind {
        RuleKind::Rain => window
            .iter()
            .find(|h| f64::from(h.precipitation_probability) >= rule.threshold),
        RuleKind::Wind => window
            .iter()
            .max_by(|a, b| a.wind_speed_kmh.total_cmp(&b.wind_speed_kmh))
            .filter(|h| h.wind_speed_kmh >= rule.threshold),
        RuleKind::FeelsLikeCold => window
            .iter()
            .min_by(|a, b| a.feels_like_c.total_cmp(&b.feels_like_c))
            .filter(|h| h.feels_like_c <= rule.threshold),
    }
}

fn triggered_summary(rule: &AlertRule, hour: &HourlyRecord) -> String {
    let at = hour.time.format("%a %d %b, %H:%M");
    match rule.kind {
        RuleKind::Rain => format!(
            "Rain likely: {}% chance at {at} (threshold: {}%)",
            hour.precipitation_probability, rule.threshold
        ),
        RuleKind::Wind => format!(
            "High wind: {} km/h at {at} (threshold: {} km/h)",
            hour.wind_speed_kmh, rule.threshold
        ),
        RuleKind::FeelsLikeCold => format!(
            "Feels very cold: {}°C at {at} (min feels-like: {}°C)",
            hour.feels_like_c, rule.threshold
        ),
    }
}

fn quiet_summary(rule: &AlertRule) -> String {
    match rule.kind {
        RuleKind::Rain => format!(
            "Rain stays below {}% over the next {} h",
            rule.threshold, rule.lookahead_hours
        ),
        RuleKind::Wind => format!(
            "Wind stays below {} km/h over the next {} h",
            rule.threshold, rule.lookahead_hours
        ),
        RuleKind::FeelsLikeCold => format!(
            "Feels-like stays above {}°C over the next {} h",
            rule.threshold, rule.lookahead_hours
        ),
    }
}
