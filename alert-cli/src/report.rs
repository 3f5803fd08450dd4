//! ASCII report and table rendering for forecast output.
//!
//! All rendering functions return strings ready to print.

use alert_core::{DailyRecord, HourlyRecord, model::compass_point};
use chrono::{NaiveDate, NaiveDateTime};

fn fmt_day(date: NaiveDate) -> String {
    date.format("%a %d %b").to_string()
}

fn fmt_hour(time: NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

fn fmt_time(time: NaiveDateTime) -> String {
    time.format("%a %d %b, %H:%M").to_string()
}

/// The current-conditions block printed by `run-once`.
pub fn render_current(
    location_line: &str,
    time_label: &str,
    current: &HourlyRecord,
    max_rain: u8,
    lookahead_hours: usize,
) -> String {
    let lines = [
        format!("📍 {} — {} ({})", location_line, fmt_time(current.time), time_label),
        format!(
            "🌡  Temperature:    {:.1}°C  (feels like {:.1}°C)",
            current.temperature_c, current.feels_like_c
        ),
        format!("💧 Humidity:        {}%", current.humidity_pct),
        format!("🌧  Rain chance:    {max_rain}%  (next {lookahead_hours} hours)"),
        format!(
            "💨 Wind:            {:.1} km/h {}",
            current.wind_speed_kmh,
            compass_point(current.wind_direction_deg)
        ),
    ];
    lines.join("\n")
}

/// Fixed-width table over an hourly window.
pub fn render_hourly_table(hours: &[HourlyRecord], location_line: &str) -> String {
    let header = format!(
        "{:<6} {:>7} {:>8} {:>6} {:>10} {:>5}",
        "Hour", "Temp°C", "Feels°C", "Rain%", "Wind km/h", "Dir"
    );
    let sep = "─".repeat(header.chars().count());

    let mut lines = vec![
        format!("📍 {} — {}-hour forecast", location_line, hours.len()),
        sep.clone(),
        header,
        sep,
    ];
    for hour in hours {
        lines.push(format!(
            "{:<6} {:>7.1} {:>8.1} {:>6} {:>10.1} {:>5}",
            fmt_hour(hour.time),
            hour.temperature_c,
            hour.feels_like_c,
            hour.precipitation_probability,
            hour.wind_speed_kmh,
            compass_point(hour.wind_direction_deg)
        ));
    }
    lines.join("\n")
}

/// Fixed-width table over a daily window. The snow column only appears
/// when there is snow to show.
pub fn render_daily_table(days: &[DailyRecord], location_line: &str) -> String {
    let has_snow = days.iter().any(|d| d.snowfall_sum_cm > 0.0);

    let mut header = format!("{:<10} {:>6} {:>6} {:>6}", "Day", "Max°C", "Min°C", "Rain%");
    if has_snow {
        header.push_str(&format!(" {:>9}", "Snow(cm)"));
    }
    let sep = "─".repeat(header.chars().count());

    let mut lines = vec![
        format!("📍 {} — {}-day forecast", location_line, days.len()),
        sep.clone(),
        header,
        sep,
    ];
    for day in days {
        let mut row = format!(
            "{:<10} {:>6.1} {:>6.1} {:>6}",
            fmt_day(day.date),
            day.temp_max_c,
            day.temp_min_c,
            day.precipitation_probability_max
        );
        if has_snow {
            row.push_str(&format!(" {:>9.1}", day.snowfall_sum_cm));
        }
        lines.push(row);
    }
    lines.join("\n")
}
