//! Selection of hourly/daily subsets from a fetched dataset.
//!
//! "Current time" is always an explicit parameter here, never read from the
//! clock, so callers and tests supply fixed instants deterministically.

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    error::SelectError,
    model::{DailyRecord, ForecastDataset, HourlyRecord},
};

pub const MAX_HOURLY_RANGE: usize = 24;
pub const MAX_DAILY_RANGE: usize = 16;

/// Which slice of a dataset to look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowMode {
    /// The single hourly record at or before the current time.
    Now,
    /// The single hourly record at or before an explicit instant.
    AtTime(NaiveDateTime),
    /// The next `n` hourly records starting at the `Now` record, inclusive.
    /// Clamped to [1, 24].
    HourlyRange(usize),
    /// The first `n` daily records from today onward. Clamped to [1, 16].
    DailyRange(usize),
}

/// Borrowed view into a dataset. Selection never copies records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowView<'a> {
    Hour(&'a HourlyRecord),
    Hours(&'a [HourlyRecord]),
    Days(&'a [DailyRecord]),
}

impl<'a> WindowView<'a> {
    pub fn as_hour(&self) -> Option<&'a HourlyRecord> {
        match self {
            WindowView::Hour(hour) => Some(hour),
            _ => None,
        }
    }

    pub fn as_hours(&self) -> Option<&'a [HourlyRecord]> {
        match self {
            WindowView::Hours(hours) => Some(hours),
            _ => None,
        }
    }

    pub fn as_days(&self) -> Option<&'a [DailyRecord]> {
        match self {
            WindowView::Days(days) => Some(days),
            _ => None,
        }
    }
}

/// Select a window from `dataset` relative to `now`.
pub fn select_window<'a>(
    dataset: &'a ForecastDataset,
    mode: WindowMode,
    now: NaiveDateTime,
) -> Result<WindowView<'a>, SelectError> {
    match mode {
        WindowMode::Now => {
            let idx = floor_index(dataset, now).ok_or_else(|| no_data(dataset, now))?;
            Ok(WindowView::Hour(&dataset.hourly()[idx]))
        }
        WindowMode::AtTime(instant) => {
            let (first, last) = dataset.span();
            if instant < first || instant > last {
                return Err(SelectError::OutOfRange { requested: instant, first, last });
            }
            let idx = floor_index(dataset, instant).ok_or_else(|| no_data(dataset, instant))?;
            Ok(WindowView::Hour(&dataset.hourly()[idx]))
        }
        WindowMode::HourlyRange(n) => {
            let idx = floor_index(dataset, now).ok_or_else(|| no_data(dataset, now))?;
            let n = n.clamp(1, MAX_HOURLY_RANGE);
            let end = (idx + n).min(dataset.hourly().len());
            Ok(WindowView::Hours(&dataset.hourly()[idx..end]))
        }
        WindowMode::DailyRange(n) => {
            let n = n.clamp(1, MAX_DAILY_RANGE);
            let today = now.date();
            let daily = dataset.daily();
            let start = daily.iter().position(|d| d.date >= today).unwrap_or(daily.len());
            let end = (start + n).min(daily.len());
            Ok(WindowView::Days(&daily[start..end]))
        }
    }
}

/// Lookahead window anchored at `now`, empty when the dataset has not
/// started yet. The rule evaluator uses this instead of [`select_window`]
/// because it degrades on missing data rather than failing.
pub(crate) fn hourly_window(
    dataset: &ForecastDataset,
    now: NaiveDateTime,
    hours: usize,
) -> &[HourlyRecord] {
    match floor_index(dataset, now) {
        Some(idx) => {
            let hours = hours.clamp(1, MAX_HOURLY_RANGE);
            let end = (idx + hours).min(dataset.hourly().len());
            &dataset.hourly()[idx..end]
        }
        None => &[],
    }
}

/// Index of the record closest at or before `at` — never a future record.
fn floor_index(dataset: &ForecastDataset, at: NaiveDateTime) -> Option<usize> {
    dataset.hourly().iter().rposition(|h| h.time <= at)
}

fn no_data(dataset: &ForecastDataset, now: NaiveDateTime) -> SelectError {
    SelectError::NoData { now, first: dataset.span().0 }
}

/// Resolve a `--time` argument: `"HH:MM"` means today at that time,
/// `"YYYY-MM-DD HH:MM"` is an explicit instant.
pub fn resolve_time_arg(raw: &str, today: NaiveDate) -> anyhow::Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M") {
        return Ok(today.and_time(time));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .with_context(|| format!("unrecognised time '{raw}', use \"HH:MM\" or \"YYYY-MM-DD HH:MM\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 24).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn dataset(hours: i64) -> ForecastDataset {
        let hourly = (0..hours)
            .map(|i| HourlyRecord {
                time: base() + Duration::hours(i),
                temperature_c: 10.0 + i as f64,
                feels_like_c: 9.0,
                humidity_pct: 70,
                wind_speed_kmh: 5.0,
                wind_direction_deg: 0.0,
                precipitation_probability: 0,
                snowfall_cm: 0.0,
            })
            .collect();
        let daily = (0..3)
            .map(|i| DailyRecord {
                date: base().date() + Duration::days(i),
                temp_max_c: 12.0,
                temp_min_c: 2.0,
                precipitation_probability_max: 30,
                snowfall_sum_cm: 0.0,
            })
            .collect();
        ForecastDataset::new(hourly, daily).unwrap()
    }

    #[test]
    fn now_floors_to_the_current_hour() {
        let dataset = dataset(6);
        let now = base() + Duration::minutes(157); // 14:37
        let view = select_window(&dataset, WindowMode::Now, now).unwrap();
        assert_eq!(view.as_hour().unwrap().time, base() + Duration::hours(2));
    }

    #[test]
    fn now_never_selects_a_future_record() {
        let dataset = dataset(6);
        let now = base() - Duration::minutes(1);
        let err = select_window(&dataset, WindowMode::Now, now).unwrap_err();
        assert_eq!(err, SelectError::NoData { now, first: base() });
    }

    #[test]
    fn at_time_uses_the_same_floor_rule() {
        let dataset = dataset(6);
        let instant = base() + Duration::minutes(90);
        let view = select_window(&dataset, WindowMode::AtTime(instant), base()).unwrap();
        assert_eq!(view.as_hour().unwrap().time, base() + Duration::hours(1));
    }

    #[test]
    fn at_time_outside_span_is_out_of_range() {
        let dataset = dataset(6);
        let late = base() + Duration::hours(48);
        let err = select_window(&dataset, WindowMode::AtTime(late), base()).unwrap_err();
        assert!(matches!(err, SelectError::OutOfRange { .. }));

        let early = base() - Duration::hours(1);
        let err = select_window(&dataset, WindowMode::AtTime(early), base()).unwrap_err();
        assert!(matches!(err, SelectError::OutOfRange { .. }));
    }

    #[test]
    fn hourly_range_starts_at_the_now_record_inclusive() {
        let dataset = dataset(6);
        let now = base() + Duration::minutes(30);
        let view = select_window(&dataset, WindowMode::HourlyRange(3), now).unwrap();
        let hours = view.as_hours().unwrap();
        assert_eq!(hours.len(), 3);
        assert_eq!(hours[0].time, base());
        assert_eq!(hours[2].time, base() + Duration::hours(2));
    }

    #[test]
    fn hourly_range_is_clamped() {
        let dataset = dataset(30);
        let zero = select_window(&dataset, WindowMode::HourlyRange(0), base()).unwrap();
        assert_eq!(zero.as_hours().unwrap().len(), 1);

        let huge = select_window(&dataset, WindowMode::HourlyRange(100), base()).unwrap();
        assert_eq!(huge.as_hours().unwrap().len(), MAX_HOURLY_RANGE);
    }

    #[test]
    fn hourly_range_shrinks_at_the_end_of_the_dataset() {
        let dataset = dataset(4);
        let view = select_window(&dataset, WindowMode::HourlyRange(6), base()).unwrap();
        assert_eq!(view.as_hours().unwrap().len(), 4);
    }

    #[test]
    fn daily_range_starts_from_today() {
        let dataset = dataset(6);
        let tomorrow = base() + Duration::days(1);
        let view = select_window(&dataset, WindowMode::DailyRange(5), tomorrow).unwrap();
        let days = view.as_days().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, tomorrow.date());
    }

    #[test]
    fn selection_is_deterministic() {
        let dataset = dataset(8);
        let now = base() + Duration::minutes(42);
        let first = select_window(&dataset, WindowMode::HourlyRange(4), now).unwrap();
        let second = select_window(&dataset, WindowMode::HourlyRange(4), now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn lenient_window_is_empty_before_the_dataset_starts() {
        let dataset = dataset(6);
        let before = base() - Duration::hours(2);
        assert!(hourly_window(&dataset, before, 6).is_empty());
    }

    #[test]
    fn resolve_bare_time_means_today() {
        let today = base().date();
        let resolved = resolve_time_arg("15:00", today).unwrap();
        assert_eq!(resolved, today.and_hms_opt(15, 0, 0).unwrap());
    }

    #[test]
    fn resolve_full_datetime() {
        let resolved = resolve_time_arg("2026-02-25 09:00", base().date()).unwrap();
        assert_eq!(
            resolved,
            NaiveDate::from_ymd_opt(2026, 2, 25).unwrap().and_hms_opt(9, 0, 0).unwrap()
        );
    }

    #[test]
    fn resolve_rejects_garbage() {
        let err = resolve_time_arg("next tuesday", base().date()).unwrap_err();
        assert!(err.to_string().contains("unrecognised time"));
    }
}
