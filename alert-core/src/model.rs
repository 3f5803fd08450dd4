use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A geographic point, from config or a geocoding lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Human-readable place name, e.g. "Tokyo, Japan".
    pub name: Option<String>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, name: None }
    }

    pub fn named(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self { latitude, longitude, name: Some(name.into()) }
    }

    /// Display name, falling back to the raw coordinates.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

/// One hour of forecast data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_kmh: f64,
    /// Compass bearing in degrees, 0 = north.
    pub wind_direction_deg: f64,
    pub precipitation_probability: u8,
    pub snowfall_cm: f64,
}

/// One calendar day of forecast data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub temp_max_c: f64,
    pub temp_min_c: f64,
    pub precipitation_probability_max: u8,
    pub snowfall_sum_cm: f64,
}

/// Time-indexed forecast for one location, constructed once per fetch and
/// immutable afterwards.
///
/// Invariants, enforced by [`ForecastDataset::new`]:
/// - the hourly series is non-empty, strictly ascending, one hour apart
/// - daily dates are strictly ascending
/// - humidity and precipitation probability are 0–100, snowfall is >= 0
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDataset {
    hourly: Vec<HourlyRecord>,
    daily: Vec<DailyRecord>,
}

impl ForecastDataset {
    pub fn new(hourly: Vec<HourlyRecord>, daily: Vec<DailyRecord>) -> Result<Self, FetchError> {
        if hourly.is_empty() {
            return Err(FetchError::malformed("hourly series is empty"));
        }

        for pair in hourly.windows(2) {
            if pair[1].time - pair[0].time != Duration::hours(1) {
                return Err(FetchError::malformed(format!(
                    "hourly timestamps must ascend in one-hour steps: {} -> {}",
                    pair[0].time, pair[1].time
                )));
            }
        }

        for hour in &hourly {
            if hour.humidity_pct > 100 {
                return Err(FetchError::malformed(format!(
                    "humidity {}% at {} is out of range",
                    hour.humidity_pct, hour.time
                )));
            }
            if hour.precipitation_probability > 100 {
                return Err(FetchError::malformed(format!(
                    "precipitation probability {}% at {} is out of range",
                    hour.precipitation_probability, hour.time
                )));
            }
            if hour.snowfall_cm < 0.0 {
                return Err(FetchError::malformed(format!(
                    "negative snowfall at {}",
                    hour.time
                )));
            }
        }

        for pair in daily.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(FetchError::malformed(format!(
                    "daily dates must ascend: {} -> {}",
                    pair[0].date, pair[1].date
                )));
            }
        }

        Ok(Self { hourly, daily })
    }

    pub fn hourly(&self) -> &[HourlyRecord] {
        &self.hourly
    }

    pub fn daily(&self) -> &[DailyRecord] {
        &self.daily
    }

    /// First and last hourly timestamps. The series is never empty.
    pub fn span(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.hourly[0].time, self.hourly[self.hourly.len() - 1].time)
    }
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass label for a wind bearing in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    let idx = ((degrees.rem_euclid(360.0) / 22.5) + 0.5).floor() as usize % 16;
    COMPASS_POINTS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(offset: i64) -> HourlyRecord {
        let base = NaiveDate::from_ymd_opt(2026, 2, 24)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        HourlyRecord {
            time: base + Duration::hours(offset),
            temperature_c: 10.0,
            feels_like_c: 9.0,
            humidity_pct: 70,
            wind_speed_kmh: 5.0,
            wind_direction_deg: 0.0,
            precipitation_probability: 0,
            snowfall_cm: 0.0,
        }
    }

    #[test]
    fn accepts_contiguous_hours() {
        let dataset = ForecastDataset::new(vec![hour(0), hour(1), hour(2)], vec![]).unwrap();
        assert_eq!(dataset.hourly().len(), 3);
        assert_eq!(dataset.span(), (hour(0).time, hour(2).time));
    }

    #[test]
    fn rejects_empty_hourly_series() {
        let err = ForecastDataset::new(vec![], vec![]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = ForecastDataset::new(vec![hour(0), hour(0)], vec![]).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_out_of_order_timestamps() {
        let err = ForecastDataset::new(vec![hour(1), hour(0)], vec![]).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_gap_in_hourly_series() {
        let err = ForecastDataset::new(vec![hour(0), hour(2)], vec![]).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_out_of_range_humidity() {
        let mut bad = hour(0);
        bad.humidity_pct = 130;
        let err = ForecastDataset::new(vec![bad], vec![]).unwrap_err();
        assert!(err.to_string().contains("humidity"));
    }

    #[test]
    fn rejects_out_of_range_precipitation_probability() {
        let mut bad = hour(0);
        bad.precipitation_probability = 101;
        let err = ForecastDataset::new(vec![bad], vec![]).unwrap_err();
        assert!(err.to_string().contains("precipitation"));
    }

    #[test]
    fn rejects_negative_snowfall() {
        let mut bad = hour(0);
        bad.snowfall_cm = -1.0;
        let err = ForecastDataset::new(vec![bad], vec![]).unwrap_err();
        assert!(err.to_string().contains("snowfall"));
    }

    #[test]
    fn rejects_unsorted_daily_dates() {
        let day = |d: u32| DailyRecord {
            date: NaiveDate::from_ymd_opt(2026, 2, d).unwrap(),
            temp_max_c: 5.0,
            temp_min_c: -1.0,
            precipitation_probability_max: 20,
            snowfall_sum_cm: 0.0,
        };
        let err = ForecastDataset::new(vec![hour(0)], vec![day(25), day(24)]).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[test]
    fn compass_north_wraps_around() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(359.9), "N");
    }

    #[test]
    fn compass_boundary_22_5() {
        assert_eq!(compass_point(22.5), "NNE");
    }

    #[test]
    fn compass_cardinal_points() {
        assert_eq!(compass_point(90.0), "E");
        assert_eq!(compass_point(180.0), "S");
        assert_eq!(compass_point(270.0), "W");
    }

    #[test]
    fn display_name_falls_back_to_coordinates() {
        let named = Coordinate::named(35.6762, 139.6503, "Tokyo, Japan");
        assert_eq!(named.display_name(), "Tokyo, Japan");

        let bare = Coordinate::new(40.7128, -74.0060);
        assert_eq!(bare.display_name(), "40.7128, -74.0060");
    }
}
