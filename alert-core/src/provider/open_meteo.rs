//! Forecast provider backed by the Open-Meteo API.
//!
//! Free, no API key required. The response maps timestamps to parallel
//! variable arrays; parsing zips them into records and rejects anything
//! that breaks the contract.
//!
//! API docs: <https://open-meteo.com/en/docs>

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{Coordinate, DailyRecord, ForecastDataset, HourlyRecord},
};

use super::{ForecastProvider, MAX_FORECAST_DAYS};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const HOURLY_VARIABLES: &str = "temperature_2m,apparent_temperature,relativehumidity_2m,\
windspeed_10m,winddirection_10m,precipitation_probability,snowfall";
const DAILY_VARIABLES: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_probability_max,snowfall_sum";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(FORECAST_URL)
    }

    /// Point the provider at a different endpoint. Used by tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { base_url: base_url.into(), http })
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn forecast(
        &self,
        coordinate: &Coordinate,
        days: u8,
    ) -> Result<ForecastDataset, FetchError> {
        let days = days.clamp(1, MAX_FORECAST_DAYS);

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coordinate.latitude.to_string()),
                ("longitude", coordinate.longitude.to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("daily", DAILY_VARIABLES.to_string()),
                ("forecast_days", days.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Provider { status, body: truncate_body(&body) });
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::malformed(format!("invalid forecast JSON: {e}")))?;

        let dataset = parse_forecast(parsed)?;
        if dataset.daily().len() < usize::from(days) {
            return Err(FetchError::malformed(format!(
                "response covers {} days, requested {days}",
                dataset.daily().len()
            )));
        }
        Ok(dataset)
    }
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    hourly: OmHourly,
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    apparent_temperature: Vec<Option<f64>>,
    relativehumidity_2m: Vec<Option<f64>>,
    windspeed_10m: Vec<Option<f64>>,
    winddirection_10m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
    snowfall: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    snowfall_sum: Vec<Option<f64>>,
}

fn parse_forecast(response: OmForecastResponse) -> Result<ForecastDataset, FetchError> {
    let hourly = parse_hourly(&response.hourly)?;
    let daily = parse_daily(&response.daily)?;
    ForecastDataset::new(hourly, daily)
}

fn parse_hourly(h: &OmHourly) -> Result<Vec<HourlyRecord>, FetchError> {
    let n = h.time.len();
    check_len("temperature_2m", h.temperature_2m.len(), n)?;
    check_len("apparent_temperature", h.apparent_temperature.len(), n)?;
    check_len("relativehumidity_2m", h.relativehumidity_2m.len(), n)?;
    check_len("windspeed_10m", h.windspeed_10m.len(), n)?;
    check_len("winddirection_10m", h.winddirection_10m.len(), n)?;
    check_len("precipitation_probability", h.precipitation_probability.len(), n)?;
    check_len("snowfall", h.snowfall.len(), n)?;

    let mut records = Vec::with_capacity(n);
    for i in 0..n {
        let at = &h.time[i];
        records.push(HourlyRecord {
            time: parse_hour_time(at)?,
            temperature_c: required("temperature_2m", h.temperature_2m[i], at)?,
            feels_like_c: required("apparent_temperature", h.apparent_temperature[i], at)?,
            humidity_pct: required("relativehumidity_2m", h.relativehumidity_2m[i], at)?.round()
                as u8,
            wind_speed_kmh: required("windspeed_10m", h.windspeed_10m[i], at)?,
            wind_direction_deg: required("winddirection_10m", h.winddirection_10m[i], at)?,
            // the provider emits null probability/snowfall past certain horizons
            precipitation_probability: h.precipitation_probability[i].unwrap_or(0.0).round() as u8,
            snowfall_cm: h.snowfall[i].unwrap_or(0.0),
        });
    }
    Ok(records)
}

fn parse_daily(d: &OmDaily) -> Result<Vec<DailyRecord>, FetchError> {
    let n = d.time.len();
    check_len("temperature_2m_max", d.temperature_2m_max.len(), n)?;
    check_len("temperature_2m_min", d.temperature_2m_min.len(), n)?;
    check_len("precipitation_probability_max", d.precipitation_probability_max.len(), n)?;
    check_len("snowfall_sum", d.snowfall_sum.len(), n)?;

    let mut records = Vec::with_capacity(n);
    for i in 0..n {
        let at = &d.time[i];
        records.push(DailyRecord {
            date: parse_day(at)?,
            temp_max_c: required("temperature_2m_max", d.temperature_2m_max[i], at)?,
            temp_min_c: required("temperature_2m_min", d.temperature_2m_min[i], at)?,
            precipitation_probability_max: d.precipitation_probability_max[i]
                .unwrap_or(0.0)
                .round() as u8,
            snowfall_sum_cm: d.snowfall_sum[i].unwrap_or(0.0),
        });
    }
    Ok(records)
}

fn check_len(name: &str, got: usize, want: usize) -> Result<(), FetchError> {
    if got != want {
        return Err(FetchError::malformed(format!(
            "variable array '{name}' has {got} entries, expected {want}"
        )));
    }
    Ok(())
}

fn required(name: &str, value: Option<f64>, at: &str) -> Result<f64, FetchError> {
    value.ok_or_else(|| FetchError::malformed(format!("missing {name} value at {at}")))
}

fn parse_hour_time(raw: &str) -> Result<NaiveDateTime, FetchError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map_err(|e| FetchError::malformed(format!("unparseable hourly timestamp '{raw}': {e}")))
}

fn parse_day(raw: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| FetchError::malformed(format!("unparseable daily date '{raw}': {e}")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(hours: usize) -> serde_json::Value {
        let times: Vec<String> =
            (0..hours).map(|i| format!("2026-02-24T{i:02}:00")).collect();
        json!({
            "hourly": {
                "time": times,
                "temperature_2m": vec![10.0; hours],
                "apparent_temperature": vec![9.0; hours],
                "relativehumidity_2m": vec![70.0; hours],
                "windspeed_10m": vec![5.0; hours],
                "winddirection_10m": vec![0.0; hours],
                "precipitation_probability": vec![0.0; hours],
                "snowfall": vec![0.0; hours],
            },
            "daily": {
                "time": ["2026-02-24", "2026-02-25"],
                "temperature_2m_max": [12.0, 11.0],
                "temperature_2m_min": [3.0, 2.0],
                "precipitation_probability_max": [40.0, 10.0],
                "snowfall_sum": [0.0, 1.5],
            }
        })
    }

    fn parse(value: serde_json::Value) -> Result<ForecastDataset, FetchError> {
        let response: OmForecastResponse = serde_json::from_value(value).unwrap();
        parse_forecast(response)
    }

    #[test]
    fn zips_parallel_arrays_into_records() {
        let dataset = parse(payload(3)).unwrap();
        assert_eq!(dataset.hourly().len(), 3);
        assert_eq!(dataset.daily().len(), 2);

        let first = &dataset.hourly()[0];
        assert_eq!(first.time.to_string(), "2026-02-24 00:00:00");
        assert_eq!(first.temperature_c, 10.0);
        assert_eq!(first.humidity_pct, 70);

        let day = &dataset.daily()[1];
        assert_eq!(day.snowfall_sum_cm, 1.5);
        assert_eq!(day.precipitation_probability_max, 10);
    }

    #[test]
    fn rejects_array_length_mismatch() {
        let mut value = payload(3);
        value["hourly"]["windspeed_10m"] = json!([5.0, 5.0]);
        let err = parse(value).unwrap_err();
        assert!(err.to_string().contains("windspeed_10m"));
    }

    #[test]
    fn rejects_missing_temperature_value() {
        let mut value = payload(3);
        value["hourly"]["temperature_2m"][1] = json!(null);
        let err = parse(value).unwrap_err();
        assert!(err.to_string().contains("temperature_2m"));
    }

    #[test]
    fn null_precipitation_defaults_to_zero() {
        let mut value = payload(2);
        value["hourly"]["precipitation_probability"][1] = json!(null);
        let dataset = parse(value).unwrap();
        assert_eq!(dataset.hourly()[1].precipitation_probability, 0);
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        let mut value = payload(2);
        value["hourly"]["time"][0] = json!("yesterday-ish");
        let err = parse(value).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_shuffled_timestamps() {
        let mut value = payload(3);
        value["hourly"]["time"] =
            json!(["2026-02-24T02:00", "2026-02-24T00:00", "2026-02-24T01:00"]);
        let err = parse(value).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_absent_required_variable() {
        let mut value = payload(2);
        value["hourly"].as_object_mut().unwrap().remove("apparent_temperature");
        let response: Result<OmForecastResponse, _> = serde_json::from_value(value);
        assert!(response.is_err());
    }
}
