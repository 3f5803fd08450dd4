//! Look up coordinates for a place name via the Open-Meteo geocoding API.
//!
//! Free, no API key required. Single best-match lookup: the first result
//! wins, there is no disambiguation.
//!
//! API docs: <https://open-meteo.com/en/docs/geocoding-api>

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{error::GeocodeError, model::Coordinate};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GeoResponse {
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    latitude: f64,
    longitude: f64,
    admin1: Option<String>,
    country: Option<String>,
}

pub async fn geocode(place: &str) -> Result<Coordinate, GeocodeError> {
    geocode_at(GEOCODING_URL, place).await
}

/// Same lookup against an explicit endpoint. Used by tests.
pub async fn geocode_at(base_url: &str, place: &str) -> Result<Coordinate, GeocodeError> {
    let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

    let res = http
        .get(base_url)
        .query(&[("name", place), ("count", "1"), ("language", "en"), ("format", "json")])
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        return Err(GeocodeError::Status(status));
    }

    let body: GeoResponse = res.json().await?;
    let mut results = body.results.unwrap_or_default();
    if results.is_empty() {
        return Err(GeocodeError::NotFound(place.to_string()));
    }
    let result = results.remove(0);

    Ok(Coordinate::named(result.latitude, result.longitude, canonical_name(&result)))
}

/// "City, Region, Country" — the admin1 region is included when available.
fn canonical_name(result: &GeoResult) -> String {
    let mut parts = vec![result.name.clone()];
    if let Some(admin1) = &result.admin1 {
        parts.push(admin1.clone());
    }
    if let Some(country) = &result.country {
        parts.push(country.clone());
    }
    parts.join(", ")
}
