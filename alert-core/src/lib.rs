//! Core library for the `weather-alert` CLI.
//!
//! This crate defines:
//! - The forecast data model and its invariants
//! - The Open-Meteo provider and the retrying fetcher on top of it
//! - Window selection over a fetched dataset
//! - The alert-rule evaluation engine
//! - Configuration handling and geocoding lookup
//!
//! It is used by `alert-cli`, but can also be reused by other binaries or
//! services.

pub mod config;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod model;
pub mod provider;
pub mod rules;
pub mod window;

pub use config::Config;
pub use error::{FetchError, GeocodeError, SelectError};
pub use fetch::{Fetcher, RetryPolicy};
pub use model::{Coordinate, DailyRecord, ForecastDataset, HourlyRecord};
pub use provider::{ForecastProvider, open_meteo::OpenMeteoProvider};
pub use rules::{AlertRule, RuleKind, RuleResult, evaluate};
pub use window::{WindowMode, WindowView, select_window};
