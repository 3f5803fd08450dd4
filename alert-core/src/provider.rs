use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{Coordinate, ForecastDataset},
};

pub mod open_meteo;

/// The longest forecast horizon the provider will serve.
pub const MAX_FORECAST_DAYS: u8 = 16;

/// A single-attempt forecast source.
///
/// Implementations hold no state across calls and are safe to call
/// repeatedly; bounded retries live in [`crate::fetch::Fetcher`].
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Fetch hourly + daily forecast data for a coordinate, covering
    /// `days` days (clamped to [`MAX_FORECAST_DAYS`]).
    async fn forecast(
        &self,
        coordinate: &Coordinate,
        days: u8,
    ) -> Result<ForecastDataset, FetchError>;
}
