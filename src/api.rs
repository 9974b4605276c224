//! Open-Meteo forecast client

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::search::ForecastSource;
use crate::state::ForecastPoint;

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// API response from Open-Meteo
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<HourlyData>,
}

#[derive(Debug, Deserialize)]
struct HourlyData {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
}

impl HourlyData {
    fn into_points(self) -> Vec<ForecastPoint> {
        let HourlyData {
            time,
            temperature_2m,
            precipitation,
        } = self;
        time.into_iter()
            .enumerate()
            .map(|(i, time)| ForecastPoint {
                time,
                temperature: temperature_2m.get(i).copied().flatten(),
                precipitation: precipitation.get(i).copied().flatten(),
            })
            .collect()
    }
}

/// Decode an Open-Meteo body. A body without an `hourly` block yields `None`.
pub fn parse_forecast(body: &str) -> Result<Option<Vec<ForecastPoint>>, FetchError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(response.hourly.map(HourlyData::into_points))
}

/// Hourly temperature and precipitation from Open-Meteo
#[derive(Clone, Debug)]
pub struct OpenMeteo {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteo {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn forecast_url(&self, lat: f64, lng: f64) -> String {
        format!(
            "{}?latitude={}&longitude={}&hourly=temperature_2m,precipitation&timezone=auto&forecast_days=1",
            self.base_url, lat, lng
        )
    }
}

impl Default for OpenMeteo {
    fn default() -> Self {
        Self::new(OPEN_METEO_URL)
    }
}

#[async_trait(?Send)]
impl ForecastSource for OpenMeteo {
    async fn fetch_forecast(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Option<Vec<ForecastPoint>>, FetchError> {
        let url = self.forecast_url(lat, lng);
        debug!(%url, "requesting forecast");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_forecast(&body)
    }
}
