//! Error taxonomy for forecast searches

/// Forecast fetch failure
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("{0}")]
    Request(String),
    #[error("forecast service responded with status {0}")]
    Status(u16),
    #[error("could not read forecast: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

/// Failure reported by a geolocation provider
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PositionError {
    #[error("User denied Geolocation")]
    PermissionDenied,
    #[error("{0}")]
    PositionUnavailable(String),
    #[error("Timeout expired")]
    Timeout,
}

/// Anything that ends a search in the error view
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Geolocation(#[from] PositionError),
    #[error("Geolocation is not supported by this browser.")]
    GeolocationUnsupported,
}
