//! Search controller - loading, fetch, then results or error

use std::rc::Rc;

use async_trait::async_trait;
use tracing::info;

use crate::error::{FetchError, SearchError};
use crate::geolocation::{current_position, GeolocationProvider};
use crate::state::{ForecastPoint, Location};
use crate::view::View;

/// Where forecasts come from. `Ok(None)` means the source had nothing to say.
#[async_trait(?Send)]
pub trait ForecastSource {
    async fn fetch_forecast(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Option<Vec<ForecastPoint>>, FetchError>;
}

/// Drives the view through a search.
///
/// Searches are independent: overlapping calls are not sequenced, and
/// whichever finishes last owns the output region.
pub struct SearchController {
    source: Rc<dyn ForecastSource>,
    view: Rc<dyn View>,
    geolocation: Rc<dyn GeolocationProvider>,
}

impl SearchController {
    pub fn new(
        source: Rc<dyn ForecastSource>,
        view: Rc<dyn View>,
        geolocation: Rc<dyn GeolocationProvider>,
    ) -> Self {
        Self {
            source,
            view,
            geolocation,
        }
    }

    pub async fn search(&self, location: Location) {
        self.view.show_loading();
        info!(title = %location.title, lat = location.lat, lng = location.lng, "searching forecast");

        match self
            .source
            .fetch_forecast(location.lat, location.lng)
            .await
        {
            Ok(points) => self
                .view
                .show_results(&location, &points.unwrap_or_default()),
            Err(err) => self.view.show_error(&SearchError::Fetch(err)),
        }
    }

    /// Search the device's own position. Geolocation failures skip the
    /// loading view and go straight to the error view.
    pub async fn search_current_location(&self) {
        if !self.geolocation.is_supported() {
            self.view.show_error(&SearchError::GeolocationUnsupported);
            return;
        }

        match current_position(self.geolocation.as_ref()).await {
            Ok(position) => {
                self.search(Location::current(position.latitude, position.longitude))
                    .await
            }
            Err(err) => self.view.show_error(&SearchError::Geolocation(err)),
        }
    }
}
