//! Geolocation adapter - callback-style position providers as futures

use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::PositionError;

pub const IP_API_URL: &str = "http://ip-api.com/json";

/// Device coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

pub type OnPosition = Box<dyn FnOnce(Position)>;
pub type OnPositionError = Box<dyn FnOnce(PositionError)>;

/// A current-position API that reports through one of two callbacks.
///
/// Implementations call at most one of `on_success` / `on_error`, either
/// right away or later from a local task.
pub trait GeolocationProvider {
    fn is_supported(&self) -> bool {
        true
    }

    fn get_current_position(&self, on_success: OnPosition, on_error: OnPositionError);
}

/// Await the provider's answer.
///
/// Both callbacks share one single-fire channel, so only the first outcome is
/// kept. A provider that drops both callbacks resolves to
/// [`PositionError::PositionUnavailable`].
pub async fn current_position<G>(provider: &G) -> Result<Position, PositionError>
where
    G: GeolocationProvider + ?Sized,
{
    let (tx, rx) = oneshot::channel();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = Rc::clone(&tx);

    provider.get_current_position(
        Box::new(move |position| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Ok(position));
            }
        }),
        Box::new(move |err| {
            if let Some(tx) = error_tx.borrow_mut().take() {
                let _ = tx.send(Err(err));
            }
        }),
    );

    rx.await.unwrap_or_else(|_| {
        Err(PositionError::PositionUnavailable(
            "position request ended without an answer".into(),
        ))
    })
}

/// Host without geolocation capability
#[derive(Clone, Copy, Debug, Default)]
pub struct Unsupported;

impl GeolocationProvider for Unsupported {
    fn is_supported(&self) -> bool {
        false
    }

    fn get_current_position(&self, _on_success: OnPosition, on_error: OnPositionError) {
        on_error(PositionError::PositionUnavailable(
            "geolocation is unavailable".into(),
        ));
    }
}

/// Always reports the configured coordinates
#[derive(Clone, Copy, Debug)]
pub struct FixedPosition(pub Position);

impl GeolocationProvider for FixedPosition {
    fn get_current_position(&self, on_success: OnPosition, _on_error: OnPositionError) {
        on_success(self.0);
    }
}

#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

fn position_from_lookup(lookup: IpLookup) -> Result<Position, PositionError> {
    match (lookup.status.as_str(), lookup.lat, lookup.lon) {
        ("success", Some(latitude), Some(longitude)) => Ok(Position {
            latitude,
            longitude,
        }),
        _ => Err(PositionError::PositionUnavailable(
            lookup
                .message
                .unwrap_or_else(|| format!("lookup status: {}", lookup.status)),
        )),
    }
}

/// Approximate position from an ip-api compatible lookup service
#[derive(Clone, Debug)]
pub struct IpGeolocation {
    client: reqwest::Client,
    url: String,
}

impl IpGeolocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Default for IpGeolocation {
    fn default() -> Self {
        Self::new(IP_API_URL)
    }
}

impl GeolocationProvider for IpGeolocation {
    /// # Panics
    ///
    /// Must be called from within a `tokio::task::LocalSet`.
    fn get_current_position(&self, on_success: OnPosition, on_error: OnPositionError) {
        debug!(url = %self.url, "requesting position");
        let request = self.client.get(&self.url).send();
        tokio::task::spawn_local(async move {
            let lookup = match request.await {
                Ok(response) => response.json::<IpLookup>().await,
                Err(err) => Err(err),
            };
            match lookup
                .map_err(|e| PositionError::PositionUnavailable(e.to_string()))
                .and_then(position_from_lookup)
            {
                Ok(position) => on_success(position),
                Err(err) => on_error(err),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const HERE: Position = Position {
        latitude: 64.1,
        longitude: -21.9,
    };

    struct Denied;

    impl GeolocationProvider for Denied {
        fn get_current_position(&self, _on_success: OnPosition, on_error: OnPositionError) {
            on_error(PositionError::PermissionDenied);
        }
    }

    struct Silent;

    impl GeolocationProvider for Silent {
        fn get_current_position(&self, _on_success: OnPosition, _on_error: OnPositionError) {}
    }

    struct Delayed;

    impl GeolocationProvider for Delayed {
        fn get_current_position(&self, on_success: OnPosition, _on_error: OnPositionError) {
            tokio::task::spawn_local(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                on_success(HERE);
            });
        }
    }

    #[tokio::test]
    async fn test_success_callback_resolves() {
        assert_eq!(current_position(&FixedPosition(HERE)).await, Ok(HERE));
    }

    #[tokio::test]
    async fn test_error_callback_resolves() {
        assert_eq!(
            current_position(&Denied).await,
            Err(PositionError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn test_dropped_callbacks_resolve_unavailable() {
        assert!(matches!(
            current_position(&Silent).await,
            Err(PositionError::PositionUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_deferred_callback_resolves() {
        let local = tokio::task::LocalSet::new();
        let position = local.run_until(current_position(&Delayed)).await;
        assert_eq!(position, Ok(HERE));
    }

    #[test]
    fn test_ip_lookup_parsing() {
        let ok: IpLookup =
            serde_json::from_str(r#"{"status":"success","lat":64.13,"lon":-21.82}"#).unwrap();
        assert_eq!(
            position_from_lookup(ok),
            Ok(Position {
                latitude: 64.13,
                longitude: -21.82
            })
        );

        let failed: IpLookup =
            serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();
        assert_eq!(
            position_from_lookup(failed),
            Err(PositionError::PositionUnavailable("private range".into()))
        );
    }

    #[test]
    fn test_unsupported_provider() {
        assert!(!Unsupported.is_supported());
        assert!(FixedPosition(HERE).is_supported());
    }
}
