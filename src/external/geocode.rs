//! Reverse geocoding for shared locations.
//!
//! When the geocoder fails the dispatcher falls back to storing the raw
//! coordinates as the address, so a flaky service never blocks checkout.

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::error::CollaboratorError;

/// Turns coordinates into a human-readable address.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<String, CollaboratorError>;
}

/// Format coordinates as a fallback address string.
pub fn coords_fallback(lat: f64, lon: f64) -> String {
    format!("📍 {lat:.6}, {lon:.6}")
}

/// Yandex Geocoder HTTP API.
pub struct YandexGeocoder {
    api_key: secrecy::SecretString,
    client: reqwest::Client,
}

impl YandexGeocoder {
    pub fn new(api_key: secrecy::SecretString) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Geocoder for YandexGeocoder {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<String, CollaboratorError> {
        let resp = self
            .client
            .get("https://geocode-maps.yandex.ru/1.x/")
            .query(&[
                ("apikey", self.api_key.expose_secret()),
                ("geocode", &format!("{lon},{lat}")),
                ("format", "json"),
                ("results", "1"),
                ("lang", "ru_RU"),
            ])
            .send()
            .await
            .map_err(|e| CollaboratorError::Geocode(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CollaboratorError::Geocode(format!(
                "API returned {}",
                resp.status()
            )));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::Geocode(e.to_string()))?;

        data.pointer(
            "/response/GeoObjectCollection/featureMember/0/GeoObject/metaDataProperty/GeocoderMetaData/text",
        )
        .and_then(serde_json::Value::as_str)
        .map(String::from)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CollaboratorError::Geocode("no address in response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_fallback_is_stable() {
        assert_eq!(coords_fallback(55.751244, 37.618423), "📍 55.751244, 37.618423");
        assert_eq!(coords_fallback(0.0, 0.0), "📍 0.000000, 0.000000");
    }
}
