use serde::Deserialize;

use super::search::{PlaceResult, PlacesClient, SearchStage};
use super::PlacesError;
use crate::config;
use crate::models::Coordinates;

/// Google Places Nearby Search client (HTTP, blocking).
pub struct GooglePlacesClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GooglePlacesClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    pub fn from_env() -> Result<Self, PlacesError> {
        let api_key = config::places_api_key()
            .ok_or_else(|| PlacesError::MissingApiKey(config::PLACES_API_KEY_ENV.into()))?;
        Ok(Self::new(
            config::PLACES_BASE_URL,
            &api_key,
            config::COMPLETION_TIMEOUT_SECS,
        ))
    }
}

#[derive(Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawPlace>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct RawPlace {
    place_id: Option<String>,
    name: Option<String>,
    vicinity: Option<String>,
    geometry: Option<RawGeometry>,
    rating: Option<f64>,
    #[serde(default)]
    types: Vec<String>,
    opening_hours: Option<RawOpeningHours>,
}

#[derive(Deserialize)]
struct RawGeometry {
    location: Option<RawLocation>,
}

#[derive(Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawOpeningHours {
    open_now: Option<bool>,
}

impl PlacesClient for GooglePlacesClient {
    fn nearby_search(
        &self,
        center: Coordinates,
        stage: SearchStage,
    ) -> Result<Vec<PlaceResult>, PlacesError> {
        let url = format!("{}/maps/api/place/nearbysearch/json", self.base_url);
        let location = format!("{},{}", center.latitude, center.longitude);
        let radius = stage.radius_meters.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("keyword", stage.keyword),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    PlacesError::Connection(self.base_url.clone())
                } else {
                    PlacesError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PlacesError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: NearbySearchResponse = response
            .json()
            .map_err(|e| PlacesError::ResponseParsing(e.to_string()))?;

        match parsed.status.as_str() {
            "OK" => Ok(parsed.results.into_iter().map(place_from_raw).collect()),
            "ZERO_RESULTS" => Ok(vec![]),
            other => Err(PlacesError::Rejected(match parsed.error_message {
                Some(msg) => format!("{other}: {msg}"),
                None => other.to_string(),
            })),
        }
    }
}

fn place_from_raw(raw: RawPlace) -> PlaceResult {
    PlaceResult {
        place_id: raw.place_id.unwrap_or_default(),
        name: raw.name,
        vicinity: raw.vicinity,
        location: raw
            .geometry
            .and_then(|g| g.location)
            .map(|l| Coordinates {
                latitude: l.lat,
                longitude: l.lng,
            }),
        rating: raw.rating,
        types: raw.types,
        open_now: raw.opening_hours.and_then(|h| h.open_now),
    }
}
