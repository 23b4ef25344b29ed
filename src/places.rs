//! Destination search.

use serde::Serialize;

use crate::error::NavError;
use crate::types::Location;

#[allow(async_fn_in_trait)]
pub trait PlaceService {
    /// Ranked candidates for a non-empty query, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Location>, NavError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSearch {
    pub candidates: Vec<Location>,
    /// The service failed and these are sample suggestions.
    pub is_fallback: bool,
}

/// Search for destinations. A blank query returns nothing without calling the service;
/// a failed search returns sample suggestions.
pub async fn search_places<S: PlaceService>(service: &S, query: &str, limit: usize) -> PlaceSearch {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return PlaceSearch {
            candidates: Vec::new(),
            is_fallback: false,
        };
    }
    match service.search(query, limit).await {
        Ok(mut candidates) => {
            candidates.truncate(limit);
            PlaceSearch {
                candidates,
                is_fallback: false,
            }
        }
        Err(e) => {
            log::warn!("{e}; offering sample places");
            let mut candidates = fallback_suggestions(query);
            candidates.truncate(limit);
            PlaceSearch {
                candidates,
                is_fallback: true,
            }
        }
    }
}

/// Fixed Lagos suggestions labelled with the query.
pub fn fallback_suggestions(query: &str) -> Vec<Location> {
    [
        ("Lagos Island", 6.4541, 3.3947),
        ("Yaba", 6.5095, 3.3711),
        ("Ikeja", 6.6018, 3.3515),
    ]
    .into_iter()
    .map(|(area, lat, lng)| Location::new(lat, lng).with_address(format!("{query} - {area}")))
    .collect()
}

#[cfg(feature = "http")]
pub use http::HttpPlaceService;

#[cfg(feature = "http")]
mod http {
    use reqwest::{Client, Url};
    use serde::Deserialize;
    use serde::de::DeserializeOwned;

    use super::PlaceService;
    use crate::error::NavError;
    use crate::options::ServiceEndpoints;
    use crate::types::Location;

    /// Autocomplete, then a details lookup per prediction for its coordinates.
    pub struct HttpPlaceService {
        client: Client,
        endpoints: ServiceEndpoints,
    }

    #[derive(Deserialize)]
    struct Autocomplete {
        status: String,
        #[serde(default)]
        predictions: Vec<Prediction>,
    }

    #[derive(Deserialize)]
    struct Prediction {
        place_id: String,
    }

    #[derive(Deserialize)]
    struct Details {
        result: DetailsResult,
    }

    #[derive(Deserialize)]
    struct DetailsResult {
        geometry: Geometry,
        #[serde(default)]
        formatted_address: Option<String>,
        #[serde(default)]
        name: Option<String>,
    }

    #[derive(Deserialize)]
    struct Geometry {
        location: crate::upstream::LatLng,
    }

    impl Details {
        fn into_location(self) -> Location {
            Location {
                lat: self.result.geometry.location.lat,
                lng: self.result.geometry.location.lng,
                address: self.result.formatted_address,
                name: self.result.name,
            }
        }
    }

    fn failed(reason: impl std::fmt::Display) -> NavError {
        NavError::PlaceSearchFailed {
            reason: reason.to_string(),
        }
    }

    impl HttpPlaceService {
        pub fn new(endpoints: ServiceEndpoints) -> Self {
            Self {
                client: Client::new(),
                endpoints,
            }
        }

        async fn get_json<T: DeserializeOwned>(
            &self,
            endpoint: &str,
            params: &[(&str, &str)],
        ) -> Result<T, NavError> {
            let url = Url::parse_with_params(endpoint, params).map_err(failed)?;
            let response = self.client.get(url).send().await.map_err(failed)?;
            if !response.status().is_success() {
                return Err(failed(format!("HTTP error! status: {}", response.status())));
            }
            response.json().await.map_err(failed)
        }
    }

    impl PlaceService for HttpPlaceService {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<Location>, NavError> {
            let key = self.endpoints.api_key.as_str();
            let autocomplete: Autocomplete = self
                .get_json(
                    &self.endpoints.place_autocomplete,
                    &[("input", query), ("key", key)],
                )
                .await?;
            match autocomplete.status.as_str() {
                "OK" => {}
                "ZERO_RESULTS" => return Ok(Vec::new()),
                other => return Err(failed(other)),
            }

            let mut places = Vec::new();
            for prediction in autocomplete.predictions.iter().take(limit) {
                let details: Details = self
                    .get_json(
                        &self.endpoints.place_details,
                        &[
                            ("place_id", prediction.place_id.as_str()),
                            ("fields", "geometry,formatted_address,name"),
                            ("key", key),
                        ],
                    )
                    .await?;
                places.push(details.into_location());
            }
            Ok(places)
        }
    }

}
