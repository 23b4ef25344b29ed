//! Route services.
//!
//! A [`RouteService`] performs a [`RouteRequest`] and returns the upstream payload. The
//! navigator is never borrowed across the request: issue a request, run it, and hand the
//! result back with [`Navigator::complete_route`]. Meanwhile the session stays usable.
//!
//! [`Navigator::complete_route`]: crate::navigation::Navigator::complete_route

use crate::error::NavError;
use crate::navigation::RouteRequest;
use crate::types::TravelMode;
use crate::upstream::{RoutePayload, parse_payload};

#[allow(async_fn_in_trait)]
pub trait RouteService {
    async fn fetch_route(&self, request: &RouteRequest) -> Result<RoutePayload, NavError>;
}

/// Interpret an HTTP response for a route request of the given mode.
pub fn payload_from_response(mode: TravelMode, status: u16, body: &str) -> Result<RoutePayload, NavError> {
    if !(200..300).contains(&status) {
        return Err(NavError::request_failed(format!("HTTP error! status: {status}")));
    }
    parse_payload(mode, body)
}

#[cfg(feature = "http")]
pub use http::HttpRouteService;

#[cfg(feature = "http")]
mod http {
    use reqwest::{Client, Url};

    use super::{RouteService, payload_from_response};
    use crate::error::NavError;
    use crate::navigation::RouteRequest;
    use crate::options::ServiceEndpoints;
    use crate::types::TravelMode;
    use crate::upstream::RoutePayload;

    /// Directions over GET, transit routes over POST with a JSON body.
    pub struct HttpRouteService {
        client: Client,
        endpoints: ServiceEndpoints,
    }

    impl HttpRouteService {
        pub fn new(endpoints: ServiceEndpoints) -> Self {
            Self {
                client: Client::new(),
                endpoints,
            }
        }

        pub fn directions_url(&self, request: &RouteRequest) -> Result<Url, NavError> {
            Url::parse_with_params(
                &self.endpoints.directions,
                &[
                    ("origin", request.origin.to_query_pair()),
                    ("destination", request.destination.to_query_pair()),
                    ("key", self.endpoints.api_key.clone()),
                    ("alternatives", "false".to_string()),
                ],
            )
            .map_err(|e| NavError::request_failed(format!("bad directions endpoint: {e}")))
        }
    }

    impl RouteService for HttpRouteService {
        async fn fetch_route(&self, request: &RouteRequest) -> Result<RoutePayload, NavError> {
            let mode = request.ticket.mode;
            let response = match mode {
                TravelMode::Driving => self.client.get(self.directions_url(request)?).send().await?,
                TravelMode::Transit => {
                    if self.endpoints.transit.is_empty() {
                        return Err(NavError::request_failed("no transit endpoint configured"));
                    }
                    self.client
                        .post(&self.endpoints.transit)
                        .json(&request.transit_query())
                        .send()
                        .await?
                }
            };
            let status = response.status().as_u16();
            let body = response.text().await?;
            payload_from_response(mode, status, &body)
        }
    }

}
