use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entities::{Candidate, Coordinates, RankedCandidate},
    error::{missing_credential_error, Error},
    geo::round2,
};

const COMPUTE_ROUTES_PATH: &str = "/directions/v2:computeRoutes";
const FIELD_MASK: &str = "routes.distanceMeters,routes.duration";

/// Why a single route lookup did not produce a usable route.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("routing request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("routing provider responded with status {0}")]
    Status(u16),

    #[error("no route found")]
    NoRoute,

    #[error("malformed route duration {0:?}")]
    InvalidDuration(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_minutes: u32,
}

/// Per-candidate result of a route lookup.
#[derive(Debug)]
pub enum Enrichment {
    Routed(RankedCandidate),
    Fallback {
        ranked: RankedCandidate,
        reason: RouteError,
    },
}

impl Enrichment {
    pub fn ranked(&self) -> &RankedCandidate {
        match self {
            Self::Routed(ranked) | Self::Fallback { ranked, .. } => ranked,
        }
    }

    pub fn into_ranked(self) -> RankedCandidate {
        match self {
            Self::Routed(ranked) | Self::Fallback { ranked, .. } => ranked,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeRoutesRequest {
    origin: Waypoint,
    destination: Waypoint,
    travel_mode: &'static str,
    routing_preference: &'static str,
    compute_alternative_routes: bool,
    language_code: &'static str,
    units: &'static str,
}

#[derive(Serialize)]
struct Waypoint {
    location: WaypointLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WaypointLocation {
    lat_lng: LatLng,
}

#[derive(Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl From<Coordinates> for Waypoint {
    fn from(coordinates: Coordinates) -> Self {
        Self {
            location: WaypointLocation {
                lat_lng: LatLng {
                    latitude: coordinates.latitude,
                    longitude: coordinates.longitude,
                },
            },
        }
    }
}

#[derive(Deserialize)]
struct ComputeRoutesResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

// zero-valued fields are omitted by the provider
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Route {
    #[serde(default)]
    distance_meters: u64,
    #[serde(default)]
    duration: Option<String>,
}

/// Client for the Google Routes `computeRoutes` endpoint.
#[derive(Clone, Debug)]
pub struct RoutesClient {
    http: reqwest::Client,
    base_url: String,
}

impl RoutesClient {
    /// `timeout` bounds every individual route request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    #[tracing::instrument(skip(self, api_key))]
    pub async fn compute_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
        api_key: &str,
    ) -> Result<RouteSummary, RouteError> {
        let body = ComputeRoutesRequest {
            origin: origin.into(),
            destination: destination.into(),
            travel_mode: "DRIVE",
            routing_preference: "TRAFFIC_AWARE",
            compute_alternative_routes: false,
            language_code: "id-ID",
            units: "METRIC",
        };

        let res = self
            .http
            .post(format!("{}{}", self.base_url, COMPUTE_ROUTES_PATH))
            .header("X-Goog-Api-Key", api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(RouteError::Status(status.as_u16()));
        }

        let data: ComputeRoutesResponse = res.json().await?;
        let route = data.routes.into_iter().next().ok_or(RouteError::NoRoute)?;

        let duration = route.duration.unwrap_or_else(|| "0s".into());
        let seconds = parse_duration_secs(&duration)?;

        Ok(RouteSummary {
            distance_km: round2(route.distance_meters as f64 / 1000.0),
            duration_minutes: (seconds / 60.0).ceil() as u32,
        })
    }

    /// Looks up routes for the first `limit` candidates concurrently, keeping
    /// input order. A failed lookup becomes a straight-line fallback item.
    pub async fn compute_routes(
        &self,
        origin: Coordinates,
        candidates: Vec<Candidate>,
        credential: &str,
        limit: usize,
    ) -> Result<Vec<Enrichment>, Error> {
        if credential.trim().is_empty() {
            return Err(missing_credential_error());
        }

        let lookups = candidates.into_iter().take(limit).map(|candidate| async move {
            let destination = candidate.shop.coordinates;

            match self.compute_route(origin, destination, credential).await {
                Ok(summary) => Enrichment::Routed(RankedCandidate::routed(
                    candidate,
                    summary.distance_km,
                    summary.duration_minutes,
                )),
                Err(reason) => Enrichment::Fallback {
                    ranked: RankedCandidate::straight_line(candidate),
                    reason,
                },
            }
        });

        Ok(join_all(lookups).await)
    }

    /// [`compute_routes`](Self::compute_routes), flattened and sorted by road distance.
    #[tracing::instrument(
        skip(self, candidates, credential),
        fields(candidates = candidates.len())
    )]
    pub async fn enrich_routes(
        &self,
        origin: Coordinates,
        candidates: Vec<Candidate>,
        credential: &str,
        limit: usize,
    ) -> Result<Vec<RankedCandidate>, Error> {
        let enrichments = self
            .compute_routes(origin, candidates, credential, limit)
            .await?;

        let mut ranked: Vec<RankedCandidate> = enrichments
            .into_iter()
            .map(|enrichment| {
                if let Enrichment::Fallback { ranked, reason } = &enrichment {
                    tracing::warn!(
                        shop_id = %ranked.shop().id,
                        error = %reason,
                        "route lookup failed, using straight-line distance"
                    );
                }
                enrichment.into_ranked()
            })
            .collect();

        sort_by_road_distance(&mut ranked);
        Ok(ranked)
    }
}

/// Stable ascending sort on road distance.
pub fn sort_by_road_distance(ranked: &mut [RankedCandidate]) {
    ranked.sort_by(|a, b| a.road_distance_km.total_cmp(&b.road_distance_km));
}

/// Parses a provider duration such as `"1234s"` into seconds.
fn parse_duration_secs(duration: &str) -> Result<f64, RouteError> {
    duration
        .trim()
        .strip_suffix('s')
        .and_then(|secs| secs.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .ok_or_else(|| RouteError::InvalidDuration(duration.to_owned()))
}
