use serde::{Deserialize, Serialize};

use crate::entities::Shop;

/// A shop considered by a ranking, with its straight-line distance once computed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub shop: Shop,
    #[serde(rename = "distance", default, skip_serializing_if = "Option::is_none")]
    pub straight_line_distance_km: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(rename = "route_distance")]
    pub road_distance_km: f64,
    #[serde(rename = "route_duration")]
    pub road_duration_minutes: u32,
}

impl From<Shop> for Candidate {
    fn from(shop: Shop) -> Self {
        Self {
            shop,
            straight_line_distance_km: None,
        }
    }
}

impl Candidate {
    pub fn distance_or_zero(&self) -> f64 {
        self.straight_line_distance_km.unwrap_or(0.0)
    }
}

impl RankedCandidate {
    /// Road distance falls back to the straight-line distance, duration to zero.
    pub fn straight_line(candidate: Candidate) -> Self {
        Self {
            road_distance_km: candidate.distance_or_zero(),
            road_duration_minutes: 0,
            candidate,
        }
    }

    pub fn routed(
        candidate: Candidate,
        road_distance_km: f64,
        road_duration_minutes: u32,
    ) -> Self {
        Self {
            candidate,
            road_distance_km,
            road_duration_minutes,
        }
    }

    pub fn shop(&self) -> &Shop {
        &self.candidate.shop
    }
}
