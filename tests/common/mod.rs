#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{Request, Respond, ResponseTemplate};

use tambalin::entities::{Coordinates, Shop};
use tambalin::external::google_maps::RoutesClient;
use tambalin::geo::distance_km;

pub const ROUTES_PATH: &str = "/directions/v2:computeRoutes";

pub fn jakarta() -> Coordinates {
    Coordinates::new(-6.2088, 106.8456)
}

/// `count` shops due south of Jakarta, 0.01 degrees (about 1.1 km) apart,
/// listed farthest first.
pub fn shops_south_of_jakarta(count: usize) -> Vec<Shop> {
    (1..=count)
        .rev()
        .map(|i| {
            Shop::new(
                format!("Bengkel {}", i),
                "",
                Coordinates::new(jakarta().latitude - 0.01 * i as f64, jakarta().longitude),
                format!("62812000{:04}", i),
            )
        })
        .collect()
}

pub fn routes_client(base_url: &str) -> RoutesClient {
    RoutesClient::new(base_url, Duration::from_secs(2)).expect("failed to build routes client")
}

fn waypoint(body: &Value, key: &str) -> Option<Coordinates> {
    let lat_lng = &body[key]["location"]["latLng"];
    Some(Coordinates::new(
        lat_lng["latitude"].as_f64()?,
        lat_lng["longitude"].as_f64()?,
    ))
}

/// Answers route requests with a road distance of 1.25x the straight-line
/// distance at 10 m/s, or a 500 for destinations listed in `failing`.
pub struct RoadResponder {
    pub failing: Vec<Coordinates>,
}

impl RoadResponder {
    pub fn new() -> Self {
        Self { failing: vec![] }
    }

    pub fn failing(failing: Vec<Coordinates>) -> Self {
        Self { failing }
    }
}

impl Respond for RoadResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };

        let origin = waypoint(&body, "origin");
        let destination = waypoint(&body, "destination");
        let (origin, destination) = match (origin, destination) {
            (Some(origin), Some(destination)) => (origin, destination),
            _ => return ResponseTemplate::new(400),
        };

        if self.failing.contains(&destination) {
            return ResponseTemplate::new(500);
        }

        let meters = (distance_km(origin, destination) * 1250.0).round() as u64;
        let seconds = meters / 10;

        ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{ "distanceMeters": meters, "duration": format!("{}s", seconds) }]
        }))
    }
}
