//! `RoutesClient` against a local mock of the Routes API.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{jakarta, routes_client, shops_south_of_jakarta, RoadResponder, ROUTES_PATH};
use tambalin::entities::Coordinates;
use tambalin::external::google_maps::{RouteError, RoutesClient};
use tambalin::geo::sort_by_distance;

async fn respond_once_with(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(ROUTES_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn compute_route_converts_units() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ROUTES_PATH))
        .and(header("X-Goog-Api-Key", "test-key"))
        .and(headers(
            "X-Goog-FieldMask",
            vec!["routes.distanceMeters", "routes.duration"],
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{ "distanceMeters": 1534, "duration": "61s" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = routes_client(&server.uri());
    let summary = client
        .compute_route(jakarta(), Coordinates::new(-6.2145, 106.8567), "test-key")
        .await
        .unwrap();

    assert_eq!(summary.distance_km, 1.53);
    assert_eq!(summary.duration_minutes, 2);
}

#[tokio::test]
async fn compute_route_keeps_whole_minutes() {
    let server = MockServer::start().await;
    respond_once_with(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{ "distanceMeters": 2000, "duration": "120s" }]
        })),
    )
    .await;

    let summary = routes_client(&server.uri())
        .compute_route(jakarta(), Coordinates::new(-6.22, 106.85), "key")
        .await
        .unwrap();

    assert_eq!(summary.distance_km, 2.0);
    assert_eq!(summary.duration_minutes, 2);
}

#[tokio::test]
async fn compute_route_without_routes_is_no_route() {
    let server = MockServer::start().await;
    respond_once_with(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let err = routes_client(&server.uri())
        .compute_route(jakarta(), Coordinates::new(-6.22, 106.85), "key")
        .await
        .unwrap_err();

    assert!(matches!(err, RouteError::NoRoute), "got {:?}", err);
}

#[tokio::test]
async fn compute_route_reports_provider_status() {
    let server = MockServer::start().await;
    respond_once_with(&server, ResponseTemplate::new(403)).await;

    let err = routes_client(&server.uri())
        .compute_route(jakarta(), Coordinates::new(-6.22, 106.85), "bad-key")
        .await
        .unwrap_err();

    assert!(matches!(err, RouteError::Status(403)), "got {:?}", err);
}

#[tokio::test]
async fn enrich_routes_rejects_missing_credential_before_any_request() {
    let server = MockServer::start().await;
    respond_once_with(&server, ResponseTemplate::new(200)).await;

    let candidates = sort_by_distance(jakarta(), shops_south_of_jakarta(3));
    let err = routes_client(&server.uri())
        .enrich_routes(jakarta(), candidates, "", 10)
        .await
        .unwrap_err();

    assert_eq!(err.code, 104);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn enrich_routes_only_looks_up_the_first_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ROUTES_PATH))
        .respond_with(RoadResponder::new())
        .expect(3)
        .mount(&server)
        .await;

    let candidates = sort_by_distance(jakarta(), shops_south_of_jakarta(5));
    let ranked = routes_client(&server.uri())
        .enrich_routes(jakarta(), candidates, "key", 3)
        .await
        .unwrap();

    let names: Vec<&str> = ranked.iter().map(|r| r.shop().name.as_str()).collect();
    assert_eq!(names, vec!["Bengkel 1", "Bengkel 2", "Bengkel 3"]);
    assert!(ranked.iter().all(|r| r.road_duration_minutes > 0));
}

#[tokio::test]
async fn enrich_routes_falls_back_per_candidate_and_sorts_by_road_distance() {
    let server = MockServer::start().await;
    let shops = shops_south_of_jakarta(7);
    let failing = shops
        .iter()
        .find(|shop| shop.name == "Bengkel 6")
        .map(|shop| shop.coordinates)
        .unwrap();

    Mock::given(method("POST"))
        .and(path(ROUTES_PATH))
        .respond_with(RoadResponder::failing(vec![failing]))
        .mount(&server)
        .await;

    let client = routes_client(&server.uri());
    let candidates = sort_by_distance(jakarta(), shops);
    let enrichments = client
        .compute_routes(jakarta(), candidates.clone(), "key", 10)
        .await
        .unwrap();

    assert_eq!(enrichments.len(), 7);
    let fallbacks: Vec<&str> = enrichments
        .iter()
        .filter(|e| e.is_fallback())
        .map(|e| e.ranked().shop().name.as_str())
        .collect();
    assert_eq!(fallbacks, vec!["Bengkel 6"]);

    let ranked = client
        .enrich_routes(jakarta(), candidates, "key", 10)
        .await
        .unwrap();

    assert_eq!(ranked.len(), 7);
    assert!(ranked
        .windows(2)
        .all(|pair| pair[0].road_distance_km <= pair[1].road_distance_km));

    let degraded = ranked.iter().find(|r| r.shop().name == "Bengkel 6").unwrap();
    assert_eq!(degraded.road_duration_minutes, 0);
    assert_eq!(
        Some(degraded.road_distance_km),
        degraded.candidate.straight_line_distance_km
    );

    // 6.67 km straight-line beats Bengkel 5's 6.95 km by road
    let names: Vec<&str> = ranked.iter().map(|r| r.shop().name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Bengkel 1", "Bengkel 2", "Bengkel 3", "Bengkel 4", "Bengkel 6", "Bengkel 5",
            "Bengkel 7"
        ]
    );
}

#[tokio::test]
async fn slow_provider_times_out_into_fallback() {
    let server = MockServer::start().await;
    respond_once_with(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "routes": [{ "distanceMeters": 10, "duration": "1s" }] }))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let client = RoutesClient::new(server.uri(), Duration::from_millis(200)).unwrap();
    let candidates = sort_by_distance(jakarta(), shops_south_of_jakarta(2));
    let ranked = client
        .enrich_routes(jakarta(), candidates, "key", 10)
        .await
        .unwrap();

    assert_eq!(ranked.len(), 2);
    for r in &ranked {
        assert_eq!(r.road_duration_minutes, 0);
        assert_eq!(Some(r.road_distance_km), r.candidate.straight_line_distance_km);
    }
}
