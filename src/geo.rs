//! Straight-line distance between coordinates and distance ordering of shops.

use crate::entities::{Candidate, Coordinates};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle (haversine) distance in kilometers, rounded to 2 decimals.
///
/// Both coordinates must already be valid, see [`Coordinates::is_valid`].
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    round2(EARTH_RADIUS_KM * c)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sets the straight-line distance of every candidate from `origin` and orders
/// them nearest first. Equal distances keep their input order.
pub fn sort_by_distance<I, C>(origin: Coordinates, candidates: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = C>,
    C: Into<Candidate>,
{
    let mut sorted: Vec<Candidate> = candidates
        .into_iter()
        .map(Into::into)
        .map(|mut candidate: Candidate| {
            candidate.straight_line_distance_km =
                Some(distance_km(origin, candidate.shop.coordinates));
            candidate
        })
        .collect();

    sorted.sort_by(|a, b| a.distance_or_zero().total_cmp(&b.distance_or_zero()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Shop;

    fn jakarta() -> Coordinates {
        Coordinates::new(-6.2088, 106.8456)
    }

    fn shop(name: &str, latitude: f64, longitude: f64) -> Shop {
        Shop::new(name, "", Coordinates::new(latitude, longitude), "6281234567890")
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (jakarta(), Coordinates::new(-6.2145, 106.8567)),
            (Coordinates::new(51.5, -0.12), Coordinates::new(48.85, 2.35)),
            (Coordinates::new(-90.0, 180.0), Coordinates::new(90.0, -180.0)),
        ];

        for (a, b) in pairs {
            assert_eq!(distance_km(a, b), distance_km(b, a));
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_km(jakarta(), jakarta()), 0.0);
        let pole = Coordinates::new(90.0, 0.0);
        assert_eq!(distance_km(pole, pole), 0.0);
    }

    #[test]
    fn jakarta_fixture_distance() {
        let d = distance_km(jakarta(), Coordinates::new(-6.2145, 106.8567));
        assert!((d - 1.38).abs() < 1e-9, "got {}", d);
    }

    #[test]
    fn distance_is_rounded_to_two_decimals() {
        let d = distance_km(jakarta(), Coordinates::new(-6.2, 106.83));
        assert_eq!(d, 1.98);
        assert_eq!(round2(d), d);
    }

    #[test]
    fn sort_orders_nearest_first() {
        let shops = vec![
            shop("far", -6.30, 106.90),
            shop("near", -6.2090, 106.8460),
            shop("middle", -6.2145, 106.8567),
        ];

        let sorted = sort_by_distance(jakarta(), shops);
        let names: Vec<&str> = sorted.iter().map(|c| c.shop.name.as_str()).collect();

        assert_eq!(names, vec!["near", "middle", "far"]);
        assert!(sorted.iter().all(|c| c.straight_line_distance_km.is_some()));
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let shops = vec![
            shop("first", -6.2145, 106.8567),
            shop("second", -6.2145, 106.8567),
            shop("third", -6.2145, 106.8567),
        ];

        let sorted = sort_by_distance(jakarta(), shops);
        let names: Vec<&str> = sorted.iter().map(|c| c.shop.name.as_str()).collect();

        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn sort_is_idempotent() {
        let shops = vec![
            shop("a", -6.25, 106.80),
            shop("b", -6.2088, 106.85),
            shop("c", -6.2145, 106.8567),
            shop("d", -6.2145, 106.8567),
        ];

        let once = sort_by_distance(jakarta(), shops);
        let first_ids: Vec<_> = once.iter().map(|c| c.shop.id).collect();

        let twice = sort_by_distance(jakarta(), once);
        let second_ids: Vec<_> = twice.iter().map(|c| c.shop.id).collect();

        assert_eq!(first_ids, second_ids);
    }
}
