pub mod emergency;
pub mod shops;

use axum::extract::{rejection::JsonRejection, Json};
use axum::http::HeaderMap;

use crate::entities::Coordinates;
use crate::error::{invalid_input_error, Error};

/// Identity used for rate limiting: the first forwarded address, else the real IP header.
pub fn caller_identity(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    forwarded.or(real_ip).unwrap_or("unknown").to_owned()
}

/// A present but unparsable value reads as NaN and fails coordinate validation later.
pub fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;

    Some(raw.parse().unwrap_or(f64::NAN))
}

pub fn optional_coordinates(lat: Option<&str>, lng: Option<&str>) -> Option<Coordinates> {
    match (parse_coordinate(lat), parse_coordinate(lng)) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
        _ => None,
    }
}

pub fn required_coordinates(lat: Option<&str>, lng: Option<&str>) -> Result<Coordinates, Error> {
    optional_coordinates(lat, lng)
        .ok_or_else(|| invalid_input_error("missing required parameters: lat and lng"))
}

/// Unwraps a JSON body, turning extractor rejections into the error envelope.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(invalid_input_error(format!(
            "invalid request body: {}",
            rejection
        ))),
    }
}
