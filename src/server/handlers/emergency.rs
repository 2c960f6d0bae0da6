use axum::extract::{rejection::JsonRejection, Extension, Json};
use axum::http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{caller_identity, json_body};
use crate::contact::{emergency_message, whatsapp_url, ContactDetails};
use crate::entities::{Coordinates, RankedCandidate};
use crate::error::{invalid_input_error, Error};
use crate::ranking::RankingMode;
use crate::server::{ApiResponse, DynAPI};

#[derive(Deserialize)]
pub struct CreateParams {
    #[serde(flatten)]
    contact: ContactDetails,
    #[serde(default)]
    user_location: Option<Coordinates>,
}

#[derive(Serialize)]
pub struct EmergencyShop {
    #[serde(flatten)]
    ranked: RankedCandidate,
    whatsapp_url: String,
}

#[derive(Serialize)]
pub struct EmergencyResult {
    shops: Vec<EmergencyShop>,
    user_location: Coordinates,
    mode: RankingMode,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    headers: HeaderMap,
    payload: Result<Json<CreateParams>, JsonRejection>,
) -> Result<(HeaderMap, Json<ApiResponse<EmergencyResult>>), Error> {
    let params = json_body(payload)?;

    let user_location = match params.user_location {
        Some(location) if params.contact.is_complete() => location,
        _ => {
            return Err(invalid_input_error(
                "missing required fields: user_location, repair_type, name, phone",
            ))
        }
    };

    let caller = caller_identity(&headers);
    let ranking = api.rank_nearby(user_location, caller).await?;

    let message = emergency_message(&params.contact, user_location);
    let shops: Vec<EmergencyShop> = ranking
        .candidates
        .into_iter()
        .map(|ranked| EmergencyShop {
            whatsapp_url: whatsapp_url(&ranked.shop().whatsapp_number, &message),
            ranked,
        })
        .collect();

    let summary = match ranking.mode {
        RankingMode::Road => format!("Found {} nearby shops", shops.len()),
        RankingMode::StraightLine => {
            "Using straight-line distance (routing credential not configured)".to_owned()
        }
    };

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        "x-ratelimit-remaining",
        HeaderValue::from(ranking.quota.remaining),
    );

    let result = EmergencyResult {
        shops,
        user_location,
        mode: ranking.mode,
    };

    Ok((
        response_headers,
        ApiResponse::ok(result).with_message(summary).into(),
    ))
}
