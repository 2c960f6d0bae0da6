use axum::extract::{rejection::JsonRejection, Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{json_body, optional_coordinates, required_coordinates};
use crate::contact::{order_message, whatsapp_url, ContactDetails};
use crate::entities::{Candidate, Coordinates, ShopDetail};
use crate::error::{invalid_input_error, invalid_location_error, Error};
use crate::server::{ApiResponse, DynAPI};

#[derive(Serialize, Deserialize)]
pub struct NearbyParams {
    lat: Option<String>,
    lng: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    lat: Option<String>,
    lng: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResult {
    shops: Vec<Candidate>,
    query: String,
}

#[derive(Deserialize)]
pub struct OrderParams {
    #[serde(flatten)]
    contact: ContactDetails,
    #[serde(default)]
    user_location: Option<Coordinates>,
}

#[derive(Serialize)]
pub struct OrderLink {
    whatsapp_url: String,
}

pub async fn nearby(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<ApiResponse<Vec<Candidate>>>, Error> {
    let origin = required_coordinates(params.lat.as_deref(), params.lng.as_deref())?;
    let shops = api.nearby_shops(origin).await?;
    let message = format!("Found {} shops", shops.len());

    Ok(ApiResponse::ok(shops).with_message(message).into())
}

pub async fn search(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<SearchResult>>, Error> {
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| invalid_input_error("missing required parameter: q"))?;

    let origin = optional_coordinates(params.lat.as_deref(), params.lng.as_deref());

    let shops = api.search_shops(query.clone(), origin).await?;
    let message = format!("Found {} shop(s) matching \"{}\"", shops.len(), query);

    Ok(ApiResponse::ok(SearchResult { shops, query })
        .with_message(message)
        .into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ShopDetail>>, Error> {
    let detail = api.find_shop(id).await?;

    Ok(ApiResponse::ok(detail).into())
}

pub async fn order(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    payload: Result<Json<OrderParams>, JsonRejection>,
) -> Result<Json<ApiResponse<OrderLink>>, Error> {
    let params = json_body(payload)?;

    let user_location = match params.user_location {
        Some(location) if params.contact.is_complete() => location,
        _ => {
            return Err(invalid_input_error(
                "missing required fields: name, phone, repair_type, user_location",
            ))
        }
    };
    if !user_location.is_valid() {
        return Err(invalid_location_error());
    }

    let detail = api.find_shop(id).await?;
    let message = order_message(&params.contact, user_location);

    Ok(ApiResponse::ok(OrderLink {
        whatsapp_url: whatsapp_url(&detail.shop.whatsapp_number, &message),
    })
    .into())
}
