//! Hotel route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hotelier_core::hotel::HotelInput;
use hotelier_core::HotelId;
use serde::{Deserialize, Serialize};

use super::pictures::PictureResponse;
use super::{json_rejection, parse_id};
use crate::context::AppContext;
use crate::error::AppError;

/// Hotel response, with its gallery in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HotelResponse {
    pub id: i64,
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub description: Option<String>,
    pub max_capacity: i64,
    pub price_per_night: f64,
    /// URL of the first picture, if any.
    pub thumbnail_url: Option<String>,
    pub pictures: Vec<PictureResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl HotelResponse {
    fn from_model(hotel: &hotelier_db::models::Hotel, pictures: Vec<PictureResponse>) -> Self {
        Self {
            id: hotel.id.get(),
            name: hotel.name.clone(),
            address1: hotel.address1.clone(),
            address2: hotel.address2.clone(),
            zipcode: hotel.zipcode.clone(),
            city: hotel.city.clone(),
            country: hotel.country.clone(),
            lat: hotel.lat,
            lng: hotel.lng,
            description: hotel.description.clone(),
            max_capacity: hotel.max_capacity,
            price_per_night: hotel.price_per_night,
            thumbnail_url: pictures.first().map(|p| p.url.clone()),
            pictures,
            created_at: hotel.created_at.clone(),
            updated_at: hotel.updated_at.clone(),
        }
    }
}

/// POST /api/hotels
#[utoipa::path(
    post,
    path = "/api/hotels",
    request_body = HotelInput,
    responses(
        (status = 201, description = "Hotel created", body = HotelResponse),
        (status = 422, description = "Invalid hotel fields")
    )
)]
pub async fn create_hotel(
    State(ctx): State<AppContext>,
    payload: Result<Json<HotelInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload.map_err(json_rejection)?;
    input.validate()?;

    let conn = hotelier_db::pool::get_conn(&ctx.db)?;
    let hotel = hotelier_db::queries::hotels::create_hotel(&conn, &input)?;

    tracing::info!(hotel_id = %hotel.id, name = %hotel.name, "Hotel created");
    Ok((
        StatusCode::CREATED,
        Json(HotelResponse::from_model(&hotel, Vec::new())),
    ))
}

/// GET /api/hotels/:hotel_id
#[utoipa::path(
    get,
    path = "/api/hotels/{hotel_id}",
    params(("hotel_id" = i64, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Hotel with pictures", body = HotelResponse),
        (status = 404, description = "Hotel not found")
    )
)]
pub async fn get_hotel(
    State(ctx): State<AppContext>,
    Path(hotel_id): Path<String>,
) -> Result<Json<HotelResponse>, AppError> {
    let hotel_id: HotelId = parse_id(&hotel_id, "hotel")?;

    let conn = hotelier_db::pool::get_conn(&ctx.db)?;
    let hotel = hotelier_db::queries::hotels::get_hotel(&conn, hotel_id)?
        .ok_or_else(|| hotelier_core::Error::not_found("hotel", hotel_id))?;
    let pictures = hotelier_db::queries::pictures::list_pictures(&conn, hotel_id)?
        .iter()
        .map(|p| PictureResponse::from_model(p, &ctx))
        .collect();

    Ok(Json(HotelResponse::from_model(&hotel, pictures)))
}

/// DELETE /api/hotels/:hotel_id
#[utoipa::path(
    delete,
    path = "/api/hotels/{hotel_id}",
    params(("hotel_id" = i64, Path, description = "Hotel ID")),
    responses(
        (status = 204, description = "Hotel and its pictures deleted"),
        (status = 404, description = "Hotel not found")
    )
)]
pub async fn delete_hotel(
    State(ctx): State<AppContext>,
    Path(hotel_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let hotel_id: HotelId = parse_id(&hotel_id, "hotel")?;
    ctx.pictures.delete_all_for_hotel(hotel_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
