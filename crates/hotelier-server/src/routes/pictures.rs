//! Hotel picture route handlers.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hotelier_core::{Error, HotelId, PictureId};
use serde::{Deserialize, Serialize};

use super::{json_rejection, parse_id};
use crate::context::AppContext;
use crate::error::AppError;
use crate::pictures::NewPicture;

/// Multipart field carrying the file.
pub const PICTURE_FIELD: &str = "picture";

/// Picture response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PictureResponse {
    pub id: i64,
    pub hotel_id: i64,
    /// Blob key relative to the storage root.
    pub filepath: String,
    pub filesize: i64,
    pub position: i64,
    /// Public URL of the file.
    pub url: String,
    pub created_at: String,
}

impl PictureResponse {
    pub(crate) fn from_model(picture: &hotelier_db::models::Picture, ctx: &AppContext) -> Self {
        Self {
            id: picture.id.get(),
            hotel_id: picture.hotel_id.get(),
            filepath: picture.filepath.clone(),
            filesize: picture.filesize,
            position: picture.position,
            url: ctx.pictures.public_url(picture),
            created_at: picture.created_at.clone(),
        }
    }
}

/// Multipart form for uploads (documentation only).
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UploadPictureForm {
    #[schema(value_type = String, format = Binary)]
    picture: Vec<u8>,
}

/// Request body for reordering.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReorderRequest {
    /// Every picture of the hotel, in the desired display order.
    pub picture_ids: Vec<i64>,
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::validation("picture exceeds the upload size limit")
    } else {
        Error::BadRequest(e.body_text())
    }
}

/// GET /api/hotels/:hotel_id/pictures
#[utoipa::path(
    get,
    path = "/api/hotels/{hotel_id}/pictures",
    params(("hotel_id" = i64, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Pictures in display order", body = Vec<PictureResponse>),
        (status = 404, description = "Hotel not found")
    )
)]
pub async fn list_pictures(
    State(ctx): State<AppContext>,
    Path(hotel_id): Path<String>,
) -> Result<Json<Vec<PictureResponse>>, AppError> {
    let hotel_id: HotelId = parse_id(&hotel_id, "hotel")?;
    let pictures = ctx.pictures.list(hotel_id)?;
    Ok(Json(
        pictures
            .iter()
            .map(|p| PictureResponse::from_model(p, &ctx))
            .collect(),
    ))
}

/// POST /api/hotels/:hotel_id/pictures
#[utoipa::path(
    post,
    path = "/api/hotels/{hotel_id}/pictures",
    params(("hotel_id" = i64, Path, description = "Hotel ID")),
    request_body(content = UploadPictureForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Picture stored", body = PictureResponse),
        (status = 400, description = "Missing `picture` field"),
        (status = 404, description = "Hotel not found"),
        (status = 422, description = "Not a jpeg/png/webp image, or too large"),
        (status = 503, description = "Picture storage unavailable")
    )
)]
pub async fn upload_picture(
    State(ctx): State<AppContext>,
    Path(hotel_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let hotel_id: HotelId = parse_id(&hotel_id, "hotel")?;
    let mut multipart = multipart.map_err(|e| Error::BadRequest(e.body_text()))?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PICTURE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(String::from);
        let file_name = field.file_name().map(String::from);
        let data = field.bytes().await.map_err(multipart_error)?;
        file = Some(NewPicture {
            data,
            content_type,
            file_name,
        });
        break;
    }
    let file = file.ok_or_else(|| {
        Error::BadRequest(format!("multipart field `{PICTURE_FIELD}` is required"))
    })?;

    let picture = ctx.pictures.upload(hotel_id, file).await?;
    Ok((
        StatusCode::CREATED,
        Json(PictureResponse::from_model(&picture, &ctx)),
    ))
}

/// DELETE /api/hotels/:hotel_id/pictures/:picture_id
#[utoipa::path(
    delete,
    path = "/api/hotels/{hotel_id}/pictures/{picture_id}",
    params(
        ("hotel_id" = i64, Path, description = "Hotel ID"),
        ("picture_id" = i64, Path, description = "Picture ID")
    ),
    responses(
        (status = 204, description = "Picture deleted"),
        (status = 403, description = "Picture does not belong to the hotel"),
        (status = 503, description = "Picture storage unavailable")
    )
)]
pub async fn delete_picture(
    State(ctx): State<AppContext>,
    Path((hotel_id, picture_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let hotel_id: HotelId = parse_id(&hotel_id, "hotel")?;
    let picture_id: PictureId = parse_id(&picture_id, "picture")?;

    ctx.pictures.delete(hotel_id, picture_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/hotels/:hotel_id/pictures/reorder
#[utoipa::path(
    patch,
    path = "/api/hotels/{hotel_id}/pictures/reorder",
    params(("hotel_id" = i64, Path, description = "Hotel ID")),
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order updated"),
        (status = 403, description = "IDs do not match the hotel's pictures"),
        (status = 404, description = "Hotel not found"),
        (status = 422, description = "Duplicate IDs or malformed body")
    )
)]
pub async fn reorder_pictures(
    State(ctx): State<AppContext>,
    Path(hotel_id): Path<String>,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let hotel_id: HotelId = parse_id(&hotel_id, "hotel")?;
    let Json(payload) = payload.map_err(json_rejection)?;

    let ordered: Vec<PictureId> = payload
        .picture_ids
        .into_iter()
        .map(PictureId::from)
        .collect();
    ctx.pictures.reorder(hotel_id, &ordered).await?;
    Ok(StatusCode::NO_CONTENT)
}
