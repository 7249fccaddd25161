//! Axum router construction.
//!
//! Builds the full application router with the hotel and picture routes,
//! middleware layers, the OpenAPI document, and static serving of stored
//! pictures.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::auth::auth_middleware;
use crate::middleware::request_id::request_id_middleware;
use crate::pictures::PICTURE_PREFIX;
use crate::routes;

/// Room for multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::hotels::create_hotel,
        routes::hotels::get_hotel,
        routes::hotels::delete_hotel,
        routes::pictures::list_pictures,
        routes::pictures::upload_picture,
        routes::pictures::delete_picture,
        routes::pictures::reorder_pictures,
    ),
    components(schemas(
        hotelier_core::hotel::HotelInput,
        routes::health::HealthResponse,
        routes::hotels::HotelResponse,
        routes::pictures::PictureResponse,
        routes::pictures::ReorderRequest,
        routes::pictures::UploadPictureForm,
    ))
)]
pub struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = usize::try_from(ctx.config.storage.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api = Router::new()
        .route("/hotels", post(routes::hotels::create_hotel))
        .route(
            "/hotels/{hotel_id}",
            get(routes::hotels::get_hotel).delete(routes::hotels::delete_hotel),
        )
        .route(
            "/hotels/{hotel_id}/pictures",
            get(routes::pictures::list_pictures).post(routes::pictures::upload_picture),
        )
        .route(
            "/hotels/{hotel_id}/pictures/reorder",
            patch(routes::pictures::reorder_pictures),
        )
        .route(
            "/hotels/{hotel_id}/pictures/{picture_id}",
            delete(routes::pictures::delete_picture),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(ctx.clone(), auth_middleware));

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Absolute public URLs point at storage served elsewhere. Only the
    // picture prefix is exposed; stashed blobs stay private.
    let public_base = ctx.config.storage.public_base_url.trim_end_matches('/');
    if public_base.starts_with('/') && public_base.len() > 1 {
        let dir = ctx.config.storage.root_dir.join(PICTURE_PREFIX);
        let mount = format!("{public_base}/{PICTURE_PREFIX}");
        tracing::debug!("Serving pictures from {} at {mount}", dir.display());
        app = app.nest_service(&mount, ServeDir::new(dir));
    }

    app.layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
