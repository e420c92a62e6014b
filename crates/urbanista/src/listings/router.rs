use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ListingId, MediaDraft, MediaId};
use super::repository::{ListingRepository, RepositoryError};
use super::search::ListingSearchQuery;
use super::service::{ListingService, ServiceError};
use crate::accounts::AccountDirectory;
use crate::catalog::OfferTypeId;

/// Router builder exposing the listing and lookup endpoints.
pub fn listing_router<R, D>(service: Arc<ListingService<R, D>>) -> Router
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings",
            get(browse_handler::<R, D>).post(create_handler::<R, D>),
        )
        .route("/api/v1/listings/search", get(search_handler::<R, D>))
        .route(
            "/api/v1/listings/:listing_id",
            get(show_handler::<R, D>)
                .put(update_handler::<R, D>)
                .delete(end_handler::<R, D>),
        )
        .route(
            "/api/v1/listings/:listing_id/media",
            post(media_store_handler::<R, D>),
        )
        .route(
            "/api/v1/listings/:listing_id/media/:media_id",
            delete(media_destroy_handler::<R, D>),
        )
        .route("/api/v1/projects", get(projects_handler::<R, D>))
        .route("/api/v1/offer-types", get(offer_types_handler::<R, D>))
        .route(
            "/api/v1/property-types",
            get(property_types_handler::<R, D>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrowseParams {
    #[serde(default)]
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyTypeParams {
    #[serde(default)]
    offer_type: Option<OfferTypeId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaUploadRequest {
    media: Vec<MediaDraft>,
}

/// Translate service failures into HTTP responses. Intake and media
/// violations surface as 422s so form clients can show field errors.
fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Intake(_)
        | ServiceError::Media(_)
        | ServiceError::UnknownOwner(_)
        | ServiceError::ParentNotFound(_)
        | ServiceError::ParentNotProject(_)
        | ServiceError::ParentCycle
        | ServiceError::SubprojectsImmutable => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Repository(RepositoryError::Unavailable(_))
        | ServiceError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}

pub(crate) async fn browse_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
    Query(params): Query<BrowseParams>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    match service.browse(params.page) {
        Ok(page) => (StatusCode::OK, Json(json!({ "listings": page }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
    Json(draft): Json<super::domain::ListingDraft>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    match service.create(draft) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn show_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
    Path(listing_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    match service.get(&ListingId(listing_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
    Path(listing_id): Path<String>,
    Json(draft): Json<super::domain::ListingDraft>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    match service.update(&ListingId(listing_id), draft) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn end_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
    Path(listing_id): Path<String>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    match service.end(&ListingId(listing_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn search_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
    Query(query): Query<ListingSearchQuery>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    let filters = query.clone();
    match service.search(query) {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({ "listings": page, "filters": filters })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn media_store_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
    Path(listing_id): Path<String>,
    Json(request): Json<MediaUploadRequest>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    match service.attach_media(&ListingId(listing_id), request.media) {
        Ok(media) => (StatusCode::OK, Json(json!({ "media": media }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn media_destroy_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
    Path((listing_id, media_id)): Path<(String, String)>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    match service.remove_media(&ListingId(listing_id), &MediaId(media_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn projects_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    match service.projects() {
        Ok(projects) => (StatusCode::OK, Json(json!({ "projects": projects }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn offer_types_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    let offers: Vec<_> = service
        .catalog()
        .offers()
        .iter()
        .map(|(id, kind)| json!({ "id": id, "name": kind.label() }))
        .collect();
    (StatusCode::OK, Json(json!(offers))).into_response()
}

pub(crate) async fn property_types_handler<R, D>(
    State(service): State<Arc<ListingService<R, D>>>,
    Query(params): Query<PropertyTypeParams>,
) -> Response
where
    R: ListingRepository + 'static,
    D: AccountDirectory + 'static,
{
    let catalog = service.catalog();
    let types: Vec<_> = match params.offer_type.and_then(|id| catalog.offer_by_id(id)) {
        Some(offer) => catalog.property_types_for(offer),
        None => catalog.property_types().iter().collect(),
    };
    let payload: Vec<_> = types
        .into_iter()
        .map(|pt| json!({ "id": pt.id, "name": pt.name, "category": pt.category }))
        .collect();
    (StatusCode::OK, Json(json!(payload))).into_response()
}
