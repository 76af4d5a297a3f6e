use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::workflows::financing::{PartnerId, RepositoryError};

use super::domain::{PartnerFilter, PartnerProfileEdit, PartnerRegistration};
use super::repository::PartnerRepository;
use super::service::{PartnerService, PartnerServiceError};

/// Admin roster and partner profile endpoints.
pub fn partner_router<R>(service: Arc<PartnerService<R>>) -> Router
where
    R: PartnerRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/partners",
            get(list_handler::<R>).post(register_handler::<R>),
        )
        .route(
            "/api/v1/partners/:partner_id",
            get(fetch_handler::<R>).put(update_handler::<R>),
        )
        .with_state(service)
}

fn error_response(error: PartnerServiceError) -> Response {
    let status = match &error {
        PartnerServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PartnerServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PartnerServiceError::Repository(
            RepositoryError::Unavailable(_) | RepositoryError::Rejected(_),
        ) => StatusCode::INTERNAL_SERVER_ERROR,
        PartnerServiceError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<PartnerService<R>>>,
    Query(filter): Query<PartnerFilter>,
) -> Response
where
    R: PartnerRepository + 'static,
{
    match service.list(&filter) {
        Ok(partners) => (StatusCode::OK, Json(partners)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<PartnerService<R>>>,
    Json(registration): Json<PartnerRegistration>,
) -> Response
where
    R: PartnerRepository + 'static,
{
    match service.register(registration) {
        Ok(partner) => (StatusCode::CREATED, Json(partner)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<PartnerService<R>>>,
    Path(partner_id): Path<String>,
) -> Response
where
    R: PartnerRepository + 'static,
{
    match service.get(&PartnerId(partner_id)) {
        Ok(partner) => (StatusCode::OK, Json(partner)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<PartnerService<R>>>,
    Path(partner_id): Path<String>,
    Json(edit): Json<PartnerProfileEdit>,
) -> Response
where
    R: PartnerRepository + 'static,
{
    match service.update_profile(&PartnerId(partner_id), edit) {
        Ok(partner) => (StatusCode::OK, Json(partner)).into_response(),
        Err(error) => error_response(error),
    }
}
