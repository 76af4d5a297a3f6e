use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::calculator::{self, QuoteRequest};
use super::documents::{parse_upload_date, DocumentSlot, UploadedDocument};
use super::domain::{ApplicationFilter, ApplicationId, LeadSubmission, StatusEdit};
use super::engine::StatusTransition;
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationService, ApplicationServiceError, ApplicationView, SaveOutcome};

/// Router exposing intake, review, document, settlement and quote endpoints.
pub fn application_router<R>(service: Arc<ApplicationService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(fetch_handler::<R>)
                .put(save_handler::<R>)
                .delete(remove_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/documents",
            post(attach_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/documents/:slot",
            delete(detach_handler::<R>),
        )
        .route("/api/v1/settlements", get(settlements_handler::<R>))
        .route(
            "/api/v1/settlements/:application_id/settle",
            post(settle_handler::<R>),
        )
        .route("/api/v1/pipeline", get(pipeline_handler::<R>))
        .route("/api/v1/calculator", get(quote_handler))
        .with_state(service)
}

/// Upload metadata reported once the file itself has been stored.
#[derive(Debug, Deserialize)]
pub(crate) struct AttachDocumentRequest {
    pub(crate) slot: String,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) uploaded_at: Option<String>,
    #[serde(default)]
    pub(crate) url: Option<String>,
    #[serde(default)]
    pub(crate) mime_type: Option<String>,
}

pub(crate) fn save_notice(outcome: &SaveOutcome) -> String {
    let status = outcome.application.status.label();
    match outcome.transition() {
        StatusTransition::Promoted => {
            format!("required documents confirmed; status saved as '{status}'")
        }
        StatusTransition::Demoted => {
            format!("required documents missing; status returned to '{status}'")
        }
        StatusTransition::Unchanged => "changes saved".to_string(),
    }
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(
            RepositoryError::Unavailable(_) | RepositoryError::Rejected(_),
        ) => StatusCode::INTERNAL_SERVER_ERROR,
        ApplicationServiceError::LeadRejected(_) | ApplicationServiceError::CustomerRejected(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ApplicationServiceError::NotSettleable { .. } => StatusCode::CONFLICT,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Json(lead): Json<LeadSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.submit(lead) {
        Ok(application) => (StatusCode::ACCEPTED, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Query(filter): Query<ApplicationFilter>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.list(&filter) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(application) => {
            (StatusCode::OK, Json(ApplicationView::from(application))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(application_id): Path<String>,
    Json(edit): Json<StatusEdit>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.save(&ApplicationId(application_id), edit) {
        Ok(outcome) => {
            let payload = json!({
                "notice": save_notice(&outcome),
                "transition": outcome.transition(),
                "application": ApplicationView::from(outcome.application),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.remove(&ApplicationId(application_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn attach_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(application_id): Path<String>,
    Json(request): Json<AttachDocumentRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let Some(slot) = DocumentSlot::from_label(&request.slot) else {
        let payload = json!({
            "error": format!("unknown document slot '{}'", request.slot),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    };

    let uploaded_at = match request.uploaded_at.as_deref() {
        None => Local::now().date_naive(),
        Some(raw) => match parse_upload_date(raw) {
            Some(date) => date,
            None => {
                let payload = json!({
                    "error": format!("uploaded_at '{raw}' is not a YYYY-MM-DD date"),
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
            }
        },
    };

    let document = UploadedDocument {
        name: request.name,
        uploaded_at,
        url: request.url,
        mime_type: request.mime_type,
    };

    match service.attach_document(&ApplicationId(application_id), slot, document) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detach_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path((application_id, slot_label)): Path<(String, String)>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let Some(slot) = DocumentSlot::from_label(&slot_label) else {
        let payload = json!({
            "error": format!("unknown document slot '{slot_label}'"),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    };

    match service.detach_document(&ApplicationId(application_id), slot) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn settlements_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let result = service
        .settlement_queue()
        .and_then(|queue| Ok((queue, service.settlement_summary()?)));

    match result {
        Ok((queue, summary)) => {
            let payload = json!({
                "summary": summary,
                "items": queue,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn settle_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.settle(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pipeline_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Query(filter): Query<ApplicationFilter>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.pipeline_summary(&filter) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn quote_handler(Query(request): Query<QuoteRequest>) -> Response {
    match calculator::quote(request) {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}
