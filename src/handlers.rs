use crate::db_storage::HumanStorage;
use crate::enrichment::Enricher;
use crate::errors::AppError;
use crate::models::{
    AddHumanRequest, DeleteHumanRequest, Human, HumanFilter, HumanQueryParams, NewHuman,
    UpdateHumanRequest,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for human records.
    pub storage: HumanStorage,
    /// Concurrent age/gender/nationality lookups.
    pub enricher: Enricher,
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "people-enrichment-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /humans
///
/// Creates a human with age, gender and nationality filled in from the
/// lookup services. Lookups that fail or time out leave their attribute at
/// its default; they never fail the request.
#[utoipa::path(
    post,
    path = "/humans",
    tag = "humans",
    request_body = AddHumanRequest,
    responses(
        (status = 201, description = "Human created", body = Human),
        (status = 400, description = "name and surname required"),
        (status = 415, description = "Content-Type must be application/json"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn add_human(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddHumanRequest>,
) -> Result<(StatusCode, Json<Human>), AppError> {
    let name = req.name.trim();
    let surname = req.surname.trim();
    if name.is_empty() || surname.is_empty() {
        return Err(AppError::BadRequest(
            "name and surname required".to_string(),
        ));
    }

    tracing::info!("POST /humans - {} {}", name, surname);

    let attributes = state.enricher.enrich(name).await;

    let new_human = NewHuman {
        name: name.to_string(),
        surname: surname.to_string(),
        patronymic: req
            .patronymic
            .map(|p| p.trim().to_string())
            .unwrap_or_default(),
        attributes,
    };

    let human = state.storage.add_human(&new_human).await?;
    tracing::info!("Added human {:?}", human);

    Ok((StatusCode::CREATED, Json(human)))
}

/// GET /humans
///
/// Lists humans with optional filters and pagination.
#[utoipa::path(
    get,
    path = "/humans",
    tag = "humans",
    params(HumanQueryParams),
    responses(
        (status = 200, description = "Matching humans", body = [Human]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_humans(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HumanQueryParams>,
) -> Result<Json<Vec<Human>>, AppError> {
    let filter = HumanFilter::from(params);
    tracing::info!("GET /humans - filter: {:?}", filter);

    let humans = state.storage.get_humans(&filter).await?;
    Ok(Json(humans))
}

/// PATCH /humans
///
/// Updates the supplied fields of an existing human.
#[utoipa::path(
    patch,
    path = "/humans",
    tag = "humans",
    request_body = UpdateHumanRequest,
    responses(
        (status = 200, description = "Human updated", body = Human),
        (status = 400, description = "nothing to update"),
        (status = 404, description = "human not found"),
        (status = 415, description = "Content-Type must be application/json"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_human(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateHumanRequest>,
) -> Result<Json<Human>, AppError> {
    tracing::info!("PATCH /humans - id: {}", req.id);

    let human = state.storage.update_human(&req).await?;
    tracing::info!("Updated human {:?}", human);

    Ok(Json(human))
}

/// DELETE /humans
#[utoipa::path(
    delete,
    path = "/humans",
    tag = "humans",
    request_body = DeleteHumanRequest,
    responses(
        (status = 200, description = "Human deleted"),
        (status = 404, description = "human not found"),
        (status = 415, description = "Content-Type must be application/json"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_human(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteHumanRequest>,
) -> Result<StatusCode, AppError> {
    state.storage.delete_human(req.id).await?;
    tracing::info!("Deleted human {}", req.id);

    Ok(StatusCode::OK)
}
