use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::repository::{DonorFilter, DonorRepository};
use super::service::{DonorRegistration, DonorService};
use crate::domain::DonorId;
use crate::eligibility::EligibilityInput;
use crate::error::ErrorKind;
use crate::inventory::StockRepository;

/// Raw form values; dates arrive as `YYYY-MM-DD` strings.
#[derive(Debug, Deserialize)]
pub(crate) struct EligibilityRequest {
    #[serde(default)]
    pub(crate) date_of_birth: Option<String>,
    pub(crate) weight_kg: f64,
    #[serde(default)]
    pub(crate) last_donation_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DonationRequest {
    pub(crate) units: u32,
}

/// Router exposing donor intake, eligibility and donation endpoints.
pub fn donor_router<D, S>(service: Arc<DonorService<D, S>>) -> Router
where
    D: DonorRepository + 'static,
    S: StockRepository + 'static,
{
    Router::new()
        .route("/api/v1/eligibility", post(evaluate_handler::<D, S>))
        .route(
            "/api/v1/donors",
            post(register_handler::<D, S>).get(list_handler::<D, S>),
        )
        .route("/api/v1/donors/:donor_id", get(donor_handler::<D, S>))
        .route(
            "/api/v1/donors/:donor_id/eligibility",
            post(refresh_handler::<D, S>),
        )
        .route(
            "/api/v1/donors/:donor_id/donations",
            post(donation_handler::<D, S>),
        )
        .with_state(service)
}

pub(crate) async fn evaluate_handler<D, S>(
    State(service): State<Arc<DonorService<D, S>>>,
    Json(request): Json<EligibilityRequest>,
) -> Response
where
    D: DonorRepository + 'static,
    S: StockRepository + 'static,
{
    let decision = EligibilityInput::parse(
        request.date_of_birth.as_deref(),
        request.weight_kg,
        request.last_donation_date.as_deref(),
    )
    .and_then(|input| service.evaluator().evaluate(&input));

    match decision {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(err) => ErrorKind::InvalidInput.respond(err.to_string()),
    }
}

pub(crate) async fn register_handler<D, S>(
    State(service): State<Arc<DonorService<D, S>>>,
    Json(registration): Json<DonorRegistration>,
) -> Response
where
    D: DonorRepository + 'static,
    S: StockRepository + 'static,
{
    match service.register(registration) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}

pub(crate) async fn list_handler<D, S>(
    State(service): State<Arc<DonorService<D, S>>>,
    Query(filter): Query<DonorFilter>,
) -> Response
where
    D: DonorRepository + 'static,
    S: StockRepository + 'static,
{
    match service.list(&filter) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}

pub(crate) async fn donor_handler<D, S>(
    State(service): State<Arc<DonorService<D, S>>>,
    Path(donor_id): Path<String>,
) -> Response
where
    D: DonorRepository + 'static,
    S: StockRepository + 'static,
{
    match service.get(&DonorId(donor_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}

pub(crate) async fn refresh_handler<D, S>(
    State(service): State<Arc<DonorService<D, S>>>,
    Path(donor_id): Path<String>,
) -> Response
where
    D: DonorRepository + 'static,
    S: StockRepository + 'static,
{
    match service.refresh_eligibility(&DonorId(donor_id)) {
        Ok(refresh) => (StatusCode::OK, Json(refresh)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}

pub(crate) async fn donation_handler<D, S>(
    State(service): State<Arc<DonorService<D, S>>>,
    Path(donor_id): Path<String>,
    Json(request): Json<DonationRequest>,
) -> Response
where
    D: DonorRepository + 'static,
    S: StockRepository + 'static,
{
    match service.record_donation(&DonorId(donor_id), request.units) {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}
