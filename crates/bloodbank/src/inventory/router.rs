use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::ledger::InventoryLedger;
use super::repository::StockRepository;
use super::transition::StockMovement;
use crate::domain::BloodType;
use crate::error::ErrorKind;

#[derive(Debug, Deserialize)]
pub(crate) struct UnitsRequest {
    pub(crate) units: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityQuery {
    pub(crate) units: u32,
}

/// Router exposing the ledger operations over HTTP.
pub fn inventory_router<R>(ledger: Arc<InventoryLedger<R>>) -> Router
where
    R: StockRepository + 'static,
{
    Router::new()
        .route("/api/v1/inventory", get(summary_handler::<R>))
        .route("/api/v1/inventory/alerts", get(alerts_handler::<R>))
        .route("/api/v1/inventory/stock/:blood_type", get(stock_handler::<R>))
        .route(
            "/api/v1/inventory/stock/:blood_type/availability",
            get(availability_handler::<R>),
        )
        .route(
            "/api/v1/inventory/stock/:blood_type/add",
            post(add_handler::<R>),
        )
        .route(
            "/api/v1/inventory/stock/:blood_type/remove",
            post(remove_handler::<R>),
        )
        .route(
            "/api/v1/inventory/stock/:blood_type/reserve",
            post(reserve_handler::<R>),
        )
        .route(
            "/api/v1/inventory/stock/:blood_type/fulfill",
            post(fulfill_handler::<R>),
        )
        .with_state(ledger)
}

fn parse_blood_type(raw: &str) -> Result<BloodType, Response> {
    raw.parse::<BloodType>()
        .map_err(|err| ErrorKind::InvalidInput.respond(err.to_string()))
}

fn apply_movement<R>(ledger: &InventoryLedger<R>, raw: &str, movement: StockMovement) -> Response
where
    R: StockRepository + 'static,
{
    let blood_type = match parse_blood_type(raw) {
        Ok(blood_type) => blood_type,
        Err(response) => return response,
    };

    match ledger.apply(blood_type, movement) {
        Ok(stock) => (StatusCode::OK, Json(stock)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}

pub(crate) async fn summary_handler<R>(State(ledger): State<Arc<InventoryLedger<R>>>) -> Response
where
    R: StockRepository + 'static,
{
    match ledger.summary() {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}

pub(crate) async fn alerts_handler<R>(State(ledger): State<Arc<InventoryLedger<R>>>) -> Response
where
    R: StockRepository + 'static,
{
    match ledger.low_stock_alerts() {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}

pub(crate) async fn stock_handler<R>(
    State(ledger): State<Arc<InventoryLedger<R>>>,
    Path(blood_type): Path<String>,
) -> Response
where
    R: StockRepository + 'static,
{
    let blood_type = match parse_blood_type(&blood_type) {
        Ok(blood_type) => blood_type,
        Err(response) => return response,
    };

    match ledger.stock(blood_type) {
        Ok(stock) => (StatusCode::OK, Json(stock)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}

pub(crate) async fn availability_handler<R>(
    State(ledger): State<Arc<InventoryLedger<R>>>,
    Path(blood_type): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Response
where
    R: StockRepository + 'static,
{
    let blood_type = match parse_blood_type(&blood_type) {
        Ok(blood_type) => blood_type,
        Err(response) => return response,
    };

    match ledger.check_availability(blood_type, query.units) {
        Ok(availability) => (StatusCode::OK, Json(availability)).into_response(),
        Err(err) => err.kind().respond(err.to_string()),
    }
}

pub(crate) async fn add_handler<R>(
    State(ledger): State<Arc<InventoryLedger<R>>>,
    Path(blood_type): Path<String>,
    Json(request): Json<UnitsRequest>,
) -> Response
where
    R: StockRepository + 'static,
{
    apply_movement(&ledger, &blood_type, StockMovement::Add(request.units))
}

pub(crate) async fn remove_handler<R>(
    State(ledger): State<Arc<InventoryLedger<R>>>,
    Path(blood_type): Path<String>,
    Json(request): Json<UnitsRequest>,
) -> Response
where
    R: StockRepository + 'static,
{
    apply_movement(&ledger, &blood_type, StockMovement::Remove(request.units))
}

pub(crate) async fn reserve_handler<R>(
    State(ledger): State<Arc<InventoryLedger<R>>>,
    Path(blood_type): Path<String>,
    Json(request): Json<UnitsRequest>,
) -> Response
where
    R: StockRepository + 'static,
{
    apply_movement(&ledger, &blood_type, StockMovement::Reserve(request.units))
}

pub(crate) async fn fulfill_handler<R>(
    State(ledger): State<Arc<InventoryLedger<R>>>,
    Path(blood_type): Path<String>,
    Json(request): Json<UnitsRequest>,
) -> Response
where
    R: StockRepository + 'static,
{
    apply_movement(
        &ledger,
        &blood_type,
        StockMovement::FulfillReserved(request.units),
    )
}
