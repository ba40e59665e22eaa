use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use stockfolio_core::portfolio::{
    LotUpdate, NewLot, NewPortfolio, Portfolio, PortfolioUpdate,
};
use stockfolio_core::refresh::RefreshStarted;

use crate::{auth::OwnerId, error::ApiResult, main_lib::AppState};

async fn list_portfolios(
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Json<Vec<Portfolio>>> {
    let portfolios = state.portfolio_service.list_portfolios(&owner).await?;
    Ok(Json(portfolios))
}

async fn create_portfolio(
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
    Json(input): Json<NewPortfolio>,
) -> ApiResult<(StatusCode, Json<Portfolio>)> {
    let portfolio = state
        .portfolio_service
        .create_portfolio(&owner, input, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

async fn get_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state.portfolio_service.get_portfolio(&owner, &id).await?;
    Ok(Json(portfolio))
}

async fn update_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
    Json(update): Json<PortfolioUpdate>,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state
        .portfolio_service
        .update_portfolio(&owner, &id, update)
        .await?;
    Ok(Json(portfolio))
}

async fn delete_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
) -> ApiResult<StatusCode> {
    state.portfolio_service.delete_portfolio(&owner, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_lot(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
    Json(input): Json<NewLot>,
) -> ApiResult<(StatusCode, Json<Portfolio>)> {
    let portfolio = state.portfolio_service.add_lot(&owner, &id, input).await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

async fn update_lot(
    Path((id, lot_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
    Json(update): Json<LotUpdate>,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state
        .portfolio_service
        .update_lot(&owner, &id, &lot_id, update)
        .await?;
    Ok(Json(portfolio))
}

async fn delete_lot(
    Path((id, lot_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state
        .portfolio_service
        .delete_lot(&owner, &id, &lot_id)
        .await?;
    Ok(Json(portfolio))
}

/// Kick off an asynchronous price refresh and acknowledge immediately.
async fn fetch_prices(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
) -> ApiResult<(StatusCode, Json<RefreshStarted>)> {
    let ack = state
        .refresh_service
        .clone()
        .start_refresh(&owner, &id)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(ack)))
}

async fn fetch_progress(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Json<Value>> {
    let body = match state.refresh_service.progress(&owner, &id) {
        Some(snapshot) => serde_json::to_value(snapshot).unwrap_or_else(|_| {
            json!({ "status": "error", "message": "Progress snapshot unavailable" })
        }),
        None => json!({
            "status": "idle",
            "message": "No active price fetch operation"
        }),
    };
    Ok(Json(body))
}

/// Diagnostic lookup: run the provider chain once for a symbol.
async fn test_price(
    Path((_id, symbol)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    OwnerId(_owner): OwnerId,
) -> (StatusCode, Json<Value>) {
    let report = state.refresh_service.test_price(&symbol).await;
    let status = if report.succeeded() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    let body = serde_json::to_value(&report)
        .unwrap_or_else(|_| json!({ "error": "Report unavailable" }));
    (status, Json(body))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(list_portfolios).post(create_portfolio))
        .route(
            "/portfolio/{id}",
            get(get_portfolio)
                .put(update_portfolio)
                .delete(delete_portfolio),
        )
        .route("/portfolio/{id}/stocks", post(add_lot))
        .route(
            "/portfolio/{id}/stocks/{lot_id}",
            put(update_lot).delete(delete_lot),
        )
        .route("/portfolio/{id}/fetch-prices", post(fetch_prices))
        .route("/portfolio/{id}/fetch-prices/progress", get(fetch_progress))
        .route("/portfolio/{id}/test-price/{symbol}", get(test_price))
}
