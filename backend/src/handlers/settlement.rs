//! HTTP handlers for settlement endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use shared::{CreateSettlementInput, FinancialSummary, SettlementSnapshot};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::{PnLService, SettlementService};
use crate::AppState;

/// Create a draft settlement from a P&L computed by the caller
pub async fn create_settlement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    payload: Result<Json<CreateSettlementInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SettlementSnapshot>)> {
    let Json(input) = payload?;
    let service = SettlementService::new(state.store);
    let settlement = service
        .create_settlement(input.batch_id, &input.pnl, Some(current_user.0))
        .await?;
    Ok((StatusCode::CREATED, Json(settlement)))
}

/// Compute the batch P&L now and draft a settlement from it
pub async fn settle_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<SettlementSnapshot>)> {
    let pnl = PnLService::new(state.store.clone())
        .calculate_lot_pnl(batch_id)
        .await?;
    let settlement = SettlementService::new(state.store)
        .create_settlement(batch_id, &pnl, Some(current_user.0))
        .await?;
    Ok((StatusCode::CREATED, Json(settlement)))
}

/// List settlements, newest first
pub async fn list_settlements(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SettlementSnapshot>>> {
    let service = SettlementService::new(state.store);
    let settlements = service.list_settlements().await?;
    Ok(Json(settlements))
}

/// Get a settlement by ID
pub async fn get_settlement(
    State(state): State<AppState>,
    Path(settlement_id): Path<Uuid>,
) -> AppResult<Json<SettlementSnapshot>> {
    let service = SettlementService::new(state.store);
    let settlement = service.get_settlement(settlement_id).await?;
    Ok(Json(settlement))
}

/// Finalize a draft settlement
pub async fn finalize_settlement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(settlement_id): Path<Uuid>,
) -> AppResult<Json<SettlementSnapshot>> {
    let service = SettlementService::new(state.store);
    let settlement = service
        .finalize_settlement(settlement_id, current_user.0)
        .await?;
    Ok(Json(settlement))
}

/// Cancel a draft settlement
pub async fn cancel_settlement(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(settlement_id): Path<Uuid>,
) -> AppResult<Json<SettlementSnapshot>> {
    let service = SettlementService::new(state.store);
    let settlement = service.cancel_settlement(settlement_id).await?;
    Ok(Json(settlement))
}

/// Portfolio figures over finalized settlements
pub async fn get_financial_summary(
    State(state): State<AppState>,
) -> AppResult<Json<FinancialSummary>> {
    let service = SettlementService::new(state.store);
    let summary = service
        .financial_summary(state.config.finance.healthy_margin_pct)
        .await?;
    Ok(Json(summary))
}
