//! HTTP handlers for batch figures and ledger quick edits

use axum::{
    extract::{Path, State},
    Json,
};
use shared::{
    AssetRecord, BatchForSettlement, ExpenseEntry, PnLResult, SetExpenseInput,
    UpdateBatchTotalsInput,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::ValidatedJson;
use crate::services::{BatchService, LedgerWrite, PnLService, SettlementService};
use crate::AppState;

/// List batches with assets and their settlement progress
pub async fn list_batches_for_settlement(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BatchForSettlement>>> {
    let service = BatchService::new(state.store);
    let batches = service.list_batches_for_settlement().await?;
    Ok(Json(batches))
}

/// Get the assets of a batch
pub async fn get_batch_assets(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Vec<AssetRecord>>> {
    let service = BatchService::new(state.store);
    let assets = service.get_batch_assets(batch_id).await?;
    Ok(Json(assets))
}

/// Get the current P&L of a batch
pub async fn get_batch_pnl(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<PnLResult>> {
    let service = PnLService::new(state.store);
    let pnl = service.calculate_lot_pnl(batch_id).await?;
    Ok(Json(pnl))
}

/// Set the batch acquisition cost, sale revenue or scrap revenue
pub async fn update_batch_totals(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<UpdateBatchTotalsInput>,
) -> AppResult<Json<LedgerWrite>> {
    let service = SettlementService::new(state.store);
    let write = service.update_batch_totals(batch_id, input).await?;
    Ok(Json(write))
}

/// Set one expense category of a batch
pub async fn set_batch_expense(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<SetExpenseInput>,
) -> AppResult<Json<ExpenseEntry>> {
    let service = SettlementService::new(state.store);
    let entry = service.set_batch_expense(batch_id, input).await?;
    Ok(Json(entry))
}
