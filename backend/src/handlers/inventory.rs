//! HTTP handlers for inventory valuation endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use shared::{AbcReport, ClassifiedGroup, InventoryValueGroup};

use crate::error::AppResult;
use crate::services::InventoryService;
use crate::AppState;

/// ABC report of current unsold inventory
pub async fn get_abc_report(State(state): State<AppState>) -> AppResult<Json<AbcReport>> {
    let service = InventoryService::new(state.store);
    let report = service.abc_report().await?;
    Ok(Json(report))
}

/// Classify caller-supplied groups, already ranked by value
pub async fn classify_groups(
    State(state): State<AppState>,
    payload: Result<Json<Vec<InventoryValueGroup>>, JsonRejection>,
) -> AppResult<Json<Vec<ClassifiedGroup>>> {
    let Json(groups) = payload?;
    let service = InventoryService::new(state.store);
    Ok(Json(service.classify(groups)?))
}
