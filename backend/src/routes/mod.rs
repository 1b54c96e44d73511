//! Route definitions for the settlement engine API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/batches", batch_routes())
        .nest("/settlements", settlement_routes())
        .nest("/inventory", inventory_routes())
}

/// Batch figures and ledger quick edits
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches_for_settlement))
        .route("/:batch_id/assets", get(handlers::get_batch_assets))
        .route("/:batch_id/pnl", get(handlers::get_batch_pnl))
        .route("/:batch_id/totals", put(handlers::update_batch_totals))
        .route("/:batch_id/expenses", put(handlers::set_batch_expense))
        .route("/:batch_id/settle", post(handlers::settle_batch))
}

/// Settlement lifecycle
fn settlement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_settlements).post(handlers::create_settlement),
        )
        .route("/summary", get(handlers::get_financial_summary))
        .route("/:settlement_id", get(handlers::get_settlement))
        .route("/:settlement_id/finalize", post(handlers::finalize_settlement))
        .route("/:settlement_id/cancel", post(handlers::cancel_settlement))
}

/// Inventory valuation
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/abc", get(handlers::get_abc_report))
        .route("/abc/classify", post(handlers::classify_groups))
}
