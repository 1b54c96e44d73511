//! P&L service: aggregation followed by calculation

use std::sync::Arc;

use shared::{calculate_pnl, PnLInput, PnLResult};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::BatchService;
use crate::store::FinanceStore;

#[derive(Clone)]
pub struct PnLService {
    batches: BatchService,
}

impl PnLService {
    pub fn new(store: Arc<dyn FinanceStore>) -> Self {
        Self {
            batches: BatchService::new(store),
        }
    }

    /// Compute the current P&L of a batch from its records
    pub async fn calculate_lot_pnl(&self, batch_id: Uuid) -> AppResult<PnLResult> {
        let aggregate = self.batches.aggregate(batch_id).await?;
        let pnl = calculate_pnl(&PnLInput::from(&aggregate));

        tracing::debug!(
            batch_id = %batch_id,
            net_profit = %pnl.net_profit,
            margin = %pnl.profit_margin_pct,
            "Calculated batch P&L"
        );
        Ok(pnl)
    }
}
