//! Batch aggregation service: reads a batch's records and reduces them

use std::sync::Arc;

use shared::{
    compute_cost_base, compute_sales_base, compute_unit_counts, completion_pct, AssetRecord,
    Batch, BatchAggregate, BatchForSettlement,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::FinanceStore;

/// Batch service for reading and aggregating batch records
#[derive(Clone)]
pub struct BatchService {
    store: Arc<dyn FinanceStore>,
}

impl BatchService {
    pub fn new(store: Arc<dyn FinanceStore>) -> Self {
        Self { store }
    }

    /// Get a batch by ID
    pub async fn get_batch(&self, batch_id: Uuid) -> AppResult<Batch> {
        self.store
            .get_batch(batch_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Batch".to_string()))
    }

    /// Assets of a batch; an empty batch yields an empty list
    pub async fn get_batch_assets(&self, batch_id: Uuid) -> AppResult<Vec<AssetRecord>> {
        self.get_batch(batch_id).await?;
        self.store.get_batch_assets(batch_id).await
    }

    /// Reduce a batch's assets and ledger entries into the P&L inputs
    pub async fn aggregate(&self, batch_id: Uuid) -> AppResult<BatchAggregate> {
        let batch = self.get_batch(batch_id).await?;
        let assets = self.store.get_batch_assets(batch_id).await?;
        let expenses = self.store.get_expense_entries(batch_id).await?;
        let revenues = self.store.get_revenue_entries(batch_id).await?;

        let aggregate = BatchAggregate::from_records(batch, &assets, &expenses, &revenues);
        tracing::debug!(
            batch_id = %batch_id,
            total = aggregate.counts.total,
            sold = aggregate.counts.sold,
            scrapped = aggregate.counts.scrapped,
            "Aggregated batch records"
        );
        Ok(aggregate)
    }

    /// Batches with assets, with progress and settlement state, newest first
    pub async fn list_batches_for_settlement(&self) -> AppResult<Vec<BatchForSettlement>> {
        let batches = self.store.list_batches().await?;
        let mut result = Vec::with_capacity(batches.len());

        for batch in batches {
            let assets = self.store.get_batch_assets(batch.id).await?;
            if assets.is_empty() {
                continue;
            }

            let counts = compute_unit_counts(&assets);
            let settlement = self.store.find_active_settlement(batch.id).await?;

            result.push(BatchForSettlement {
                id: batch.id,
                code: batch.code,
                client_reference: batch.client_reference,
                created_at: batch.created_at,
                total_assets: counts.total,
                sold_count: counts.sold,
                scrapped_count: counts.scrapped,
                pending_count: counts.pending,
                completion_pct: completion_pct(&counts),
                total_cost: compute_cost_base(&assets),
                total_sales: compute_sales_base(&assets),
                has_settlement: settlement.is_some(),
                settlement_status: settlement.map(|s| s.status),
            });
        }

        Ok(result)
    }
}
