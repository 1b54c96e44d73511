//! Inventory valuation service: ABC classification of unsold stock

use std::sync::Arc;

use shared::{
    build_abc_report, classify_abc, ensure_ranked, validate_groups, AbcReport, ClassifiedGroup,
    InventoryValueGroup,
};

use crate::error::{AppError, AppResult};
use crate::store::FinanceStore;

/// Inventory service for value-based stock classification
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn FinanceStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn FinanceStore>) -> Self {
        Self { store }
    }

    /// Rank current inventory groups by value and classify them
    pub async fn abc_report(&self) -> AppResult<AbcReport> {
        let groups = self.store.list_inventory_groups().await?;
        let report = build_abc_report(groups).map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::debug!(
            groups = report.groups.len(),
            class_a = report.class_a_count,
            class_b = report.class_b_count,
            class_c = report.class_c_count,
            "Built ABC report"
        );
        Ok(report)
    }

    /// Classify caller-supplied groups, which must already be ranked by value.
    ///
    /// Negative or oversized values and unranked input are rejected.
    pub fn classify(&self, groups: Vec<InventoryValueGroup>) -> AppResult<Vec<ClassifiedGroup>> {
        validate_groups(&groups)?;
        ensure_ranked(&groups)?;
        classify_abc(groups).map_err(AppError::from)
    }
}
