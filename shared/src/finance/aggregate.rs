//! Reduction of batch records into counts and monetary totals

use rust_decimal::Decimal;

use crate::finance::unit_pct;
use crate::models::{
    AssetRecord, AssetStatus, Batch, ExpenseCategory, ExpenseEntry, ExpenseMap, RevenueEntry,
    RevenueKind,
};
use crate::types::UnitCounts;

/// Count units by status. Anything not sold or scrapped is pending.
pub fn compute_unit_counts(assets: &[AssetRecord]) -> UnitCounts {
    assets.iter().fold(UnitCounts::default(), |mut counts, asset| {
        counts.total += 1;
        match asset.status {
            AssetStatus::Sold => counts.sold += 1,
            AssetStatus::Scrapped => counts.scrapped += 1,
            AssetStatus::Pending | AssetStatus::Other(_) => counts.pending += 1,
        }
        counts
    })
}

/// Sum of per-unit acquisition cost
pub fn compute_cost_base(assets: &[AssetRecord]) -> Decimal {
    assets.iter().map(|a| a.cost_amount).sum()
}

/// Sum of sale prices over sold units; unpriced sales count as zero
pub fn compute_sales_base(assets: &[AssetRecord]) -> Decimal {
    assets.iter().map(AssetRecord::realized_revenue).sum()
}

/// Share of units that are sold or scrapped (one decimal)
pub fn completion_pct(counts: &UnitCounts) -> Decimal {
    unit_pct(counts.closed(), counts.total)
}

/// Everything the P&L needs about one batch, reduced from its records
#[derive(Debug, Clone)]
pub struct BatchAggregate {
    pub batch: Batch,
    pub counts: UnitCounts,
    /// Σ cost_amount over the batch's assets
    pub cost_base: Decimal,
    /// Σ sale_price over sold assets
    pub sales_base: Decimal,
    pub expenses: ExpenseMap,
    pub sale_override: Option<Decimal>,
    pub scrap_override: Option<Decimal>,
}

impl BatchAggregate {
    pub fn from_records(
        batch: Batch,
        assets: &[AssetRecord],
        expenses: &[ExpenseEntry],
        revenues: &[RevenueEntry],
    ) -> Self {
        let revenue_for = |kind: RevenueKind| {
            revenues
                .iter()
                .filter(|r| r.kind == kind)
                .last()
                .map(|r| r.amount)
        };

        Self {
            batch,
            counts: compute_unit_counts(assets),
            cost_base: compute_cost_base(assets),
            sales_base: compute_sales_base(assets),
            expenses: ExpenseMap::from_entries(expenses),
            sale_override: revenue_for(RevenueKind::Sale),
            scrap_override: revenue_for(RevenueKind::Scrap),
        }
    }

    /// Recorded acquisition expense if present, else the asset cost base
    pub fn acquisition_cost(&self) -> Decimal {
        self.expenses
            .explicit(ExpenseCategory::Acquisition)
            .unwrap_or(self.cost_base)
    }

    /// Revenue override if present, else the realized sales
    pub fn gross_revenue(&self) -> Decimal {
        self.sale_override.unwrap_or(self.sales_base)
    }

    pub fn scrap_revenue(&self) -> Decimal {
        self.scrap_override.unwrap_or(Decimal::ZERO)
    }
}
