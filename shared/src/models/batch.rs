//! Batch (lot) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SettlementStatus;

/// A lot of assets acquired from one client and resold together.
///
/// Unit counts and monetary totals are always derived from the assets and
/// ledger entries, never stored here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Batch {
    pub id: Uuid,
    /// Human readable code (e.g., "LOT-2024-0042")
    pub code: String,
    pub client_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Batch overview used to pick lots that are ready to settle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchForSettlement {
    pub id: Uuid,
    pub code: String,
    pub client_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_assets: u32,
    pub sold_count: u32,
    pub scrapped_count: u32,
    pub pending_count: u32,
    /// Share of units sold or scrapped (0-100, one decimal)
    pub completion_pct: Decimal,
    pub total_cost: Decimal,
    pub total_sales: Decimal,
    pub has_settlement: bool,
    pub settlement_status: Option<SettlementStatus>,
}
