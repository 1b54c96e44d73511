//! Settlement models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::finance::PnLResult;

/// Lifecycle status of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Draft,
    Finalized,
    /// Set by the payments collaborator; never written by this engine
    Paid,
    Cancelled,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Draft => "draft",
            SettlementStatus::Finalized => "finalized",
            SettlementStatus::Paid => "paid",
            SettlementStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(SettlementStatus::Draft),
            "finalized" => Some(SettlementStatus::Finalized),
            "paid" => Some(SettlementStatus::Paid),
            "cancelled" => Some(SettlementStatus::Cancelled),
            _ => None,
        }
    }

    /// Every status except `cancelled` blocks a new settlement for the batch
    pub fn is_active(&self) -> bool {
        !matches!(self, SettlementStatus::Cancelled)
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frozen financial figures of a settlement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementFigures {
    pub total_units: u32,
    pub units_sold: u32,
    pub units_scrapped: u32,
    pub units_pending: u32,
    pub gross_revenue: Decimal,
    pub scrap_revenue: Decimal,
    pub total_revenue: Decimal,
    pub acquisition_cost: Decimal,
    pub logistics_cost: Decimal,
    pub parts_cost: Decimal,
    pub labor_cost: Decimal,
    /// Parts plus labor
    pub refurbishing_cost: Decimal,
    pub data_wipe_cost: Decimal,
    pub marketing_cost: Decimal,
    pub other_costs: Decimal,
    pub total_expenses: Decimal,
    pub gross_profit: Decimal,
    pub operating_profit: Decimal,
    pub net_profit: Decimal,
    pub profit_margin_pct: Decimal,
}

impl From<&PnLResult> for SettlementFigures {
    fn from(pnl: &PnLResult) -> Self {
        Self {
            total_units: pnl.total_units,
            units_sold: pnl.units_sold,
            units_scrapped: pnl.units_scrapped,
            units_pending: pnl.units_pending,
            gross_revenue: pnl.gross_revenue,
            scrap_revenue: pnl.scrap_revenue,
            total_revenue: pnl.total_revenue,
            acquisition_cost: pnl.acquisition_cost,
            logistics_cost: pnl.logistics_cost,
            parts_cost: pnl.parts_cost,
            labor_cost: pnl.labor_cost,
            refurbishing_cost: pnl.parts_cost + pnl.labor_cost,
            data_wipe_cost: pnl.data_wipe_cost,
            marketing_cost: pnl.marketing_cost,
            other_costs: pnl.other_costs,
            total_expenses: pnl.total_expenses,
            gross_profit: pnl.gross_profit,
            operating_profit: pnl.operating_profit,
            net_profit: pnl.net_profit,
            profit_margin_pct: pnl.profit_margin_pct,
        }
    }
}

/// A persisted P&L snapshot for one batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementSnapshot {
    pub id: Uuid,
    /// Sequential human readable number (e.g., "LIQ-2024-00017")
    pub settlement_number: String,
    pub batch_id: Uuid,
    pub status: SettlementStatus,
    #[serde(flatten)]
    pub figures: SettlementFigures,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub finalized_by: Option<Uuid>,
}

/// Snapshot data handed to the store; number, id and timestamps are assigned there
#[derive(Debug, Clone)]
pub struct NewSettlement {
    pub batch_id: Uuid,
    pub figures: SettlementFigures,
    pub created_by: Option<Uuid>,
}

/// Input for creating a settlement from a computed P&L
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSettlementInput {
    pub batch_id: Uuid,
    pub pnl: PnLResult,
}

/// Aggregate figures over finalized settlements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    pub settlement_count: u32,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub total_profit: Decimal,
    /// Whole-percent margin of total profit over total revenue
    pub avg_margin_pct: Decimal,
    pub healthy_margin_pct: Decimal,
    /// Settlements whose margin reached `healthy_margin_pct`
    pub healthy_count: u32,
}

/// Generate a settlement number: PREFIX-YYYY-NNNNN
pub fn generate_settlement_number(prefix: &str, year: i32, sequence: i64) -> String {
    format!("{}-{}-{:05}", prefix, year, sequence)
}
