//! Portfolio-level figures over settled batches

use rust_decimal::Decimal;

use crate::finance::{checked_sum, percentage, round_amount, PnLError};
use crate::models::{FinancialSummary, SettlementSnapshot, SettlementStatus};

/// Summarise settlements that have been finalized (or paid afterwards)
pub fn summarize_settlements(
    settlements: &[SettlementSnapshot],
    healthy_margin_pct: Decimal,
) -> Result<FinancialSummary, PnLError> {
    let settled: Vec<&SettlementSnapshot> = settlements
        .iter()
        .filter(|s| matches!(s.status, SettlementStatus::Finalized | SettlementStatus::Paid))
        .collect();

    let total = |field: &'static str, value: fn(&SettlementSnapshot) -> Decimal| {
        checked_sum(settled.iter().map(|s| value(s))).ok_or(PnLError::Overflow(field))
    };
    let total_revenue = total("total_revenue", |s| s.figures.total_revenue)?;
    let total_expenses = total("total_expenses", |s| s.figures.total_expenses)?;
    let total_profit = total("total_profit", |s| s.figures.net_profit)?;
    let healthy_count = settled
        .iter()
        .filter(|s| s.figures.profit_margin_pct >= healthy_margin_pct)
        .count() as u32;

    Ok(FinancialSummary {
        settlement_count: settled.len() as u32,
        total_revenue,
        total_expenses,
        total_profit,
        avg_margin_pct: round_amount(percentage(total_profit, total_revenue)),
        healthy_margin_pct,
        healthy_count,
    })
}
