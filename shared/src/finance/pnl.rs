//! Profit and loss calculation for a batch

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::finance::{
    checked_sum, percentage, round_amount, round_pct, safe_divide, unit_pct, BatchAggregate,
};
use crate::models::{ExpenseCategory, ExpenseMap};
use crate::types::UnitCounts;
use crate::validation::MAX_AMOUNT;

/// Inputs to the P&L, already resolved from overrides and defaults
#[derive(Debug, Clone)]
pub struct PnLInput {
    pub batch_id: Uuid,
    pub batch_code: String,
    pub counts: UnitCounts,
    pub gross_revenue: Decimal,
    pub scrap_revenue: Decimal,
    pub acquisition_cost: Decimal,
    /// Operating expenses; the acquisition slot is ignored here
    pub expenses: ExpenseMap,
}

impl From<&BatchAggregate> for PnLInput {
    fn from(aggregate: &BatchAggregate) -> Self {
        Self {
            batch_id: aggregate.batch.id,
            batch_code: aggregate.batch.code.clone(),
            counts: aggregate.counts,
            gross_revenue: aggregate.gross_revenue(),
            scrap_revenue: aggregate.scrap_revenue(),
            acquisition_cost: aggregate.acquisition_cost(),
            expenses: aggregate.expenses,
        }
    }
}

/// Complete P&L breakdown of a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PnLResult {
    pub batch_id: Uuid,
    pub batch_code: String,

    // Units
    pub total_units: u32,
    pub units_sold: u32,
    pub units_scrapped: u32,
    pub units_pending: u32,
    pub sell_through_pct: Decimal,

    // Revenue
    pub gross_revenue: Decimal,
    pub scrap_revenue: Decimal,
    pub total_revenue: Decimal,

    // Costs
    pub acquisition_cost: Decimal,
    pub logistics_cost: Decimal,
    pub parts_cost: Decimal,
    pub labor_cost: Decimal,
    pub data_wipe_cost: Decimal,
    pub marketing_cost: Decimal,
    /// Storage plus uncategorised costs
    pub other_costs: Decimal,
    pub total_expenses: Decimal,

    // Margins
    pub gross_profit: Decimal,
    pub operating_profit: Decimal,
    pub net_profit: Decimal,
    pub profit_margin_pct: Decimal,

    // Averages
    pub avg_sale_price: Decimal,
    pub avg_cost_per_unit: Decimal,
}

/// Reasons a P&L handed in from outside cannot be stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PnLError {
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),

    #[error("{0} exceeds the maximum accepted amount")]
    AmountTooLarge(&'static str),

    #[error("unit counts do not add up to total_units")]
    UnitsMismatch,

    #[error("{0} does not match its components")]
    Inconsistent(&'static str),

    #[error("{0} is out of range")]
    Overflow(&'static str),
}

impl PnLError {
    pub fn field(&self) -> &'static str {
        match self {
            PnLError::NegativeAmount(field)
            | PnLError::AmountTooLarge(field)
            | PnLError::Inconsistent(field)
            | PnLError::Overflow(field) => field,
            PnLError::UnitsMismatch => "total_units",
        }
    }
}

/// Compute the P&L. Every ratio is guarded; only profits can go negative.
pub fn calculate_pnl(input: &PnLInput) -> PnLResult {
    let expenses = &input.expenses;
    let counts = input.counts;

    let logistics_cost = expenses.get(ExpenseCategory::Logistics);
    let parts_cost = expenses.get(ExpenseCategory::Parts);
    let labor_cost = expenses.get(ExpenseCategory::Labor);
    let data_wipe_cost = expenses.get(ExpenseCategory::DataWipe);
    let marketing_cost = expenses.get(ExpenseCategory::Marketing);
    let other_costs = expenses.get(ExpenseCategory::Storage) + expenses.get(ExpenseCategory::Other);
    let total_expenses = expenses.total_operating();

    let gross_profit = input.gross_revenue - input.acquisition_cost;
    let operating_profit = gross_profit - total_expenses;
    let net_profit = operating_profit + input.scrap_revenue;

    PnLResult {
        batch_id: input.batch_id,
        batch_code: input.batch_code.clone(),
        total_units: counts.total,
        units_sold: counts.sold,
        units_scrapped: counts.scrapped,
        units_pending: counts.pending,
        sell_through_pct: unit_pct(counts.sold, counts.total),
        gross_revenue: input.gross_revenue,
        scrap_revenue: input.scrap_revenue,
        total_revenue: input.gross_revenue + input.scrap_revenue,
        acquisition_cost: input.acquisition_cost,
        logistics_cost,
        parts_cost,
        labor_cost,
        data_wipe_cost,
        marketing_cost,
        other_costs,
        total_expenses,
        gross_profit,
        operating_profit,
        net_profit,
        profit_margin_pct: round_pct(percentage(net_profit, input.gross_revenue)),
        avg_sale_price: round_amount(safe_divide(
            input.gross_revenue,
            Decimal::from(counts.sold),
        )),
        avg_cost_per_unit: round_amount(safe_divide(
            input.acquisition_cost,
            Decimal::from(counts.total),
        )),
    }
}

impl PnLResult {
    /// Check that a P&L received from a caller is internally consistent
    pub fn verify(&self) -> Result<(), PnLError> {
        let amounts = [
            ("gross_revenue", self.gross_revenue),
            ("scrap_revenue", self.scrap_revenue),
            ("acquisition_cost", self.acquisition_cost),
            ("logistics_cost", self.logistics_cost),
            ("parts_cost", self.parts_cost),
            ("labor_cost", self.labor_cost),
            ("data_wipe_cost", self.data_wipe_cost),
            ("marketing_cost", self.marketing_cost),
            ("other_costs", self.other_costs),
        ];
        for (field, amount) in amounts {
            if amount < Decimal::ZERO {
                return Err(PnLError::NegativeAmount(field));
            }
            if amount > MAX_AMOUNT {
                return Err(PnLError::AmountTooLarge(field));
            }
        }

        let units = self
            .units_sold
            .checked_add(self.units_scrapped)
            .and_then(|n| n.checked_add(self.units_pending));
        if units != Some(self.total_units) {
            return Err(PnLError::UnitsMismatch);
        }

        let operating_sum = checked_sum([
            self.logistics_cost,
            self.parts_cost,
            self.labor_cost,
            self.data_wipe_cost,
            self.marketing_cost,
            self.other_costs,
        ])
        .ok_or(PnLError::Overflow("total_expenses"))?;
        if self.total_expenses != operating_sum {
            return Err(PnLError::Inconsistent("total_expenses"));
        }

        let total_revenue = self
            .gross_revenue
            .checked_add(self.scrap_revenue)
            .ok_or(PnLError::Overflow("total_revenue"))?;
        if self.total_revenue != total_revenue {
            return Err(PnLError::Inconsistent("total_revenue"));
        }

        let gross_profit = self
            .gross_revenue
            .checked_sub(self.acquisition_cost)
            .ok_or(PnLError::Overflow("gross_profit"))?;
        if self.gross_profit != gross_profit {
            return Err(PnLError::Inconsistent("gross_profit"));
        }

        let operating_profit = gross_profit
            .checked_sub(operating_sum)
            .ok_or(PnLError::Overflow("operating_profit"))?;
        if self.operating_profit != operating_profit {
            return Err(PnLError::Inconsistent("operating_profit"));
        }

        let net_profit = operating_profit
            .checked_add(self.scrap_revenue)
            .ok_or(PnLError::Overflow("net_profit"))?;
        if self.net_profit != net_profit {
            return Err(PnLError::Inconsistent("net_profit"));
        }
        if self.profit_margin_pct != round_pct(percentage(self.net_profit, self.gross_revenue)) {
            return Err(PnLError::Inconsistent("profit_margin_pct"));
        }
        if self.sell_through_pct != unit_pct(self.units_sold, self.total_units) {
            return Err(PnLError::Inconsistent("sell_through_pct"));
        }

        Ok(())
    }

    pub fn is_profitable(&self) -> bool {
        self.net_profit > Decimal::ZERO
    }
}
