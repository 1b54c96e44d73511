//! Expense and revenue ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::BatchTotalKind;

/// Cost categories a batch can be charged with.
///
/// The set is closed: an unknown category is rejected at the boundary instead
/// of silently falling out of the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Acquisition,
    Logistics,
    Parts,
    Labor,
    DataWipe,
    Storage,
    Marketing,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        ExpenseCategory::Acquisition,
        ExpenseCategory::Logistics,
        ExpenseCategory::Parts,
        ExpenseCategory::Labor,
        ExpenseCategory::DataWipe,
        ExpenseCategory::Storage,
        ExpenseCategory::Marketing,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Acquisition => "acquisition",
            ExpenseCategory::Logistics => "logistics",
            ExpenseCategory::Parts => "parts",
            ExpenseCategory::Labor => "labor",
            ExpenseCategory::DataWipe => "data_wipe",
            ExpenseCategory::Storage => "storage",
            ExpenseCategory::Marketing => "marketing",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "acquisition" => Some(ExpenseCategory::Acquisition),
            "logistics" => Some(ExpenseCategory::Logistics),
            "parts" => Some(ExpenseCategory::Parts),
            "labor" => Some(ExpenseCategory::Labor),
            "data_wipe" => Some(ExpenseCategory::DataWipe),
            "storage" => Some(ExpenseCategory::Storage),
            "marketing" => Some(ExpenseCategory::Marketing),
            "other" => Some(ExpenseCategory::Other),
            _ => None,
        }
    }

    /// Operating categories are everything except the acquisition cost
    pub fn is_operating(&self) -> bool {
        !matches!(self, ExpenseCategory::Acquisition)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single active amount for a (batch, category) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseEntry {
    pub batch_id: Uuid,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Amount per expense category, missing categories reading as zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpenseMap {
    amounts: [Option<Decimal>; 8],
}

impl ExpenseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ledger entries; a later entry for the same category wins
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ExpenseEntry>) -> Self {
        let mut map = Self::new();
        for entry in entries {
            map.set(entry.category, entry.amount);
        }
        map
    }

    pub fn set(&mut self, category: ExpenseCategory, amount: Decimal) {
        self.amounts[category.index()] = Some(amount);
    }

    pub fn with(mut self, category: ExpenseCategory, amount: Decimal) -> Self {
        self.set(category, amount);
        self
    }

    /// Explicitly recorded amount, if any
    pub fn explicit(&self, category: ExpenseCategory) -> Option<Decimal> {
        self.amounts[category.index()]
    }

    pub fn get(&self, category: ExpenseCategory) -> Decimal {
        self.explicit(category).unwrap_or(Decimal::ZERO)
    }

    /// Sum of every operating category (acquisition excluded).
    ///
    /// Ledger amounts are capped at `MAX_AMOUNT` on entry, so the sum fits.
    pub fn total_operating(&self) -> Decimal {
        ExpenseCategory::ALL
            .iter()
            .filter(|c| c.is_operating())
            .map(|c| self.get(*c))
            .sum()
    }
}

/// Revenue streams that can be set explicitly on a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueKind {
    /// Gross sale revenue, overriding the sum of asset sale prices
    Sale,
    /// Revenue from selling scrapped units as material
    Scrap,
}

impl RevenueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueKind::Sale => "sale",
            RevenueKind::Scrap => "scrap",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(RevenueKind::Sale),
            "scrap" => Some(RevenueKind::Scrap),
            _ => None,
        }
    }
}

/// The single active amount for a (batch, revenue kind) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueEntry {
    pub batch_id: Uuid,
    pub kind: RevenueKind,
    pub amount: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Ledger key a batch-total quick edit is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKey {
    Expense(ExpenseCategory),
    Revenue(RevenueKind),
}

impl From<BatchTotalKind> for LedgerKey {
    fn from(kind: BatchTotalKind) -> Self {
        match kind {
            BatchTotalKind::Cost => LedgerKey::Expense(ExpenseCategory::Acquisition),
            BatchTotalKind::Revenue => LedgerKey::Revenue(RevenueKind::Sale),
            BatchTotalKind::Scrap => LedgerKey::Revenue(RevenueKind::Scrap),
        }
    }
}

/// Input for setting one expense category of a batch
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetExpenseInput {
    pub category: ExpenseCategory,
    #[validate(custom = "crate::validation::validate_non_negative_amount")]
    pub amount: Decimal,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Input for adjusting a batch-level total (acquisition cost or revenue)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateBatchTotalsInput {
    #[serde(rename = "type")]
    pub kind: BatchTotalKind,
    #[validate(custom = "crate::validation::validate_non_negative_amount")]
    pub amount: Decimal,
}
