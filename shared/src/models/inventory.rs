//! Inventory valuation models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock grouped by a descriptive key with its total book value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryValueGroup {
    /// Grouping key (e.g., "Dell Latitude 5490 Laptop")
    pub key: String,
    pub total_cost_value: Decimal,
    pub total_quantity: u32,
}

impl InventoryValueGroup {
    pub fn new(key: impl Into<String>, total_cost_value: Decimal, total_quantity: u32) -> Self {
        Self {
            key: key.into(),
            total_cost_value,
            total_quantity,
        }
    }
}

/// ABC value tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbcClass {
    /// Groups making up the first 80% of cumulative value
    A,
    /// Groups between 80% and 95%
    B,
    /// The long tail
    C,
}

impl std::fmt::Display for AbcClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbcClass::A => write!(f, "A"),
            AbcClass::B => write!(f, "B"),
            AbcClass::C => write!(f, "C"),
        }
    }
}

/// A value group with its ABC tier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedGroup {
    #[serde(flatten)]
    pub group: InventoryValueGroup,
    pub abc_class: AbcClass,
    /// Cumulative share of total value up to and including this group
    pub cumulative_pct: Decimal,
}

/// Classified inventory with headline figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbcReport {
    pub groups: Vec<ClassifiedGroup>,
    pub total_value: Decimal,
    pub total_units: u32,
    pub class_a_count: u32,
    pub class_b_count: u32,
    pub class_c_count: u32,
}
