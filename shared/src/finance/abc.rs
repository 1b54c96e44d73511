//! ABC classification of inventory value groups

use rust_decimal::Decimal;
use thiserror::Error;

use crate::finance::{checked_sum, percentage, round_pct};
use crate::models::{AbcClass, AbcReport, ClassifiedGroup, InventoryValueGroup};
use crate::validation::validate_amount;

/// Cumulative share (inclusive) up to which groups are class A
pub const CLASS_A_CUMULATIVE_PCT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
/// Cumulative share (inclusive) up to which groups are class B
pub const CLASS_B_CUMULATIVE_PCT: Decimal = Decimal::from_parts(95, 0, 0, false, 0);

/// Reasons a set of value groups cannot be classified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbcError {
    #[error("{key}: {message}")]
    InvalidValue { key: String, message: &'static str },

    #[error("groups must be ranked by value, highest first ('{0}' is out of order)")]
    NotRanked(String),

    #[error("{0} is out of range")]
    Overflow(&'static str),
}

impl AbcError {
    pub fn field(&self) -> &'static str {
        match self {
            AbcError::InvalidValue { .. } => "total_cost_value",
            AbcError::NotRanked(_) => "groups",
            AbcError::Overflow(field) => field,
        }
    }
}

/// Check that every group carries a valid, non-negative value
pub fn validate_groups(groups: &[InventoryValueGroup]) -> Result<(), AbcError> {
    for group in groups {
        validate_amount(group.total_cost_value).map_err(|message| AbcError::InvalidValue {
            key: group.key.clone(),
            message,
        })?;
    }
    Ok(())
}

/// Check that groups are ordered by value, highest first
pub fn ensure_ranked(groups: &[InventoryValueGroup]) -> Result<(), AbcError> {
    match groups
        .windows(2)
        .find(|pair| pair[1].total_cost_value > pair[0].total_cost_value)
    {
        Some(pair) => Err(AbcError::NotRanked(pair[1].key.clone())),
        None => Ok(()),
    }
}

/// Order groups by value, highest first. Ties keep their input order.
pub fn rank_by_value(groups: &mut [InventoryValueGroup]) {
    groups.sort_by(|a, b| b.total_cost_value.cmp(&a.total_cost_value));
}

/// Classify groups that are already ranked by value (highest first).
///
/// Each group's class comes from the cumulative value of itself and every
/// group ranked before it, so the same value can land in different classes
/// depending on its position. With no value at all, everything is class C.
/// Fails only when the total value does not fit in a `Decimal`.
pub fn classify_abc(groups: Vec<InventoryValueGroup>) -> Result<Vec<ClassifiedGroup>, AbcError> {
    let total_value = checked_sum(groups.iter().map(|g| g.total_cost_value))
        .ok_or(AbcError::Overflow("total_value"))?;

    if total_value <= Decimal::ZERO {
        return Ok(groups
            .into_iter()
            .map(|group| ClassifiedGroup {
                group,
                abc_class: AbcClass::C,
                cumulative_pct: Decimal::ZERO,
            })
            .collect());
    }

    // Prefix sums stay below the total unless values are negative
    let mut cumulative_value = Decimal::ZERO;
    let classified = groups
        .into_iter()
        .map(|group| {
            cumulative_value = cumulative_value.saturating_add(group.total_cost_value);
            let cumulative_pct = percentage(cumulative_value, total_value);
            let abc_class = if cumulative_pct <= CLASS_A_CUMULATIVE_PCT {
                AbcClass::A
            } else if cumulative_pct <= CLASS_B_CUMULATIVE_PCT {
                AbcClass::B
            } else {
                AbcClass::C
            };
            ClassifiedGroup {
                group,
                abc_class,
                cumulative_pct: round_pct(cumulative_pct),
            }
        })
        .collect();
    Ok(classified)
}

/// Rank, classify and summarise a set of value groups
pub fn build_abc_report(mut groups: Vec<InventoryValueGroup>) -> Result<AbcReport, AbcError> {
    rank_by_value(&mut groups);

    let total_value = checked_sum(groups.iter().map(|g| g.total_cost_value))
        .ok_or(AbcError::Overflow("total_value"))?;
    let total_units = groups
        .iter()
        .try_fold(0u32, |total, g| total.checked_add(g.total_quantity))
        .ok_or(AbcError::Overflow("total_units"))?;
    let classified = classify_abc(groups)?;

    let count = |class: AbcClass| classified.iter().filter(|g| g.abc_class == class).count() as u32;

    Ok(AbcReport {
        class_a_count: count(AbcClass::A),
        class_b_count: count(AbcClass::B),
        class_c_count: count(AbcClass::C),
        total_value,
        total_units,
        groups: classified,
    })
}
