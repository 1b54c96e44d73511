//! Inventory valuation tests
//!
//! Tests for ABC classification including:
//! - Cumulative share boundaries (80% / 95%)
//! - Zero-value inventories
//! - Rejection of negative, oversized and unranked input
//! - Report built from stored assets

mod common;

use asset_recovery_backend::services::InventoryService;
use asset_recovery_backend::AppError;
use common::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{classify_abc, rank_by_value, AbcClass, InventoryValueGroup};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_report_from_stored_inventory() {
        let store = memory_store();
        let batch_id = seed_batch(&store, "LOT-INV").await;
        // 8 pending units worth 8 000, 1 sold unit that must not count
        for _ in 0..8 {
            seed_asset(&store, batch_id, "pending", 1_000, None).await;
        }
        seed_asset(&store, batch_id, "sold", 1_000, Some(1_500)).await;

        let report = InventoryService::new(as_dyn(&store))
            .abc_report()
            .await
            .unwrap();

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.total_value, dec(8_000));
        assert_eq!(report.total_units, 8);
        // A single group is 100% of value
        assert_eq!(report.groups[0].abc_class, AbcClass::C);
        assert_eq!(report.class_c_count, 1);
    }

    #[tokio::test]
    async fn test_empty_inventory_report() {
        let store = memory_store();
        let report = InventoryService::new(as_dyn(&store))
            .abc_report()
            .await
            .unwrap();
        assert!(report.groups.is_empty());
        assert_eq!(report.total_value, Decimal::ZERO);
        assert_eq!(report.class_a_count + report.class_b_count + report.class_c_count, 0);
    }

    #[test]
    fn test_five_equal_groups() {
        let store = memory_store();
        let groups: Vec<InventoryValueGroup> = (0..5)
            .map(|i| InventoryValueGroup::new(format!("group-{}", i), dec(100), 1))
            .collect();

        let classes: Vec<AbcClass> = InventoryService::new(as_dyn(&store))
            .classify(groups)
            .unwrap()
            .into_iter()
            .map(|g| g.abc_class)
            .collect();

        use AbcClass::*;
        assert_eq!(classes, vec![A, A, A, A, C]);
    }

    #[test]
    fn test_classify_rejects_invalid_groups() {
        let store = memory_store();
        let service = InventoryService::new(as_dyn(&store));
        let field_of = |groups: Vec<InventoryValueGroup>| match service.classify(groups) {
            Err(AppError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {:?}", other),
        };

        let negative = vec![
            InventoryValueGroup::new("laptops", dec(100), 1),
            InventoryValueGroup::new("returns", dec(-40), 1),
        ];
        assert_eq!(field_of(negative), "total_cost_value");

        let oversized = vec![
            InventoryValueGroup::new("huge", Decimal::MAX, 1),
            InventoryValueGroup::new("one", Decimal::ONE, 1),
        ];
        assert_eq!(field_of(oversized), "total_cost_value");

        let unranked = vec![
            InventoryValueGroup::new("small", dec(10), 1),
            InventoryValueGroup::new("large", dec(500), 1),
        ];
        assert_eq!(field_of(unranked), "groups");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn value_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn ranked_groups(values: Vec<Decimal>) -> Vec<InventoryValueGroup> {
        let mut groups: Vec<InventoryValueGroup> = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| InventoryValueGroup::new(format!("group-{}", i), v, 1))
            .collect();
        rank_by_value(&mut groups);
        groups
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Classes never improve further down the ranking
        #[test]
        fn prop_classes_are_monotonic(values in prop::collection::vec(value_strategy(), 0..40)) {
            let classified = classify_abc(ranked_groups(values)).unwrap();
            let rank = |class: AbcClass| match class {
                AbcClass::A => 0,
                AbcClass::B => 1,
                AbcClass::C => 2,
            };
            for pair in classified.windows(2) {
                prop_assert!(rank(pair[0].abc_class) <= rank(pair[1].abc_class));
            }
        }

        /// The last group always reaches 100% and is class C
        #[test]
        fn prop_last_group_is_class_c(values in prop::collection::vec(value_strategy(), 1..40)) {
            let total: Decimal = values.iter().sum();
            let classified = classify_abc(ranked_groups(values)).unwrap();
            let last = classified.last().unwrap();
            prop_assert_eq!(last.abc_class, AbcClass::C);
            if total > Decimal::ZERO {
                prop_assert_eq!(last.cumulative_pct, Decimal::ONE_HUNDRED);
            }
        }

        /// Classification keeps every group and its order
        #[test]
        fn prop_classification_preserves_groups(values in prop::collection::vec(value_strategy(), 0..40)) {
            let groups = ranked_groups(values);
            let keys: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
            let classified = classify_abc(groups).unwrap();
            let classified_keys: Vec<String> =
                classified.iter().map(|g| g.group.key.clone()).collect();
            prop_assert_eq!(keys, classified_keys);
        }
    }
}
