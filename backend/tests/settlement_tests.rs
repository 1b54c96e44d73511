//! Settlement lifecycle tests
//!
//! Tests for settlement creation and finalization including:
//! - One active settlement per batch
//! - Finalize succeeds at most once, also under concurrency
//! - Ledger quick edits locked once a settlement exists, also under concurrency
//! - Portfolio summary over finalized settlements

mod common;

use std::sync::Arc;

use asset_recovery_backend::services::{PnLService, SettlementService};
use asset_recovery_backend::store::FinanceStore;
use asset_recovery_backend::AppError;
use common::*;
use rust_decimal::Decimal;
use shared::{
    BatchTotalKind, ExpenseCategory, PnLResult, SetExpenseInput, SettlementStatus,
    UpdateBatchTotalsInput,
};
use uuid::Uuid;

struct Fixture {
    store: Arc<asset_recovery_backend::store::MemoryFinanceStore>,
    service: SettlementService,
    batch_id: Uuid,
    pnl: PnLResult,
}

async fn fixture() -> Fixture {
    let store = memory_store();
    let batch_id = seed_reference_batch(&store).await;
    let service = SettlementService::new(as_dyn(&store));
    service
        .set_batch_expense(
            batch_id,
            SetExpenseInput {
                category: ExpenseCategory::Logistics,
                amount: dec(500),
                description: Some("Freight".to_string()),
            },
        )
        .await
        .unwrap();
    service
        .set_batch_expense(
            batch_id,
            SetExpenseInput {
                category: ExpenseCategory::Parts,
                amount: dec(300),
                description: None,
            },
        )
        .await
        .unwrap();
    let pnl = PnLService::new(as_dyn(&store))
        .calculate_lot_pnl(batch_id)
        .await
        .unwrap();

    Fixture {
        store,
        service,
        batch_id,
        pnl,
    }
}

fn is_conflict<T: std::fmt::Debug>(result: &Result<T, AppError>) -> bool {
    matches!(result, Err(AppError::Conflict { .. }))
}

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_create_settlement_freezes_pnl() {
    let f = fixture().await;
    let actor = Uuid::new_v4();

    let settlement = f
        .service
        .create_settlement(f.batch_id, &f.pnl, Some(actor))
        .await
        .unwrap();

    assert_eq!(settlement.status, SettlementStatus::Draft);
    assert!(settlement.settlement_number.starts_with("LIQ-"));
    assert!(settlement.settlement_number.ends_with("-00001"));
    assert_eq!(settlement.created_by, Some(actor));
    assert_eq!(settlement.figures.net_profit, dec(4_200));
    assert_eq!(settlement.figures.profit_margin_pct, dec(28));
    assert_eq!(settlement.figures.refurbishing_cost, dec(300));
    assert!(settlement.finalized_at.is_none());
}

#[tokio::test]
async fn test_duplicate_create_is_conflict() {
    let f = fixture().await;
    f.service
        .create_settlement(f.batch_id, &f.pnl, None)
        .await
        .unwrap();

    let second = f.service.create_settlement(f.batch_id, &f.pnl, None).await;
    assert!(is_conflict(&second));
    assert_eq!(f.service.list_settlements().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_creates_store_one_settlement() {
    let f = fixture().await;
    let other = SettlementService::new(as_dyn(&f.store));

    let (a, b) = tokio::join!(
        f.service.create_settlement(f.batch_id, &f.pnl, None),
        other.create_settlement(f.batch_id, &f.pnl, None),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(f.service.list_settlements().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_for_unknown_batch_is_not_found() {
    let f = fixture().await;
    let result = f
        .service
        .create_settlement(Uuid::new_v4(), &f.pnl, None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_create_rejects_pnl_of_other_batch() {
    let f = fixture().await;
    let mut pnl = f.pnl.clone();
    pnl.batch_id = Uuid::new_v4();

    let result = f.service.create_settlement(f.batch_id, &pnl, None).await;
    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "batch_id"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_rejects_pnl_with_other_batch_code() {
    let f = fixture().await;
    let mut pnl = f.pnl.clone();
    pnl.batch_code = "LOT-STALE".to_string();

    let result = f.service.create_settlement(f.batch_id, &pnl, None).await;
    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "batch_code"),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(f.service.list_settlements().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_inconsistent_pnl() {
    let f = fixture().await;

    let mut negative = f.pnl.clone();
    negative.logistics_cost = dec(-500);
    let result = f.service.create_settlement(f.batch_id, &negative, None).await;
    assert!(matches!(result, Err(AppError::Validation { .. })));

    let mut tampered = f.pnl.clone();
    tampered.net_profit += dec(1_000);
    let result = f.service.create_settlement(f.batch_id, &tampered, None).await;
    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "net_profit"),
        other => panic!("expected validation error, got {:?}", other),
    }

    assert!(f.service.list_settlements().await.unwrap().is_empty());
}

// ============================================================================
// Finalization
// ============================================================================

#[tokio::test]
async fn test_finalize_stamps_actor_and_time() {
    let f = fixture().await;
    let draft = f
        .service
        .create_settlement(f.batch_id, &f.pnl, None)
        .await
        .unwrap();
    let actor = Uuid::new_v4();

    let finalized = f.service.finalize_settlement(draft.id, actor).await.unwrap();
    assert_eq!(finalized.status, SettlementStatus::Finalized);
    assert_eq!(finalized.finalized_by, Some(actor));
    assert!(finalized.finalized_at.is_some());
    assert_eq!(finalized.figures, draft.figures);
}

#[tokio::test]
async fn test_double_finalize_is_conflict_and_keeps_timestamp() {
    let f = fixture().await;
    let draft = f
        .service
        .create_settlement(f.batch_id, &f.pnl, None)
        .await
        .unwrap();

    let first = f
        .service
        .finalize_settlement(draft.id, Uuid::new_v4())
        .await
        .unwrap();
    let second = f.service.finalize_settlement(draft.id, Uuid::new_v4()).await;
    assert!(is_conflict(&second));

    let stored = f.service.get_settlement(draft.id).await.unwrap();
    assert_eq!(stored.finalized_at, first.finalized_at);
    assert_eq!(stored.finalized_by, first.finalized_by);
}

#[tokio::test]
async fn test_concurrent_finalize_has_one_winner() {
    let f = fixture().await;
    let draft = f
        .service
        .create_settlement(f.batch_id, &f.pnl, None)
        .await
        .unwrap();
    let other = SettlementService::new(as_dyn(&f.store));
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let (a, b) = tokio::join!(
        f.service.finalize_settlement(draft.id, alice),
        other.finalize_settlement(draft.id, bob),
    );

    assert!(a.is_ok() != b.is_ok());
    let winner = a.or(b).unwrap();
    let stored = f.service.get_settlement(draft.id).await.unwrap();
    assert_eq!(stored.finalized_by, winner.finalized_by);
    assert_eq!(stored.finalized_at, winner.finalized_at);
}

#[tokio::test]
async fn test_finalize_unknown_settlement_is_not_found() {
    let f = fixture().await;
    let result = f
        .service
        .finalize_settlement(Uuid::new_v4(), Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_frees_batch_for_new_settlement() {
    let f = fixture().await;
    let draft = f
        .service
        .create_settlement(f.batch_id, &f.pnl, None)
        .await
        .unwrap();

    let cancelled = f.service.cancel_settlement(draft.id).await.unwrap();
    assert_eq!(cancelled.status, SettlementStatus::Cancelled);
    assert!(cancelled.finalized_at.is_none());

    let replacement = f
        .service
        .create_settlement(f.batch_id, &f.pnl, None)
        .await
        .unwrap();
    assert_ne!(replacement.settlement_number, draft.settlement_number);

    let listed = f.service.list_settlements().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, replacement.id);
}

#[tokio::test]
async fn test_finalized_settlement_cannot_be_cancelled() {
    let f = fixture().await;
    let draft = f
        .service
        .create_settlement(f.batch_id, &f.pnl, None)
        .await
        .unwrap();
    f.service
        .finalize_settlement(draft.id, Uuid::new_v4())
        .await
        .unwrap();

    let result = f.service.cancel_settlement(draft.id).await;
    assert!(is_conflict(&result));
    let stored = f.service.get_settlement(draft.id).await.unwrap();
    assert_eq!(stored.status, SettlementStatus::Finalized);
}

// ============================================================================
// Ledger quick edits
// ============================================================================

#[tokio::test]
async fn test_negative_amount_is_rejected() {
    let f = fixture().await;
    let result = f
        .service
        .update_batch_totals(
            f.batch_id,
            UpdateBatchTotalsInput {
                kind: BatchTotalKind::Revenue,
                amount: dec(-1),
            },
        )
        .await;
    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "amount"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_edit_unknown_batch_is_not_found() {
    let f = fixture().await;
    let result = f
        .service
        .set_batch_expense(
            Uuid::new_v4(),
            SetExpenseInput {
                category: ExpenseCategory::Marketing,
                amount: dec(10),
                description: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_edits_locked_while_settlement_active() {
    let f = fixture().await;
    let draft = f
        .service
        .create_settlement(f.batch_id, &f.pnl, None)
        .await
        .unwrap();

    let edit = || {
        f.service.set_batch_expense(
            f.batch_id,
            SetExpenseInput {
                category: ExpenseCategory::Marketing,
                amount: dec(75),
                description: None,
            },
        )
    };

    assert!(is_conflict(&edit().await));

    f.service.cancel_settlement(draft.id).await.unwrap();
    let entry = edit().await.unwrap();
    assert_eq!(entry.amount, dec(75));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_edits_racing_creation_never_land_after_it() {
    for round in 0..20 {
        let f = fixture().await;
        let creator = f.service.clone();
        let editor = f.service.clone();
        let (batch_id, pnl) = (f.batch_id, f.pnl.clone());

        let create =
            tokio::spawn(async move { creator.create_settlement(batch_id, &pnl, None).await });
        let edit = tokio::spawn(async move {
            let mut outcomes = Vec::new();
            for amount in 1..=10 {
                outcomes.push(
                    editor
                        .set_batch_expense(
                            batch_id,
                            SetExpenseInput {
                                category: ExpenseCategory::Marketing,
                                amount: dec(amount),
                                description: None,
                            },
                        )
                        .await,
                );
            }
            outcomes
        });

        let settlement = create.await.unwrap().unwrap();
        let outcomes = edit.await.unwrap();

        // Once one edit is refused, every later edit is refused too
        let first_locked = outcomes.iter().position(|o| o.is_err());
        if let Some(first) = first_locked {
            assert!(
                outcomes[first..].iter().all(is_conflict),
                "round {}: edit accepted after the batch was settled",
                round
            );
        }

        let after = f
            .service
            .set_batch_expense(
                f.batch_id,
                SetExpenseInput {
                    category: ExpenseCategory::Marketing,
                    amount: dec(99),
                    description: None,
                },
            )
            .await;
        assert!(is_conflict(&after));

        let accepted = outcomes.iter().filter(|o| o.is_ok()).count();
        let stored = f.store.get_expense_entries(f.batch_id).await.unwrap();
        let marketing = stored
            .iter()
            .find(|e| e.category == ExpenseCategory::Marketing)
            .map(|e| e.amount);
        let expected = (accepted > 0).then(|| dec(accepted as i64));
        assert_eq!(marketing, expected, "round {}", round);
        assert_eq!(settlement.status, SettlementStatus::Draft);
    }
}

// ============================================================================
// Summary
// ============================================================================

#[tokio::test]
async fn test_summary_counts_finalized_only() {
    let f = fixture().await;
    let draft = f
        .service
        .create_settlement(f.batch_id, &f.pnl, None)
        .await
        .unwrap();

    let before = f.service.financial_summary(dec(15)).await.unwrap();
    assert_eq!(before.settlement_count, 0);
    assert_eq!(before.avg_margin_pct, Decimal::ZERO);

    f.service
        .finalize_settlement(draft.id, Uuid::new_v4())
        .await
        .unwrap();

    let after = f.service.financial_summary(dec(15)).await.unwrap();
    assert_eq!(after.settlement_count, 1);
    assert_eq!(after.total_revenue, dec(15_000));
    assert_eq!(after.total_expenses, dec(800));
    assert_eq!(after.total_profit, dec(4_200));
    assert_eq!(after.avg_margin_pct, dec(28));
    assert_eq!(after.healthy_count, 1);

    let strict = f.service.financial_summary(dec(30)).await.unwrap();
    assert_eq!(strict.healthy_count, 0);
}
