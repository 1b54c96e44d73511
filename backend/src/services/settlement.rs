//! Settlement lifecycle service
//!
//! Settlements freeze a batch's P&L as a draft, then move once to finalized.
//! Ledger quick edits are only accepted while no active settlement exists.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use shared::{
    summarize_settlements, validate_amount, ExpenseEntry, FinancialSummary, LedgerKey,
    NewSettlement, PnLResult, RevenueEntry, SetExpenseInput, SettlementFigures,
    SettlementSnapshot, SettlementStatus, UpdateBatchTotalsInput,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::BatchService;
use crate::store::{FinanceStore, LedgerOutcome, Transition, TransitionOutcome};

/// What a batch-total quick edit wrote
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "ledger", rename_all = "snake_case")]
pub enum LedgerWrite {
    Expense(ExpenseEntry),
    Revenue(RevenueEntry),
}

#[derive(Clone)]
pub struct SettlementService {
    store: Arc<dyn FinanceStore>,
    batches: BatchService,
}

impl SettlementService {
    pub fn new(store: Arc<dyn FinanceStore>) -> Self {
        Self {
            batches: BatchService::new(store.clone()),
            store,
        }
    }

    /// Persist a draft snapshot of the given P&L
    pub async fn create_settlement(
        &self,
        batch_id: Uuid,
        pnl: &PnLResult,
        actor: Option<Uuid>,
    ) -> AppResult<SettlementSnapshot> {
        let batch = self.batches.get_batch(batch_id).await?;

        if pnl.batch_id != batch_id {
            return Err(AppError::validation(
                "batch_id",
                "P&L was calculated for a different batch",
            ));
        }
        if pnl.batch_code != batch.code {
            return Err(AppError::validation(
                "batch_code",
                format!("P&L batch code does not match batch {}", batch.code),
            ));
        }
        pnl.verify()?;

        if let Some(existing) = self.store.find_active_settlement(batch_id).await? {
            tracing::warn!(
                batch_id = %batch_id,
                existing = %existing.settlement_number,
                "Settlement already exists for batch"
            );
            return Err(AppError::conflict(
                "settlement",
                format!(
                    "Batch already has settlement {} ({})",
                    existing.settlement_number, existing.status
                ),
            ));
        }

        let snapshot = self
            .store
            .insert_settlement(NewSettlement {
                batch_id,
                figures: SettlementFigures::from(pnl),
                created_by: actor,
            })
            .await?;

        tracing::info!(
            settlement = %snapshot.settlement_number,
            batch_id = %batch_id,
            net_profit = %snapshot.figures.net_profit,
            "Settlement drafted"
        );
        Ok(snapshot)
    }

    /// Move a draft to finalized. Succeeds at most once per settlement.
    pub async fn finalize_settlement(
        &self,
        settlement_id: Uuid,
        actor: Uuid,
    ) -> AppResult<SettlementSnapshot> {
        let snapshot = self
            .transition(
                settlement_id,
                SettlementStatus::Finalized,
                Some(actor),
                "Only draft settlements can be finalized",
            )
            .await?;

        tracing::info!(
            settlement = %snapshot.settlement_number,
            finalized_by = %actor,
            "Settlement finalized"
        );
        Ok(snapshot)
    }

    /// Discard a draft so the batch can be settled again
    pub async fn cancel_settlement(&self, settlement_id: Uuid) -> AppResult<SettlementSnapshot> {
        let snapshot = self
            .transition(
                settlement_id,
                SettlementStatus::Cancelled,
                None,
                "Only draft settlements can be cancelled",
            )
            .await?;

        tracing::info!(settlement = %snapshot.settlement_number, "Settlement cancelled");
        Ok(snapshot)
    }

    async fn transition(
        &self,
        settlement_id: Uuid,
        to: SettlementStatus,
        actor: Option<Uuid>,
        rejection: &str,
    ) -> AppResult<SettlementSnapshot> {
        let transition = Transition {
            from: SettlementStatus::Draft,
            to,
            actor,
            at: Utc::now(),
        };

        match self
            .store
            .transition_settlement(settlement_id, transition)
            .await?
        {
            TransitionOutcome::Applied(snapshot) => Ok(snapshot),
            TransitionOutcome::Rejected(current) => {
                tracing::warn!(
                    settlement_id = %settlement_id,
                    current = %current,
                    requested = %to,
                    "Settlement transition rejected"
                );
                Err(AppError::conflict(
                    "settlement",
                    format!("{} (current status: {})", rejection, current),
                ))
            }
            TransitionOutcome::NotFound => Err(AppError::NotFound("Settlement".to_string())),
        }
    }

    pub async fn get_settlement(&self, settlement_id: Uuid) -> AppResult<SettlementSnapshot> {
        self.store
            .get_settlement(settlement_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Settlement".to_string()))
    }

    /// All settlements, newest first
    pub async fn list_settlements(&self) -> AppResult<Vec<SettlementSnapshot>> {
        self.store.list_settlements().await
    }

    /// Totals over finalized settlements
    pub async fn financial_summary(
        &self,
        healthy_margin_pct: Decimal,
    ) -> AppResult<FinancialSummary> {
        let settlements = self.store.list_settlements().await?;
        summarize_settlements(&settlements, healthy_margin_pct)
            .map_err(|e| AppError::Internal(format!("Financial summary failed: {}", e)))
    }

    /// Set the batch acquisition cost, sale revenue or scrap revenue
    pub async fn update_batch_totals(
        &self,
        batch_id: Uuid,
        input: UpdateBatchTotalsInput,
    ) -> AppResult<LedgerWrite> {
        validate_amount(input.amount).map_err(|msg| AppError::validation("amount", msg))?;
        self.batches.get_batch(batch_id).await?;

        let now = Utc::now();
        let write = match LedgerKey::from(input.kind) {
            LedgerKey::Expense(category) => {
                let outcome = self
                    .store
                    .upsert_expense(ExpenseEntry {
                        batch_id,
                        category,
                        amount: input.amount,
                        description: Some(format!("Batch {} adjustment", input.kind)),
                        updated_at: now,
                    })
                    .await?;
                LedgerWrite::Expense(ledger_written(batch_id, outcome)?)
            }
            LedgerKey::Revenue(kind) => {
                let outcome = self
                    .store
                    .upsert_revenue(RevenueEntry {
                        batch_id,
                        kind,
                        amount: input.amount,
                        updated_at: now,
                    })
                    .await?;
                LedgerWrite::Revenue(ledger_written(batch_id, outcome)?)
            }
        };

        tracing::info!(
            batch_id = %batch_id,
            kind = %input.kind,
            amount = %input.amount,
            "Batch total updated"
        );
        Ok(write)
    }

    /// Set the amount of one expense category
    pub async fn set_batch_expense(
        &self,
        batch_id: Uuid,
        input: SetExpenseInput,
    ) -> AppResult<ExpenseEntry> {
        validate_amount(input.amount).map_err(|msg| AppError::validation("amount", msg))?;
        self.batches.get_batch(batch_id).await?;

        let outcome = self
            .store
            .upsert_expense(ExpenseEntry {
                batch_id,
                category: input.category,
                amount: input.amount,
                description: input.description,
                updated_at: Utc::now(),
            })
            .await?;
        let entry = ledger_written(batch_id, outcome)?;

        tracing::info!(
            batch_id = %batch_id,
            category = %entry.category,
            amount = %entry.amount,
            "Batch expense set"
        );
        Ok(entry)
    }
}

/// Unwrap a ledger write, turning a settled batch into a conflict
fn ledger_written<T>(batch_id: Uuid, outcome: LedgerOutcome<T>) -> AppResult<T> {
    match outcome {
        LedgerOutcome::Written(entry) => Ok(entry),
        LedgerOutcome::Locked(settlement) => {
            tracing::warn!(
                batch_id = %batch_id,
                settlement = %settlement.settlement_number,
                "Ledger edit rejected, batch has an active settlement"
            );
            Err(AppError::conflict(
                "settlement",
                format!(
                    "Batch figures are locked by settlement {} ({})",
                    settlement.settlement_number, settlement.status
                ),
            ))
        }
    }
}
