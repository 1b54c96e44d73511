//! In-memory finance store
//!
//! Every operation takes the single state lock, so the check-then-write steps
//! of settlement creation and status transitions are atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use shared::{
    generate_settlement_number, AssetRecord, Batch, ExpenseCategory, ExpenseEntry,
    InventoryValueGroup, NewSettlement, RevenueEntry, RevenueKind, SettlementSnapshot,
    SettlementStatus,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{FinanceStore, LedgerOutcome, Transition, TransitionOutcome};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct State {
    batches: Vec<Batch>,
    assets: Vec<AssetRecord>,
    expenses: HashMap<(Uuid, ExpenseCategory), ExpenseEntry>,
    revenues: HashMap<(Uuid, RevenueKind), RevenueEntry>,
    /// Insertion order, oldest first
    settlements: Vec<SettlementSnapshot>,
    last_sequence: i64,
}

impl State {
    fn active_settlement(&self, batch_id: Uuid) -> Option<&SettlementSnapshot> {
        self.settlements
            .iter()
            .find(|s| s.batch_id == batch_id && s.status.is_active())
    }
}

/// Finance store kept entirely in process memory
pub struct MemoryFinanceStore {
    settlement_prefix: String,
    state: Mutex<State>,
}

impl MemoryFinanceStore {
    pub fn new(settlement_prefix: impl Into<String>) -> Self {
        Self {
            settlement_prefix: settlement_prefix.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Register a batch (normally written by the acquisition workflow)
    pub async fn add_batch(&self, batch: Batch) {
        self.state.lock().await.batches.push(batch);
    }

    /// Register an asset (normally written by the reception workflow)
    pub async fn add_asset(&self, asset: AssetRecord) {
        self.state.lock().await.assets.push(asset);
    }
}

/// Grouping key of the inventory value report
fn inventory_group_key(asset: &AssetRecord) -> String {
    [&asset.brand, &asset.model, &asset.asset_type]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl FinanceStore for MemoryFinanceStore {
    async fn get_batch(&self, batch_id: Uuid) -> AppResult<Option<Batch>> {
        let state = self.state.lock().await;
        Ok(state.batches.iter().find(|b| b.id == batch_id).cloned())
    }

    async fn list_batches(&self) -> AppResult<Vec<Batch>> {
        let state = self.state.lock().await;
        let mut batches = state.batches.clone();
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(batches)
    }

    async fn get_batch_assets(&self, batch_id: Uuid) -> AppResult<Vec<AssetRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .assets
            .iter()
            .filter(|a| a.batch_id == batch_id)
            .cloned()
            .collect())
    }

    async fn get_expense_entries(&self, batch_id: Uuid) -> AppResult<Vec<ExpenseEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<ExpenseEntry> = state
            .expenses
            .values()
            .filter(|e| e.batch_id == batch_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.category.as_str());
        Ok(entries)
    }

    async fn get_revenue_entries(&self, batch_id: Uuid) -> AppResult<Vec<RevenueEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<RevenueEntry> = state
            .revenues
            .values()
            .filter(|r| r.batch_id == batch_id)
            .cloned()
            .collect();
        entries.sort_by_key(|r| r.kind.as_str());
        Ok(entries)
    }

    async fn upsert_expense(
        &self,
        entry: ExpenseEntry,
    ) -> AppResult<LedgerOutcome<ExpenseEntry>> {
        let mut state = self.state.lock().await;
        if let Some(settlement) = state.active_settlement(entry.batch_id) {
            return Ok(LedgerOutcome::Locked(settlement.clone()));
        }
        state
            .expenses
            .insert((entry.batch_id, entry.category), entry.clone());
        Ok(LedgerOutcome::Written(entry))
    }

    async fn upsert_revenue(
        &self,
        entry: RevenueEntry,
    ) -> AppResult<LedgerOutcome<RevenueEntry>> {
        let mut state = self.state.lock().await;
        if let Some(settlement) = state.active_settlement(entry.batch_id) {
            return Ok(LedgerOutcome::Locked(settlement.clone()));
        }
        state.revenues.insert((entry.batch_id, entry.kind), entry.clone());
        Ok(LedgerOutcome::Written(entry))
    }

    async fn get_settlement(&self, settlement_id: Uuid) -> AppResult<Option<SettlementSnapshot>> {
        let state = self.state.lock().await;
        Ok(state
            .settlements
            .iter()
            .find(|s| s.id == settlement_id)
            .cloned())
    }

    async fn find_active_settlement(
        &self,
        batch_id: Uuid,
    ) -> AppResult<Option<SettlementSnapshot>> {
        let state = self.state.lock().await;
        Ok(state.active_settlement(batch_id).cloned())
    }

    async fn list_settlements(&self) -> AppResult<Vec<SettlementSnapshot>> {
        let state = self.state.lock().await;
        Ok(state.settlements.iter().rev().cloned().collect())
    }

    async fn insert_settlement(&self, settlement: NewSettlement) -> AppResult<SettlementSnapshot> {
        let mut state = self.state.lock().await;

        if state.active_settlement(settlement.batch_id).is_some() {
            return Err(AppError::conflict(
                "settlement",
                "An active settlement already exists for this batch",
            ));
        }

        state.last_sequence += 1;
        let now = Utc::now();
        let snapshot = SettlementSnapshot {
            id: Uuid::new_v4(),
            settlement_number: generate_settlement_number(
                &self.settlement_prefix,
                now.year(),
                state.last_sequence,
            ),
            batch_id: settlement.batch_id,
            status: SettlementStatus::Draft,
            figures: settlement.figures,
            created_at: now,
            created_by: settlement.created_by,
            finalized_at: None,
            finalized_by: None,
        };
        state.settlements.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn transition_settlement(
        &self,
        settlement_id: Uuid,
        transition: Transition,
    ) -> AppResult<TransitionOutcome> {
        let mut state = self.state.lock().await;

        let Some(settlement) = state.settlements.iter_mut().find(|s| s.id == settlement_id)
        else {
            return Ok(TransitionOutcome::NotFound);
        };

        if settlement.status != transition.from {
            return Ok(TransitionOutcome::Rejected(settlement.status));
        }

        settlement.status = transition.to;
        if transition.to == SettlementStatus::Finalized {
            settlement.finalized_at = Some(transition.at);
            settlement.finalized_by = transition.actor;
        }
        Ok(TransitionOutcome::Applied(settlement.clone()))
    }

    async fn list_inventory_groups(&self) -> AppResult<Vec<InventoryValueGroup>> {
        let state = self.state.lock().await;

        // Keep first-seen order so equal values rank deterministically
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, (Decimal, u32)> = HashMap::new();
        for asset in state
            .assets
            .iter()
            .filter(|a| !a.status.is_sold() && !a.status.is_scrapped())
        {
            let key = inventory_group_key(asset);
            let entry = totals.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                (Decimal::ZERO, 0)
            });
            entry.0 += asset.cost_amount;
            entry.1 += 1;
        }

        let mut groups: Vec<InventoryValueGroup> = order
            .into_iter()
            .filter_map(|key| {
                totals
                    .remove(&key)
                    .map(|(value, quantity)| InventoryValueGroup::new(key, value, quantity))
            })
            .collect();
        groups.sort_by(|a, b| b.total_cost_value.cmp(&a.total_cost_value));
        Ok(groups)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
