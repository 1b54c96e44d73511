//! Data access for the finance engine
//!
//! Services only talk to [`FinanceStore`]; Postgres backs production and the
//! in-memory store backs local runs and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    AssetRecord, Batch, ExpenseEntry, InventoryValueGroup, NewSettlement, RevenueEntry,
    SettlementSnapshot, SettlementStatus,
};
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryFinanceStore;
pub use postgres::PgFinanceStore;

/// A settlement status change requested from the store
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: SettlementStatus,
    pub to: SettlementStatus,
    /// Acting user, stamped as `finalized_by` when moving to finalized
    pub actor: Option<Uuid>,
    pub at: DateTime<Utc>,
}

/// Result of a conditional status change
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The row was in `from` and now carries `to`
    Applied(SettlementSnapshot),
    /// The row exists but was not in `from`; nothing changed
    Rejected(SettlementStatus),
    NotFound,
}

/// Result of a ledger write that is refused once a batch is settled
#[derive(Debug, Clone)]
pub enum LedgerOutcome<T> {
    Written(T),
    /// The batch has a non-cancelled settlement; nothing was written
    Locked(SettlementSnapshot),
}

/// Storage operations required by the settlement engine
#[async_trait]
pub trait FinanceStore: Send + Sync {
    async fn get_batch(&self, batch_id: Uuid) -> AppResult<Option<Batch>>;

    /// All batches, newest first
    async fn list_batches(&self) -> AppResult<Vec<Batch>>;

    async fn get_batch_assets(&self, batch_id: Uuid) -> AppResult<Vec<AssetRecord>>;

    async fn get_expense_entries(&self, batch_id: Uuid) -> AppResult<Vec<ExpenseEntry>>;

    async fn get_revenue_entries(&self, batch_id: Uuid) -> AppResult<Vec<RevenueEntry>>;

    /// Insert or replace the amount for (batch_id, category) unless the batch
    /// has an active settlement. Check and write are one atomic step with
    /// respect to [`FinanceStore::insert_settlement`].
    async fn upsert_expense(
        &self,
        entry: ExpenseEntry,
    ) -> AppResult<LedgerOutcome<ExpenseEntry>>;

    /// Insert or replace the amount for (batch_id, kind) unless the batch has
    /// an active settlement, atomically like [`FinanceStore::upsert_expense`].
    async fn upsert_revenue(
        &self,
        entry: RevenueEntry,
    ) -> AppResult<LedgerOutcome<RevenueEntry>>;

    async fn get_settlement(&self, settlement_id: Uuid) -> AppResult<Option<SettlementSnapshot>>;

    /// The non-cancelled settlement of a batch, if any
    async fn find_active_settlement(&self, batch_id: Uuid)
        -> AppResult<Option<SettlementSnapshot>>;

    /// All settlements, newest first
    async fn list_settlements(&self) -> AppResult<Vec<SettlementSnapshot>>;

    /// Persist a draft settlement with the next settlement number.
    ///
    /// Fails with `Conflict` when the batch already has an active settlement,
    /// including when a concurrent insert won the race.
    async fn insert_settlement(&self, settlement: NewSettlement) -> AppResult<SettlementSnapshot>;

    /// Move a settlement from `transition.from` to `transition.to` only if it
    /// is currently in `transition.from`. Check and write are one atomic step.
    async fn transition_settlement(
        &self,
        settlement_id: Uuid,
        transition: Transition,
    ) -> AppResult<TransitionOutcome>;

    /// Unsold inventory grouped by brand, model and type
    async fn list_inventory_groups(&self) -> AppResult<Vec<InventoryValueGroup>>;

    /// Liveness probe for the health endpoint
    async fn ping(&self) -> AppResult<()>;
}
