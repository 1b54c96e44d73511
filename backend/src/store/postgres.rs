//! PostgreSQL finance store

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use shared::{
    generate_settlement_number, AssetRecord, AssetStatus, Batch, ExpenseCategory, ExpenseEntry,
    InventoryValueGroup, NewSettlement, RevenueEntry, RevenueKind, SettlementFigures,
    SettlementSnapshot, SettlementStatus,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::{FinanceStore, LedgerOutcome, Transition, TransitionOutcome};
use crate::error::{AppError, AppResult};

const SETTLEMENT_COLUMNS: &str = r#"
    id, settlement_number, batch_id, status,
    total_units, units_sold, units_scrapped, units_pending,
    gross_revenue, scrap_revenue, total_revenue, acquisition_cost,
    logistics_cost, parts_cost, labor_cost, refurbishing_cost,
    data_wipe_cost, marketing_cost, other_costs, total_expenses,
    gross_profit, operating_profit, net_profit, profit_margin_pct,
    created_at, created_by, finalized_at, finalized_by
"#;

/// Finance store backed by the settlement engine tables
#[derive(Clone)]
pub struct PgFinanceStore {
    db: PgPool,
    settlement_prefix: String,
}

impl PgFinanceStore {
    pub fn new(db: PgPool, settlement_prefix: impl Into<String>) -> Self {
        Self {
            db,
            settlement_prefix: settlement_prefix.into(),
        }
    }
}

#[derive(FromRow)]
struct AssetRow {
    id: Uuid,
    batch_id: Uuid,
    cost_amount: Option<Decimal>,
    sale_price: Option<Decimal>,
    status: String,
    brand: Option<String>,
    model: Option<String>,
    asset_type: Option<String>,
}

impl From<AssetRow> for AssetRecord {
    fn from(row: AssetRow) -> Self {
        Self {
            id: row.id,
            batch_id: row.batch_id,
            cost_amount: row.cost_amount.unwrap_or(Decimal::ZERO),
            sale_price: row.sale_price,
            status: AssetStatus::from(row.status),
            brand: row.brand,
            model: row.model,
            asset_type: row.asset_type,
        }
    }
}

#[derive(FromRow)]
struct ExpenseRow {
    batch_id: Uuid,
    category: String,
    amount: Decimal,
    description: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for ExpenseEntry {
    type Error = AppError;

    fn try_from(row: ExpenseRow) -> AppResult<Self> {
        let category = ExpenseCategory::from_str(&row.category).ok_or_else(|| {
            AppError::Internal(format!("Unknown expense category '{}'", row.category))
        })?;
        Ok(Self {
            batch_id: row.batch_id,
            category,
            amount: row.amount,
            description: row.description,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct RevenueRow {
    batch_id: Uuid,
    kind: String,
    amount: Decimal,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RevenueRow> for RevenueEntry {
    type Error = AppError;

    fn try_from(row: RevenueRow) -> AppResult<Self> {
        let kind = RevenueKind::from_str(&row.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown revenue kind '{}'", row.kind)))?;
        Ok(Self {
            batch_id: row.batch_id,
            kind,
            amount: row.amount,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SettlementRow {
    id: Uuid,
    settlement_number: String,
    batch_id: Uuid,
    status: String,
    total_units: i32,
    units_sold: i32,
    units_scrapped: i32,
    units_pending: i32,
    gross_revenue: Decimal,
    scrap_revenue: Decimal,
    total_revenue: Decimal,
    acquisition_cost: Decimal,
    logistics_cost: Decimal,
    parts_cost: Decimal,
    labor_cost: Decimal,
    refurbishing_cost: Decimal,
    data_wipe_cost: Decimal,
    marketing_cost: Decimal,
    other_costs: Decimal,
    total_expenses: Decimal,
    gross_profit: Decimal,
    operating_profit: Decimal,
    net_profit: Decimal,
    profit_margin_pct: Decimal,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    finalized_at: Option<DateTime<Utc>>,
    finalized_by: Option<Uuid>,
}

fn parse_status(raw: &str) -> AppResult<SettlementStatus> {
    SettlementStatus::from_str(raw)
        .ok_or_else(|| AppError::Internal(format!("Unknown settlement status '{}'", raw)))
}

fn unit_count(value: i32, column: &str) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::Internal(format!("Negative {} in settlement row", column)))
}

fn unit_column(value: u32, column: &str) -> AppResult<i32> {
    i32::try_from(value).map_err(|_| AppError::validation(column, "Unit count is too large"))
}

impl TryFrom<SettlementRow> for SettlementSnapshot {
    type Error = AppError;

    fn try_from(row: SettlementRow) -> AppResult<Self> {
        Ok(Self {
            id: row.id,
            settlement_number: row.settlement_number,
            batch_id: row.batch_id,
            status: parse_status(&row.status)?,
            figures: SettlementFigures {
                total_units: unit_count(row.total_units, "total_units")?,
                units_sold: unit_count(row.units_sold, "units_sold")?,
                units_scrapped: unit_count(row.units_scrapped, "units_scrapped")?,
                units_pending: unit_count(row.units_pending, "units_pending")?,
                gross_revenue: row.gross_revenue,
                scrap_revenue: row.scrap_revenue,
                total_revenue: row.total_revenue,
                acquisition_cost: row.acquisition_cost,
                logistics_cost: row.logistics_cost,
                parts_cost: row.parts_cost,
                labor_cost: row.labor_cost,
                refurbishing_cost: row.refurbishing_cost,
                data_wipe_cost: row.data_wipe_cost,
                marketing_cost: row.marketing_cost,
                other_costs: row.other_costs,
                total_expenses: row.total_expenses,
                gross_profit: row.gross_profit,
                operating_profit: row.operating_profit,
                net_profit: row.net_profit,
                profit_margin_pct: row.profit_margin_pct,
            },
            created_at: row.created_at,
            created_by: row.created_by,
            finalized_at: row.finalized_at,
            finalized_by: row.finalized_by,
        })
    }
}

#[derive(FromRow)]
struct InventoryGroupRow {
    group_key: String,
    total_cost_value: Decimal,
    total_quantity: i64,
}

/// Lock a batch row until the surrounding transaction ends.
///
/// Ledger writes and settlement inserts for a batch both take this lock
/// first, so a settlement cannot appear between a ledger check and its write.
async fn lock_batch(conn: &mut PgConnection, batch_id: Uuid) -> AppResult<()> {
    let locked: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM batches WHERE id = $1 FOR UPDATE")
            .bind(batch_id)
            .fetch_optional(&mut *conn)
            .await?;
    locked
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))
}

async fn active_settlement(
    conn: &mut PgConnection,
    batch_id: Uuid,
) -> AppResult<Option<SettlementSnapshot>> {
    let query = format!(
        "SELECT {} FROM settlements WHERE batch_id = $1 AND status <> 'cancelled'",
        SETTLEMENT_COLUMNS
    );
    sqlx::query_as::<_, SettlementRow>(&query)
        .bind(batch_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(SettlementSnapshot::try_from)
        .transpose()
}

#[async_trait]
impl FinanceStore for PgFinanceStore {
    async fn get_batch(&self, batch_id: Uuid) -> AppResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, (Uuid, String, Option<String>, DateTime<Utc>)>(
            "SELECT id, code, client_reference, created_at FROM batches WHERE id = $1",
        )
        .bind(batch_id)
        .fetch_optional(&self.db)
        .await?
        .map(|(id, code, client_reference, created_at)| Batch {
            id,
            code,
            client_reference,
            created_at,
        });

        Ok(batch)
    }

    async fn list_batches(&self) -> AppResult<Vec<Batch>> {
        let rows = sqlx::query_as::<_, (Uuid, String, Option<String>, DateTime<Utc>)>(
            "SELECT id, code, client_reference, created_at FROM batches ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, code, client_reference, created_at)| Batch {
                id,
                code,
                client_reference,
                created_at,
            })
            .collect())
    }

    async fn get_batch_assets(&self, batch_id: Uuid) -> AppResult<Vec<AssetRecord>> {
        let rows = sqlx::query_as::<_, AssetRow>(
            r#"
            SELECT id, batch_id, cost_amount, sale_price, status, brand, model, asset_type
            FROM assets
            WHERE batch_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(AssetRecord::from).collect())
    }

    async fn get_expense_entries(&self, batch_id: Uuid) -> AppResult<Vec<ExpenseEntry>> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT batch_id, category, amount, description, updated_at
            FROM expense_ledger
            WHERE batch_id = $1
            ORDER BY category
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ExpenseEntry::try_from).collect()
    }

    async fn get_revenue_entries(&self, batch_id: Uuid) -> AppResult<Vec<RevenueEntry>> {
        let rows = sqlx::query_as::<_, RevenueRow>(
            r#"
            SELECT batch_id, kind, amount, updated_at
            FROM revenue_ledger
            WHERE batch_id = $1
            ORDER BY kind
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(RevenueEntry::try_from).collect()
    }

    async fn upsert_expense(
        &self,
        entry: ExpenseEntry,
    ) -> AppResult<LedgerOutcome<ExpenseEntry>> {
        let mut tx = self.db.begin().await?;
        lock_batch(&mut tx, entry.batch_id).await?;
        if let Some(settlement) = active_settlement(&mut tx, entry.batch_id).await? {
            return Ok(LedgerOutcome::Locked(settlement));
        }

        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expense_ledger (batch_id, category, amount, description, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (batch_id, category) DO UPDATE
            SET amount = EXCLUDED.amount,
                description = EXCLUDED.description,
                updated_at = EXCLUDED.updated_at
            RETURNING batch_id, category, amount, description, updated_at
            "#,
        )
        .bind(entry.batch_id)
        .bind(entry.category.as_str())
        .bind(entry.amount)
        .bind(&entry.description)
        .bind(entry.updated_at)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(LedgerOutcome::Written(ExpenseEntry::try_from(row)?))
    }

    async fn upsert_revenue(
        &self,
        entry: RevenueEntry,
    ) -> AppResult<LedgerOutcome<RevenueEntry>> {
        let mut tx = self.db.begin().await?;
        lock_batch(&mut tx, entry.batch_id).await?;
        if let Some(settlement) = active_settlement(&mut tx, entry.batch_id).await? {
            return Ok(LedgerOutcome::Locked(settlement));
        }

        let row = sqlx::query_as::<_, RevenueRow>(
            r#"
            INSERT INTO revenue_ledger (batch_id, kind, amount, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (batch_id, kind) DO UPDATE
            SET amount = EXCLUDED.amount,
                updated_at = EXCLUDED.updated_at
            RETURNING batch_id, kind, amount, updated_at
            "#,
        )
        .bind(entry.batch_id)
        .bind(entry.kind.as_str())
        .bind(entry.amount)
        .bind(entry.updated_at)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(LedgerOutcome::Written(RevenueEntry::try_from(row)?))
    }

    async fn get_settlement(&self, settlement_id: Uuid) -> AppResult<Option<SettlementSnapshot>> {
        let query = format!("SELECT {} FROM settlements WHERE id = $1", SETTLEMENT_COLUMNS);
        sqlx::query_as::<_, SettlementRow>(&query)
            .bind(settlement_id)
            .fetch_optional(&self.db)
            .await?
            .map(SettlementSnapshot::try_from)
            .transpose()
    }

    async fn find_active_settlement(
        &self,
        batch_id: Uuid,
    ) -> AppResult<Option<SettlementSnapshot>> {
        let mut conn = self.db.acquire().await?;
        active_settlement(&mut conn, batch_id).await
    }

    async fn list_settlements(&self) -> AppResult<Vec<SettlementSnapshot>> {
        let query = format!(
            "SELECT {} FROM settlements ORDER BY created_at DESC, settlement_number DESC",
            SETTLEMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, SettlementRow>(&query)
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(SettlementSnapshot::try_from).collect()
    }

    async fn insert_settlement(&self, settlement: NewSettlement) -> AppResult<SettlementSnapshot> {
        let mut tx = self.db.begin().await?;
        lock_batch(&mut tx, settlement.batch_id).await?;

        let sequence: i64 = sqlx::query_scalar("SELECT nextval('settlement_number_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let settlement_number =
            generate_settlement_number(&self.settlement_prefix, Utc::now().year(), sequence);

        let f = &settlement.figures;
        let query = format!(
            r#"
            INSERT INTO settlements (
                settlement_number, batch_id, status,
                total_units, units_sold, units_scrapped, units_pending,
                gross_revenue, scrap_revenue, total_revenue, acquisition_cost,
                logistics_cost, parts_cost, labor_cost, refurbishing_cost,
                data_wipe_cost, marketing_cost, other_costs, total_expenses,
                gross_profit, operating_profit, net_profit, profit_margin_pct,
                created_by
            )
            VALUES ($1, $2, 'draft', $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING {}
            "#,
            SETTLEMENT_COLUMNS
        );

        let row = sqlx::query_as::<_, SettlementRow>(&query)
            .bind(&settlement_number)
            .bind(settlement.batch_id)
            .bind(unit_column(f.total_units, "total_units")?)
            .bind(unit_column(f.units_sold, "units_sold")?)
            .bind(unit_column(f.units_scrapped, "units_scrapped")?)
            .bind(unit_column(f.units_pending, "units_pending")?)
            .bind(f.gross_revenue)
            .bind(f.scrap_revenue)
            .bind(f.total_revenue)
            .bind(f.acquisition_cost)
            .bind(f.logistics_cost)
            .bind(f.parts_cost)
            .bind(f.labor_cost)
            .bind(f.refurbishing_cost)
            .bind(f.data_wipe_cost)
            .bind(f.marketing_cost)
            .bind(f.other_costs)
            .bind(f.total_expenses)
            .bind(f.gross_profit)
            .bind(f.operating_profit)
            .bind(f.net_profit)
            .bind(f.profit_margin_pct)
            .bind(settlement.created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::from_insert_error)?;
        tx.commit().await?;

        SettlementSnapshot::try_from(row)
    }

    async fn transition_settlement(
        &self,
        settlement_id: Uuid,
        transition: Transition,
    ) -> AppResult<TransitionOutcome> {
        let stamp = transition.to == SettlementStatus::Finalized;
        let query = format!(
            r#"
            UPDATE settlements
            SET status = $3,
                finalized_at = CASE WHEN $4 THEN $5 ELSE finalized_at END,
                finalized_by = CASE WHEN $4 THEN $6 ELSE finalized_by END
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            SETTLEMENT_COLUMNS
        );

        let updated = sqlx::query_as::<_, SettlementRow>(&query)
            .bind(settlement_id)
            .bind(transition.from.as_str())
            .bind(transition.to.as_str())
            .bind(stamp)
            .bind(transition.at)
            .bind(transition.actor)
            .fetch_optional(&self.db)
            .await?;

        if let Some(row) = updated {
            return Ok(TransitionOutcome::Applied(SettlementSnapshot::try_from(row)?));
        }

        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM settlements WHERE id = $1")
                .bind(settlement_id)
                .fetch_optional(&self.db)
                .await?;

        match current {
            Some(status) => Ok(TransitionOutcome::Rejected(parse_status(&status)?)),
            None => Ok(TransitionOutcome::NotFound),
        }
    }

    async fn list_inventory_groups(&self) -> AppResult<Vec<InventoryValueGroup>> {
        let rows = sqlx::query_as::<_, InventoryGroupRow>(
            r#"
            SELECT group_key, total_cost_value, total_quantity
            FROM inventory_value_groups
            ORDER BY total_cost_value DESC, group_key
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                let quantity = u32::try_from(row.total_quantity).map_err(|_| {
                    AppError::Internal(format!("Quantity out of range for '{}'", row.group_key))
                })?;
                Ok(InventoryValueGroup::new(
                    row.group_key,
                    row.total_cost_value,
                    quantity,
                ))
            })
            .collect()
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
