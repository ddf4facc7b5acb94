//! SQLite order repository.
//!
//! Orders live in `orders`, their items in `order_items` (foreign key with
//! `ON DELETE CASCADE`). The schema is applied from `migrations/` when the
//! repository connects.
//!
//! # Write modes
//!
//! With `atomic_writes` every port call runs inside one transaction and a
//! failure rolls back all of its writes. Without it each statement commits on
//! its own; a failure after at least one applied write is reported as
//! [`RepositoryError::PartialReconciliation`].

use std::collections::HashMap;
use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info, instrument, warn};

use super::error::{translate_error, translate_migrate_error};
use super::records::{OrderItemRecord, OrderRecord};
use crate::config::PersistenceConfig;
use crate::domain::checkout::{
    Order, OrderItem, OrderRepository, ReconciliationPlan, ReconciliationStep, RepositoryError,
};
use crate::domain::shared::{Money, OrderId, OrderItemId};
use crate::observability::{record_reconciliation, record_repository_operation};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const BACKEND: &str = "sqlite";

const SELECT_ORDER: &str = "SELECT id, customer_id, total FROM orders WHERE id = ?";
const SELECT_ORDERS: &str = "SELECT id, customer_id, total FROM orders ORDER BY rowid";
const SELECT_ITEMS: &str = "SELECT id, order_id, name, price, product_id, quantity \
     FROM order_items WHERE order_id = ? ORDER BY rowid";
const SELECT_ALL_ITEMS: &str = "SELECT id, order_id, name, price, product_id, quantity \
     FROM order_items ORDER BY rowid";

/// `OrderRepository` backed by an `sqlx` SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteOrderRepository {
    pool: SqlitePool,
    atomic_writes: bool,
}

impl SqliteOrderRepository {
    /// Open (and create if configured) the database and apply migrations.
    ///
    /// In-memory URLs get a pool of exactly one long-lived connection so
    /// every call sees the same database.
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if the URL is invalid, the database
    /// cannot be opened, or a migration fails.
    pub async fn connect(config: &PersistenceConfig) -> Result<Self, RepositoryError> {
        let mut options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| {
                RepositoryError::unavailable(format!(
                    "invalid database url '{}': {e}",
                    config.database_url
                ))
            })?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let pool_options = if config.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            if config.create_if_missing {
                create_parent_dir(&options).await?;
            }
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(translate_error)?;

        let repo = Self::with_pool(pool, config.atomic_writes);
        repo.migrate().await?;

        info!(
            url = %config.database_url,
            atomic_writes = config.atomic_writes,
            "Order store opened"
        );

        Ok(repo)
    }

    /// Open a private in-memory database with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if SQLite cannot be opened.
    pub async fn in_memory(atomic_writes: bool) -> Result<Self, RepositoryError> {
        Self::connect(&PersistenceConfig::in_memory(atomic_writes)).await
    }

    /// Wrap an existing pool. Migrations are not applied.
    #[must_use]
    pub const fn with_pool(pool: SqlitePool, atomic_writes: bool) -> Self {
        Self {
            pool,
            atomic_writes,
        }
    }

    /// Apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if a migration fails.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(translate_migrate_error)?;
        debug!("Order store migrations applied");
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Whether port calls run in a single transaction.
    #[must_use]
    pub const fn atomic_writes(&self) -> bool {
        self.atomic_writes
    }

    /// Close the pool, waiting for connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn begin(&self, order_id: &OrderId) -> Result<WriteUnit, RepositoryError> {
        let session = if self.atomic_writes {
            Session::Atomic(
                self.pool
                    .begin_with("BEGIN IMMEDIATE")
                    .await
                    .map_err(translate_error)?,
            )
        } else {
            Session::AutoCommit(self.pool.acquire().await.map_err(translate_error)?)
        };

        Ok(WriteUnit {
            session,
            order_id: order_id.clone(),
            completed_writes: 0,
        })
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, RepositoryError> {
        self.pool.acquire().await.map_err(translate_error)
    }

    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut unit = self.begin(order.id()).await?;
        let outcome = write_new_order(&mut unit, order).await;
        unit.finish(outcome).await
    }

    async fn add_item(&self, order: &Order, item: &OrderItem) -> Result<(), RepositoryError> {
        let mut unit = self.begin(order.id()).await?;
        let outcome = write_added_item(&mut unit, order, item).await;
        unit.finish(outcome).await
    }

    async fn remove_item(&self, order: &Order, item: &OrderItem) -> Result<(), RepositoryError> {
        let mut unit = self.begin(order.id()).await?;
        let outcome = write_deleted_item(&mut unit, order, item).await;
        unit.finish(outcome).await
    }

    async fn change_quantity(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError> {
        let mut unit = self.begin(order.id()).await?;
        let outcome = write_item_quantity(&mut unit, order, item).await;
        unit.finish(outcome).await
    }

    async fn reconcile(&self, order: &Order) -> Result<ReconciliationPlan, RepositoryError> {
        let mut unit = self.begin(order.id()).await?;
        let outcome = write_reconciliation(&mut unit, order).await;
        unit.finish(outcome).await
    }

    async fn load(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        let mut conn = self.acquire().await?;
        let record = fetch_order(&mut conn, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(id.as_str()))?;
        let items = fetch_items(&mut conn, id).await?;
        record.into_order(items)
    }

    async fn load_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.acquire().await?;

        let records: Vec<OrderRecord> = sqlx::query_as(SELECT_ORDERS)
            .fetch_all(&mut *conn)
            .await
            .map_err(translate_error)?;
        let items: Vec<OrderItemRecord> = sqlx::query_as(SELECT_ALL_ITEMS)
            .fetch_all(&mut *conn)
            .await
            .map_err(translate_error)?;

        let mut items_by_order: HashMap<String, Vec<OrderItemRecord>> = HashMap::new();
        for item in items {
            items_by_order
                .entry(item.order_id.clone())
                .or_default()
                .push(item);
        }

        records
            .into_iter()
            .map(|record| {
                let items = items_by_order.remove(&record.id).unwrap_or_default();
                record.into_order(items)
            })
            .collect()
    }

    async fn load_total(&self, id: &OrderId) -> Result<Money, RepositoryError> {
        let mut conn = self.acquire().await?;
        fetch_order(&mut conn, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(id.as_str()))?
            .total()
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    #[instrument(skip(self, order), fields(order_id = %order.id(), items = order.items().len()))]
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        let started = Instant::now();
        let result = self.create_order(order).await;
        record_repository_operation(BACKEND, "create", &result, started.elapsed());

        if result.is_ok() {
            info!(total = %order.total(), "Order created");
        }
        result
    }

    #[instrument(skip(self, order, item), fields(order_id = %order.id(), item_id = %item.id()))]
    async fn add_order_item(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError> {
        let started = Instant::now();
        let result = self.add_item(order, item).await;
        record_repository_operation(BACKEND, "add_order_item", &result, started.elapsed());
        result
    }

    #[instrument(skip(self, order, item), fields(order_id = %order.id(), item_id = %item.id()))]
    async fn delete_order_item(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError> {
        let started = Instant::now();
        let result = self.remove_item(order, item).await;
        record_repository_operation(BACKEND, "delete_order_item", &result, started.elapsed());
        result
    }

    #[instrument(
        skip(self, order, item),
        fields(order_id = %order.id(), item_id = %item.id(), quantity = %item.quantity())
    )]
    async fn update_order_item_quantity(
        &self,
        order: &Order,
        item: &OrderItem,
    ) -> Result<(), RepositoryError> {
        let started = Instant::now();
        let result = self.change_quantity(order, item).await;
        record_repository_operation(
            BACKEND,
            "update_order_item_quantity",
            &result,
            started.elapsed(),
        );
        result
    }

    #[instrument(skip(self, order), fields(order_id = %order.id()))]
    async fn update(&self, order: &Order) -> Result<ReconciliationPlan, RepositoryError> {
        let started = Instant::now();
        let result = self.reconcile(order).await;
        record_repository_operation(BACKEND, "update", &result, started.elapsed());

        let plan = result?;
        record_reconciliation(&plan);
        info!(
            removed = plan.removals().count(),
            inserted = plan.insertions().count(),
            quantity_changes = plan.quantity_changes().count(),
            total = %order.total(),
            "Order reconciled"
        );
        Ok(plan)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn find(&self, id: &OrderId) -> Result<Order, RepositoryError> {
        let started = Instant::now();
        let result = self.load(id).await;
        record_repository_operation(BACKEND, "find", &result, started.elapsed());
        result
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let started = Instant::now();
        let result = self.load_all().await;
        record_repository_operation(BACKEND, "find_all", &result, started.elapsed());

        if let Ok(orders) = &result {
            debug!(count = orders.len(), "Loaded orders");
        }
        result
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn stored_total(&self, id: &OrderId) -> Result<Money, RepositoryError> {
        let started = Instant::now();
        let result = self.load_total(id).await;
        record_repository_operation(BACKEND, "stored_total", &result, started.elapsed());
        result
    }
}

// ============================================================================
// Write units
// ============================================================================

enum Session {
    Atomic(Transaction<'static, Sqlite>),
    AutoCommit(PoolConnection<Sqlite>),
}

/// The connection one port call writes through, plus how far it got.
struct WriteUnit {
    session: Session,
    order_id: OrderId,
    completed_writes: usize,
}

impl WriteUnit {
    fn conn(&mut self) -> &mut SqliteConnection {
        match &mut self.session {
            Session::Atomic(tx) => &mut **tx,
            Session::AutoCommit(conn) => &mut **conn,
        }
    }

    const fn commits_each_write(&self) -> bool {
        matches!(self.session, Session::AutoCommit(_))
    }

    fn record_write(&mut self) {
        self.completed_writes += 1;
    }

    async fn finish<T>(
        self,
        outcome: Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let Self {
            session,
            order_id,
            completed_writes,
        } = self;

        match (session, outcome) {
            (Session::Atomic(tx), Ok(value)) => {
                tx.commit().await.map_err(translate_error)?;
                Ok(value)
            }
            (Session::Atomic(tx), Err(err)) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(order_id = %order_id, error = %rollback, "Rollback failed");
                }
                debug!(order_id = %order_id, completed_writes, "Rolled back");
                Err(err)
            }
            (Session::AutoCommit(_), Ok(value)) => Ok(value),
            (Session::AutoCommit(_), Err(err)) if completed_writes > 0 => {
                warn!(
                    order_id = %order_id,
                    completed_writes,
                    error = %err,
                    "Write failed after partial progress"
                );
                Err(RepositoryError::PartialReconciliation {
                    order_id: order_id.into_inner(),
                    completed_writes,
                    cause: Box::new(err),
                })
            }
            (Session::AutoCommit(_), Err(err)) => Err(err),
        }
    }
}

async fn write_new_order(unit: &mut WriteUnit, order: &Order) -> Result<(), RepositoryError> {
    insert_order(unit.conn(), &OrderRecord::from_order(order)).await?;
    unit.record_write();

    for item in order.items() {
        insert_item(unit.conn(), &OrderItemRecord::from_item(order.id(), item)).await?;
        unit.record_write();
    }
    Ok(())
}

async fn write_added_item(
    unit: &mut WriteUnit,
    order: &Order,
    item: &OrderItem,
) -> Result<(), RepositoryError> {
    ensure_order_exists(unit.conn(), order.id()).await?;

    insert_item(unit.conn(), &OrderItemRecord::from_item(order.id(), item)).await?;
    unit.record_write();

    update_total(unit.conn(), order.id(), order.total()).await?;
    unit.record_write();
    Ok(())
}

async fn write_deleted_item(
    unit: &mut WriteUnit,
    order: &Order,
    item: &OrderItem,
) -> Result<(), RepositoryError> {
    ensure_order_exists(unit.conn(), order.id()).await?;

    let deleted = delete_item(unit.conn(), order.id(), item.id()).await?;
    unit.record_write();
    if deleted == 0 {
        debug!(item_id = %item.id(), "Item not stored, nothing deleted");
    }

    update_total(unit.conn(), order.id(), order.total()).await?;
    unit.record_write();
    Ok(())
}

async fn write_item_quantity(
    unit: &mut WriteUnit,
    order: &Order,
    item: &OrderItem,
) -> Result<(), RepositoryError> {
    ensure_order_exists(unit.conn(), order.id()).await?;

    let updated = update_item_quantity(unit.conn(), order.id(), item).await?;
    unit.record_write();
    if updated == 0 {
        debug!(item_id = %item.id(), "Item not stored, quantity unchanged");
    }

    update_total(unit.conn(), order.id(), order.total()).await?;
    unit.record_write();
    Ok(())
}

async fn write_reconciliation(
    unit: &mut WriteUnit,
    order: &Order,
) -> Result<ReconciliationPlan, RepositoryError> {
    ensure_order_exists(unit.conn(), order.id()).await?;

    let persisted = fetch_items(unit.conn(), order.id())
        .await?
        .into_iter()
        .map(OrderItemRecord::into_item)
        .collect::<Result<Vec<_>, _>>()?;

    let plan = ReconciliationPlan::between(&persisted, order.items());
    debug!(operations = plan.operation_count(), "Planned item writes");

    for step in plan.steps() {
        match step {
            ReconciliationStep::Remove(item) => {
                delete_item(unit.conn(), order.id(), item.id()).await?;
            }
            ReconciliationStep::Insert(item) => {
                insert_item(unit.conn(), &OrderItemRecord::from_item(order.id(), item)).await?;
            }
            ReconciliationStep::ChangeQuantity { item, previous } => {
                debug!(item_id = %item.id(), from = %previous, to = %item.quantity(), "Quantity change");
                update_item_quantity(unit.conn(), order.id(), item).await?;
            }
        }
        unit.record_write();

        // Without a transaction the parent total tracks every committed step.
        if unit.commits_each_write() {
            update_total(unit.conn(), order.id(), order.total()).await?;
            unit.record_write();
        }
    }

    let record = OrderRecord::from_order(order);
    sqlx::query("UPDATE orders SET customer_id = ?, total = ? WHERE id = ?")
        .bind(&record.customer_id)
        .bind(&record.total)
        .bind(&record.id)
        .execute(unit.conn())
        .await
        .map_err(translate_error)?;
    unit.record_write();

    Ok(plan)
}

// ============================================================================
// Statements
// ============================================================================

async fn fetch_order(
    conn: &mut SqliteConnection,
    id: &OrderId,
) -> Result<Option<OrderRecord>, RepositoryError> {
    sqlx::query_as(SELECT_ORDER)
        .bind(id.as_str())
        .fetch_optional(conn)
        .await
        .map_err(translate_error)
}

async fn fetch_items(
    conn: &mut SqliteConnection,
    id: &OrderId,
) -> Result<Vec<OrderItemRecord>, RepositoryError> {
    sqlx::query_as(SELECT_ITEMS)
        .bind(id.as_str())
        .fetch_all(conn)
        .await
        .map_err(translate_error)
}

async fn ensure_order_exists(
    conn: &mut SqliteConnection,
    id: &OrderId,
) -> Result<(), RepositoryError> {
    let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM orders WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(conn)
        .await
        .map_err(translate_error)?;

    found
        .map(|_| ())
        .ok_or_else(|| RepositoryError::not_found(id.as_str()))
}

async fn insert_order(
    conn: &mut SqliteConnection,
    record: &OrderRecord,
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT INTO orders (id, customer_id, total) VALUES (?, ?, ?)")
        .bind(&record.id)
        .bind(&record.customer_id)
        .bind(&record.total)
        .execute(conn)
        .await
        .map_err(translate_error)?;
    Ok(())
}

async fn insert_item(
    conn: &mut SqliteConnection,
    record: &OrderItemRecord,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO order_items (id, order_id, name, price, product_id, quantity) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(&record.order_id)
    .bind(&record.name)
    .bind(&record.price)
    .bind(&record.product_id)
    .bind(record.quantity)
    .execute(conn)
    .await
    .map_err(translate_error)?;
    Ok(())
}

async fn delete_item(
    conn: &mut SqliteConnection,
    order_id: &OrderId,
    item_id: &OrderItemId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM order_items WHERE id = ? AND order_id = ?")
        .bind(item_id.as_str())
        .bind(order_id.as_str())
        .execute(conn)
        .await
        .map_err(translate_error)?;
    Ok(result.rows_affected())
}

async fn update_item_quantity(
    conn: &mut SqliteConnection,
    order_id: &OrderId,
    item: &OrderItem,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query("UPDATE order_items SET quantity = ? WHERE id = ? AND order_id = ?")
        .bind(i64::from(item.quantity()))
        .bind(item.id().as_str())
        .bind(order_id.as_str())
        .execute(conn)
        .await
        .map_err(translate_error)?;
    Ok(result.rows_affected())
}

async fn update_total(
    conn: &mut SqliteConnection,
    order_id: &OrderId,
    total: Money,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE orders SET total = ? WHERE id = ?")
        .bind(total.to_storage_string())
        .bind(order_id.as_str())
        .execute(conn)
        .await
        .map_err(translate_error)?;
    Ok(())
}

async fn create_parent_dir(options: &SqliteConnectOptions) -> Result<(), RepositoryError> {
    let Some(parent) = options.get_filename().parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(parent).await.map_err(|e| {
        RepositoryError::unavailable(format!(
            "cannot create database directory '{}': {e}",
            parent.display()
        ))
    })
}
