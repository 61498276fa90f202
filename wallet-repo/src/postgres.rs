//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use wallet_types::{
    LedgerRepository, Page, Payment, PaymentId, RepoError, UnitOfWork, UserId, Wallet, WalletId,
    WalletTransaction,
};

use crate::types::{DbPayment, DbWallet, DbWalletTransaction, db_err, tx_err};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository with row-level locking.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_wallets_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_payments_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        tracing::debug!("PostgreSQL schema ready");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared statements
// ─────────────────────────────────────────────────────────────────────────────

const PAYMENT_COLUMNS: &str = "id, user_id, booking_id, amount, method, status, external_id, redirect_url, error_message, created_at, updated_at";

async fn ensure_wallet(conn: &mut PgConnection, user_id: UserId) -> Result<(), RepoError> {
    let now = Utc::now();

    sqlx::query(
        r#"INSERT INTO wallets (id, user_id, balance, created_at, updated_at) VALUES ($1, $2, 0, $3, $3)
           ON CONFLICT (user_id) DO NOTHING"#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id.into_uuid())
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit of work
// ─────────────────────────────────────────────────────────────────────────────

/// A PostgreSQL transaction holding `FOR UPDATE` row locks.
/// Rolls back when dropped uncommitted.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_wallet(&mut self, user_id: UserId) -> Result<Wallet, RepoError> {
        ensure_wallet(&mut self.tx, user_id).await?;

        let row: DbWallet = sqlx::query_as(
            r#"SELECT id, user_id, balance, created_at, updated_at FROM wallets
               WHERE user_id = $1 FOR UPDATE"#,
        )
        .bind(user_id.into_uuid())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.into_domain()
    }

    async fn save_wallet(&mut self, wallet: &Wallet) -> Result<(), RepoError> {
        let result = sqlx::query(r#"UPDATE wallets SET balance = $1, updated_at = $2 WHERE id = $3"#)
            .bind(wallet.balance)
            .bind(wallet.updated_at)
            .bind(wallet.id.into_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn append_transaction(&mut self, entry: &WalletTransaction) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO wallet_transactions (id, wallet_id, kind, amount, description, booking_id, payment_id, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(entry.id.into_uuid())
        .bind(entry.wallet_id.into_uuid())
        .bind(entry.kind.as_ref())
        .bind(entry.amount.value())
        .bind(&entry.description)
        .bind(entry.booking_id.map(|b| b.into_uuid()))
        .bind(entry.payment_id.map(|p| p.into_uuid()))
        .bind(entry.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn lock_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1 FOR UPDATE", PAYMENT_COLUMNS);
        let row: Option<DbPayment> = sqlx::query_as(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_err)?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn lock_payment_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<Payment>, RepoError> {
        let sql = format!(
            "SELECT {} FROM payments WHERE external_id = $1 FOR UPDATE",
            PAYMENT_COLUMNS
        );
        let row: Option<DbPayment> = sqlx::query_as(&sql)
            .bind(external_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_err)?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn save_payment(&mut self, payment: &Payment) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"UPDATE payments SET status = $1, external_id = $2, redirect_url = $3, error_message = $4, updated_at = $5
               WHERE id = $6"#,
        )
        .bind(payment.status.as_ref())
        .bind(&payment.external_id)
        .bind(&payment.redirect_url)
        .bind(&payment.error_message)
        .bind(payment.updated_at)
        .bind(payment.id.into_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), RepoError> {
        self.tx.commit().await.map_err(tx_err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl LedgerRepository for PostgresRepo {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, RepoError> {
        let tx = self.pool.begin().await.map_err(tx_err)?;
        Ok(PgUnitOfWork { tx })
    }

    async fn get_or_create_wallet(&self, user_id: UserId) -> Result<Wallet, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        ensure_wallet(&mut conn, user_id).await?;

        let row: DbWallet = sqlx::query_as(
            r#"SELECT id, user_id, balance, created_at, updated_at FROM wallets WHERE user_id = $1"#,
        )
        .bind(user_id.into_uuid())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err)?;

        row.into_domain()
    }

    async fn find_wallet(&self, user_id: UserId) -> Result<Option<Wallet>, RepoError> {
        let row: Option<DbWallet> = sqlx::query_as(
            r#"SELECT id, user_id, balance, created_at, updated_at FROM wallets WHERE user_id = $1"#,
        )
        .bind(user_id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DbWallet::into_domain).transpose()
    }

    async fn list_transactions(
        &self,
        wallet_id: WalletId,
        page: Page,
    ) -> Result<Vec<WalletTransaction>, RepoError> {
        let rows: Vec<DbWalletTransaction> = sqlx::query_as(
            r#"SELECT id, wallet_id, kind, amount, description, booking_id, payment_id, created_at
               FROM wallet_transactions WHERE wallet_id = $1
               ORDER BY seq DESC LIMIT $2 OFFSET $3"#,
        )
        .bind(wallet_id.into_uuid())
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbWalletTransaction::into_domain).collect()
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, user_id, booking_id, amount, method, status, external_id, redirect_url, error_message, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(payment.id.into_uuid())
        .bind(payment.user_id.into_uuid())
        .bind(payment.booking_id.map(|b| b.into_uuid()))
        .bind(payment.amount.value())
        .bind(payment.method.as_ref())
        .bind(payment.status.as_ref())
        .bind(&payment.external_id)
        .bind(&payment.redirect_url)
        .bind(&payment.error_message)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        let row: Option<DbPayment> = sqlx::query_as(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payments(&self, user_id: UserId, page: Page) -> Result<Vec<Payment>, RepoError> {
        let sql = format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY seq DESC LIMIT $2 OFFSET $3",
            PAYMENT_COLUMNS
        );
        let rows: Vec<DbPayment> = sqlx::query_as(&sql)
            .bind(user_id.into_uuid())
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(DbPayment::into_domain).collect()
    }
}
