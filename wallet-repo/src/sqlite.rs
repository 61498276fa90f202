//! SQLite repository adapter.
//!
//! SQLite only has a database-wide write lock, so the pool is pinned to a
//! single connection: a unit of work owns that connection from `begin` until
//! commit or rollback, which serializes every read-validate-write sequence.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::str::FromStr;
use uuid::Uuid;

use wallet_types::{
    LedgerRepository, Page, Payment, PaymentId, RepoError, UnitOfWork, UserId, Wallet, WalletId,
    WalletTransaction,
};

use crate::types::{DbPayment, DbWallet, DbWalletTransaction, db_err, tx_err};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let ddl_wallets = include_str!("../migrations/0001_create_wallets.sql");
        sqlx::query(ddl_wallets).execute(&pool).await?;

        let ddl_payments = include_str!("../migrations/0002_create_payments.sql");
        sqlx::query(ddl_payments).execute(&pool).await?;

        tracing::debug!("SQLite schema ready at {}", database_url);

        Ok(Self { pool })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared statements
// ─────────────────────────────────────────────────────────────────────────────

async fn upsert_wallet(conn: &mut SqliteConnection, user_id: UserId) -> Result<Wallet, RepoError> {
    let now = Utc::now();

    sqlx::query(
        r#"INSERT INTO wallets (id, user_id, balance, created_at, updated_at) VALUES (?, ?, 0, ?, ?)
           ON CONFLICT (user_id) DO NOTHING"#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id.into_uuid())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;

    let row: DbWallet = sqlx::query_as(
        r#"SELECT id, user_id, balance, created_at, updated_at FROM wallets WHERE user_id = ?"#,
    )
    .bind(user_id.into_uuid())
    .fetch_one(&mut *conn)
    .await
    .map_err(db_err)?;

    row.into_domain()
}

/// How a payment row is looked up.
enum PaymentKey<'a> {
    Id(PaymentId),
    External(&'a str),
}

async fn select_payment(
    conn: &mut SqliteConnection,
    key: PaymentKey<'_>,
) -> Result<Option<Payment>, RepoError> {
    const SELECT: &str = r#"SELECT id, user_id, booking_id, amount, method, status, external_id, redirect_url, error_message, created_at, updated_at
           FROM payments"#;

    let row: Option<DbPayment> = match key {
        PaymentKey::Id(id) => {
            sqlx::query_as::<_, DbPayment>(&format!("{} WHERE id = ?", SELECT))
                .bind(id.into_uuid())
                .fetch_optional(&mut *conn)
                .await
        }
        PaymentKey::External(external_id) => {
            sqlx::query_as::<_, DbPayment>(&format!("{} WHERE external_id = ?", SELECT))
                .bind(external_id)
                .fetch_optional(&mut *conn)
                .await
        }
    }
    .map_err(db_err)?;

    row.map(DbPayment::into_domain).transpose()
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit of work
// ─────────────────────────────────────────────────────────────────────────────

/// A SQLite transaction. Rolls back when dropped uncommitted.
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn lock_wallet(&mut self, user_id: UserId) -> Result<Wallet, RepoError> {
        upsert_wallet(&mut self.tx, user_id).await
    }

    async fn save_wallet(&mut self, wallet: &Wallet) -> Result<(), RepoError> {
        let result = sqlx::query(r#"UPDATE wallets SET balance = ?, updated_at = ? WHERE id = ?"#)
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
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
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
        select_payment(&mut self.tx, PaymentKey::Id(id)).await
    }

    async fn lock_payment_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<Payment>, RepoError> {
        select_payment(&mut self.tx, PaymentKey::External(external_id)).await
    }

    async fn save_payment(&mut self, payment: &Payment) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"UPDATE payments SET status = ?, external_id = ?, redirect_url = ?, error_message = ?, updated_at = ?
               WHERE id = ?"#,
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
impl LedgerRepository for SqliteRepo {
    type Tx = SqliteUnitOfWork;

    async fn begin(&self) -> Result<SqliteUnitOfWork, RepoError> {
        let tx = self.pool.begin().await.map_err(tx_err)?;
        Ok(SqliteUnitOfWork { tx })
    }

    async fn get_or_create_wallet(&self, user_id: UserId) -> Result<Wallet, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        upsert_wallet(&mut conn, user_id).await
    }

    async fn find_wallet(&self, user_id: UserId) -> Result<Option<Wallet>, RepoError> {
        let row: Option<DbWallet> = sqlx::query_as(
            r#"SELECT id, user_id, balance, created_at, updated_at FROM wallets WHERE user_id = ?"#,
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
        // rowid grows with every insert, so it follows commit order.
        let rows: Vec<DbWalletTransaction> = sqlx::query_as(
            r#"SELECT id, wallet_id, kind, amount, description, booking_id, payment_id, created_at
               FROM wallet_transactions WHERE wallet_id = ?
               ORDER BY rowid DESC LIMIT ? OFFSET ?"#,
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
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
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
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        select_payment(&mut conn, PaymentKey::Id(id)).await
    }

    async fn list_payments(&self, user_id: UserId, page: Page) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(
            r#"SELECT id, user_id, booking_id, amount, method, status, external_id, redirect_url, error_message, created_at, updated_at
               FROM payments WHERE user_id = ?
               ORDER BY rowid DESC LIMIT ? OFFSET ?"#,
        )
        .bind(user_id.into_uuid())
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbPayment::into_domain).collect()
    }
}
