use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::repo_types::{NewTransaction, NewUser, Transaction, User};
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists")]
    Duplicate,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => AppError::Conflict("User already exists with this email".into()),
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e).context("account store")),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users and their purchase transactions.
///
/// Balance changes are single-statement conditional updates so concurrent
/// requests for the same user never need an application-level lock.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn record_login(&self, id: Uuid) -> StoreResult<()>;

    /// Subtracts `amount` when the balance covers it. `None` when the user is
    /// missing or the balance is too low.
    async fn try_debit(&self, id: Uuid, amount: i64) -> StoreResult<Option<i64>>;
    async fn credit(&self, id: Uuid, amount: i64) -> StoreResult<Option<i64>>;

    async fn create_transaction(&self, tx: NewTransaction) -> StoreResult<Transaction>;
    async fn attach_order(&self, tx_id: Uuid, order_id: &str) -> StoreResult<()>;
    async fn find_transaction_by_order(&self, order_id: &str) -> StoreResult<Option<Transaction>>;

    /// Flips `settled` false -> true and credits the owner in one step.
    /// Returns the owner's new balance, or `None` if the transaction was
    /// already settled (or does not exist).
    async fn settle_transaction(&self, tx_id: Uuid, payment_id: Option<&str>)
        -> StoreResult<Option<i64>>;

    async fn list_transactions(&self, user_id: Uuid) -> StoreResult<Vec<Transaction>>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, credit_balance, is_active, \
                            last_login_at, created_at, updated_at";
const TX_COLUMNS: &str = "id, user_id, plan, credits, amount, settled, order_id, payment_id, \
                          created_at, settled_at";

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate,
                other => StoreError::Database(other),
            })
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_login_at = now(), updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn try_debit(&self, id: Uuid, amount: i64) -> StoreResult<Option<i64>> {
        Ok(sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
               SET credit_balance = credit_balance - $2, updated_at = now()
             WHERE id = $1 AND credit_balance > 0 AND credit_balance >= $2
            RETURNING credit_balance
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.db)
        .await?)
    }

    async fn credit(&self, id: Uuid, amount: i64) -> StoreResult<Option<i64>> {
        Ok(sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
               SET credit_balance = credit_balance + $2, updated_at = now()
             WHERE id = $1
            RETURNING credit_balance
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.db)
        .await?)
    }

    async fn create_transaction(&self, tx: NewTransaction) -> StoreResult<Transaction> {
        let sql = format!(
            "INSERT INTO transactions (id, user_id, plan, credits, amount) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TX_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Transaction>(&sql)
            .bind(Uuid::new_v4())
            .bind(tx.user_id)
            .bind(&tx.plan)
            .bind(tx.credits)
            .bind(tx.amount)
            .fetch_one(&self.db)
            .await?)
    }

    async fn attach_order(&self, tx_id: Uuid, order_id: &str) -> StoreResult<()> {
        sqlx::query("UPDATE transactions SET order_id = $2 WHERE id = $1")
            .bind(tx_id)
            .bind(order_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn find_transaction_by_order(&self, order_id: &str) -> StoreResult<Option<Transaction>> {
        let sql = format!("SELECT {TX_COLUMNS} FROM transactions WHERE order_id = $1");
        Ok(sqlx::query_as::<_, Transaction>(&sql)
            .bind(order_id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn settle_transaction(
        &self,
        tx_id: Uuid,
        payment_id: Option<&str>,
    ) -> StoreResult<Option<i64>> {
        Ok(sqlx::query_scalar::<_, i64>(
            r#"
            WITH settled AS (
                UPDATE transactions
                   SET settled = TRUE, payment_id = COALESCE($2, payment_id), settled_at = now()
                 WHERE id = $1 AND settled = FALSE
                RETURNING user_id, credits
            )
            UPDATE users u
               SET credit_balance = u.credit_balance + s.credits, updated_at = now()
              FROM settled s
             WHERE u.id = s.user_id
            RETURNING u.credit_balance
            "#,
        )
        .bind(tx_id)
        .bind(payment_id)
        .fetch_optional(&self.db)
        .await?)
    }

    async fn list_transactions(&self, user_id: Uuid) -> StoreResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TX_COLUMNS} FROM transactions WHERE user_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Transaction>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?)
    }
}
