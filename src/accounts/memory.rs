use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{AccountStore, StoreError, StoreResult};
use super::repo_types::{NewTransaction, NewUser, Transaction, User};

/// In-process store with the same conditional-update semantics as Postgres.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    transactions: HashMap<Uuid, Transaction>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user with a fixed balance, bypassing registration rules.
    pub fn seed_user(&self, email: &str, credit_balance: i64) -> User {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".into(),
            email: email.to_lowercase(),
            password_hash: String::new(),
            credit_balance,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().unwrap().users.insert(user.id, user.clone());
        user
    }

    pub fn set_active(&self, id: Uuid, active: bool) {
        if let Some(u) = self.inner.lock().unwrap().users.get_mut(&id) {
            u.is_active = active;
        }
    }

    pub fn balance_of(&self, id: Uuid) -> Option<i64> {
        self.inner.lock().unwrap().users.get(&id).map(|u| u.credit_balance)
    }

    pub fn transaction(&self, id: Uuid) -> Option<Transaction> {
        self.inner.lock().unwrap().transactions.get(&id).cloned()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.inner.lock().unwrap();
        if t.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::Duplicate);
        }
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            credit_balance: 5,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        if let Some(u) = self.inner.lock().unwrap().users.get_mut(&id) {
            u.last_login_at = Some(OffsetDateTime::now_utc());
        }
        Ok(())
    }

    async fn try_debit(&self, id: Uuid, amount: i64) -> StoreResult<Option<i64>> {
        let mut t = self.inner.lock().unwrap();
        Ok(t.users.get_mut(&id).and_then(|u| {
            if u.credit_balance > 0 && u.credit_balance >= amount {
                u.credit_balance -= amount;
                Some(u.credit_balance)
            } else {
                None
            }
        }))
    }

    async fn credit(&self, id: Uuid, amount: i64) -> StoreResult<Option<i64>> {
        let mut t = self.inner.lock().unwrap();
        Ok(t.users.get_mut(&id).map(|u| {
            u.credit_balance += amount;
            u.credit_balance
        }))
    }

    async fn create_transaction(&self, tx: NewTransaction) -> StoreResult<Transaction> {
        let row = Transaction {
            id: Uuid::new_v4(),
            user_id: tx.user_id,
            plan: tx.plan,
            credits: tx.credits,
            amount: tx.amount,
            settled: false,
            order_id: None,
            payment_id: None,
            created_at: OffsetDateTime::now_utc(),
            settled_at: None,
        };
        self.inner
            .lock()
            .unwrap()
            .transactions
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn attach_order(&self, tx_id: Uuid, order_id: &str) -> StoreResult<()> {
        if let Some(tx) = self.inner.lock().unwrap().transactions.get_mut(&tx_id) {
            tx.order_id = Some(order_id.to_string());
        }
        Ok(())
    }

    async fn find_transaction_by_order(&self, order_id: &str) -> StoreResult<Option<Transaction>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .transactions
            .values()
            .find(|t| t.order_id.as_deref() == Some(order_id))
            .cloned())
    }

    async fn settle_transaction(
        &self,
        tx_id: Uuid,
        payment_id: Option<&str>,
    ) -> StoreResult<Option<i64>> {
        let mut t = self.inner.lock().unwrap();
        let Tables {
            users,
            transactions,
        } = &mut *t;
        let Some(tx) = transactions.get_mut(&tx_id).filter(|tx| !tx.settled) else {
            return Ok(None);
        };
        let Some(user) = users.get_mut(&tx.user_id) else {
            return Ok(None);
        };
        tx.settled = true;
        tx.settled_at = Some(OffsetDateTime::now_utc());
        if let Some(p) = payment_id {
            tx.payment_id = Some(p.to_string());
        }
        user.credit_balance += tx.credits;
        Ok(Some(user.credit_balance))
    }

    async fn list_transactions(&self, user_id: Uuid) -> StoreResult<Vec<Transaction>> {
        let mut rows: Vec<Transaction> = self
            .inner
            .lock()
            .unwrap()
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
