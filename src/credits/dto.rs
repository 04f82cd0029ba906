use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::Transaction;

#[derive(Debug, Serialize)]
pub struct CreditOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsResponse {
    pub success: bool,
    pub credit_balance: i64,
    pub user: CreditOwner,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: Uuid,
    pub plan: String,
    pub credits: i64,
    pub amount: i64,
    pub settled: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Transaction> for TransactionItem {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            plan: t.plan,
            credits: t.credits,
            amount: t.amount,
            settled: t.settled,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub success: bool,
    pub transactions: Vec<TransactionItem>,
}
