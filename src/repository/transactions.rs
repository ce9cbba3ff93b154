//! Checkout / check-in repository
//!
//! Both kinds share a schema and live in separate tables, so every query is
//! parameterized by [`TransactionKind::table`].

use async_trait::async_trait;
use sqlx::{types::Json, Pool, Postgres};

use super::TransactionStore;
use crate::{
    error::AppResult,
    models::{transaction::TransactionRow, Transaction, TransactionKind},
};

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for TransactionsRepository {
    async fn insert(&self, transaction: &Transaction) -> AppResult<()> {
        let query = format!(
            "INSERT INTO {} (id, user_id, project, items, date, status) VALUES ($1, $2, $3, $4, $5, $6)",
            transaction.kind.table()
        );

        sqlx::query(&query)
            .bind(transaction.id)
            .bind(&transaction.user_id)
            .bind(&transaction.project)
            .bind(Json(&transaction.items))
            .bind(transaction.date)
            .bind(&transaction.status)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            transaction_id = %transaction.id,
            kind = %transaction.kind,
            items = transaction.items.len(),
            "transaction inserted"
        );
        Ok(())
    }

    async fn list(&self, kind: TransactionKind) -> AppResult<Vec<Transaction>> {
        let query = format!("SELECT * FROM {} ORDER BY date DESC, id", kind.table());
        let rows = sqlx::query_as::<_, TransactionRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.into_transaction(kind)).collect())
    }
}
