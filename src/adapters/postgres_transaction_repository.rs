//! Postgres implementation of TransactionRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionKind, TransactionPatch};
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

const UNIQUE_VIOLATION: &str = "23505";

const COLUMNS: &str =
    "id, user_id, expense_id, title, amount, category, description, occurred_at, kind, created_at";

/// Postgres-backed transaction repository.
#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn find_by_owner(&self, owner_id: &str) -> RepositoryResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE user_id = $1 ORDER BY occurred_at DESC",
            COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    async fn find_one(
        &self,
        expense_id: &str,
        owner_id: &str,
    ) -> RepositoryResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE expense_id = $1 AND user_id = $2",
            COLUMNS
        ))
        .bind(expense_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TransactionRow::into_domain).transpose()
    }

    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            INSERT INTO transactions (
                id, user_id, expense_id, title, amount,
                category, description, occurred_at, kind, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(tx.id)
        .bind(&tx.owner_id)
        .bind(&tx.expense_id)
        .bind(&tx.title)
        .bind(&tx.amount)
        .bind(&tx.category)
        .bind(&tx.description)
        .bind(&tx.occurred_at)
        .bind(tx.kind.as_str())
        .bind(tx.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Duplicate(tx.expense_id.clone())
            } else {
                RepositoryError::from(e)
            }
        })?;

        row.into_domain()
    }

    async fn find_one_and_update(
        &self,
        expense_id: &str,
        owner_id: &str,
        patch: &TransactionPatch,
    ) -> RepositoryResult<Option<Transaction>> {
        // Single statement, so the match and the write happen atomically.
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            UPDATE transactions SET
                title = COALESCE($3, title),
                amount = COALESCE($4, amount),
                category = COALESCE($5, category),
                description = COALESCE($6, description),
                occurred_at = COALESCE($7, occurred_at),
                kind = COALESCE($8, kind)
            WHERE expense_id = $1 AND user_id = $2
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(expense_id)
        .bind(owner_id)
        .bind(&patch.title)
        .bind(&patch.amount)
        .bind(&patch.category)
        .bind(&patch.description)
        .bind(&patch.occurred_at)
        .bind(patch.kind.map(|kind| kind.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(TransactionRow::into_domain).transpose()
    }

    async fn find_one_and_delete(
        &self,
        expense_id: &str,
        owner_id: &str,
    ) -> RepositoryResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "DELETE FROM transactions WHERE expense_id = $1 AND user_id = $2 RETURNING {}",
            COLUMNS
        ))
        .bind(expense_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TransactionRow::into_domain).transpose()
    }

    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: String,
    expense_id: String,
    title: String,
    amount: BigDecimal,
    category: String,
    description: String,
    occurred_at: String,
    kind: String,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> RepositoryResult<Transaction> {
        let kind = self
            .kind
            .parse::<TransactionKind>()
            .map_err(RepositoryError::Database)?;

        Ok(Transaction {
            id: self.id,
            owner_id: self.user_id,
            expense_id: self.expense_id,
            title: self.title,
            amount: self.amount,
            category: self.category,
            description: self.description,
            occurred_at: self.occurred_at,
            kind,
            created_at: self.created_at,
        })
    }
}
