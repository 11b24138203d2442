//! Storage port for transaction records.
//!
//! Every lookup that targets a single record takes both the external id and
//! the owner id, so a record owned by someone else behaves exactly like a
//! missing one.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Transaction, TransactionPatch};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Transaction with expenseID '{0}' already exists")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// All records owned by `owner_id`, newest `date` first.
    async fn find_by_owner(&self, owner_id: &str) -> RepositoryResult<Vec<Transaction>>;

    /// Owner-scoped point read. The record operations mutate through the
    /// atomic `find_one_and_*` calls instead; this serves adapter tests and
    /// read-back checks.
    async fn find_one(
        &self,
        expense_id: &str,
        owner_id: &str,
    ) -> RepositoryResult<Option<Transaction>>;

    /// Fails with [`RepositoryError::Duplicate`] when the expense id is taken
    /// by any owner.
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction>;

    async fn find_one_and_update(
        &self,
        expense_id: &str,
        owner_id: &str,
        patch: &TransactionPatch,
    ) -> RepositoryResult<Option<Transaction>>;

    async fn find_one_and_delete(
        &self,
        expense_id: &str,
        owner_id: &str,
    ) -> RepositoryResult<Option<Transaction>>;

    /// Cheap connectivity probe used by the health endpoint.
    async fn ping(&self) -> RepositoryResult<()>;
}
