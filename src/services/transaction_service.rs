//! Ownership-scoped operations on transaction records.
//!
//! Each operation performs exactly one store call, filtered by the caller's
//! uid, and bounded by the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::Transaction;
use crate::error::AppError;
use crate::ports::{RepositoryResult, TransactionRepository};
use crate::schemas::{CreateTransactionRequest, UpdateTransactionRequest};
use crate::validation;

pub const NOT_FOUND_MESSAGE: &str = "Transaction not found or unauthorized";

#[derive(Clone)]
pub struct TransactionService {
    repository: Arc<dyn TransactionRepository>,
    timeout: Duration,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn TransactionRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = RepositoryResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::Unavailable(format!(
                "store did not answer {} within {}ms",
                operation,
                self.timeout.as_millis()
            ))),
        }
    }

    pub async fn list(&self, uid: &str) -> Result<Vec<Transaction>, AppError> {
        self.bounded("list", self.repository.find_by_owner(uid)).await
    }

    pub async fn create(
        &self,
        uid: &str,
        req: CreateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        let input = validation::validate_create(req)?;
        let tx = Transaction::new(uid.to_string(), input);

        let created = self.bounded("insert", self.repository.insert(&tx)).await?;
        tracing::info!(uid = %uid, expense_id = %created.expense_id, "Transaction added");
        Ok(created)
    }

    pub async fn update(
        &self,
        uid: &str,
        req: UpdateTransactionRequest,
    ) -> Result<Transaction, AppError> {
        let (expense_id, patch) = validation::validate_update(req)?;

        let updated = self
            .bounded(
                "update",
                self.repository.find_one_and_update(&expense_id, uid, &patch),
            )
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

        tracing::info!(uid = %uid, expense_id = %expense_id, "Transaction updated");
        Ok(updated)
    }

    pub async fn delete(&self, uid: &str, expense_id: Option<String>) -> Result<(), AppError> {
        let expense_id = validation::validate_expense_id(expense_id)?;

        self.bounded(
            "delete",
            self.repository.find_one_and_delete(&expense_id, uid),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

        tracing::info!(uid = %uid, expense_id = %expense_id, "Transaction deleted");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.bounded("ping", self.repository.ping()).await
    }
}
