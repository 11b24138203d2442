//! In-process implementation of TransactionRepository.
//!
//! Used for local runs without Postgres (`STORE_BACKEND=memory`) and by the
//! test suites.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{Transaction, TransactionPatch};
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

/// Records keyed by expense id, which keeps the uniqueness rule global.
#[derive(Clone, Default)]
pub struct MemoryTransactionRepository {
    records: Arc<RwLock<HashMap<String, Transaction>>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations served so far, `ping` excluded.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransactionRepository for MemoryTransactionRepository {
    async fn find_by_owner(&self, owner_id: &str) -> RepositoryResult<Vec<Transaction>> {
        self.record_call();
        let records = self.records.read().await;

        let mut owned: Vec<Transaction> = records
            .values()
            .filter(|tx| tx.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

        Ok(owned)
    }

    async fn find_one(
        &self,
        expense_id: &str,
        owner_id: &str,
    ) -> RepositoryResult<Option<Transaction>> {
        self.record_call();
        let records = self.records.read().await;

        Ok(records
            .get(expense_id)
            .filter(|tx| tx.owner_id == owner_id)
            .cloned())
    }

    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        self.record_call();
        let mut records = self.records.write().await;

        if records.contains_key(&tx.expense_id) {
            return Err(RepositoryError::Duplicate(tx.expense_id.clone()));
        }
        records.insert(tx.expense_id.clone(), tx.clone());

        Ok(tx.clone())
    }

    async fn find_one_and_update(
        &self,
        expense_id: &str,
        owner_id: &str,
        patch: &TransactionPatch,
    ) -> RepositoryResult<Option<Transaction>> {
        self.record_call();
        let mut records = self.records.write().await;

        Ok(records
            .get_mut(expense_id)
            .filter(|tx| tx.owner_id == owner_id)
            .map(|tx| {
                tx.apply(patch);
                tx.clone()
            }))
    }

    async fn find_one_and_delete(
        &self,
        expense_id: &str,
        owner_id: &str,
    ) -> RepositoryResult<Option<Transaction>> {
        self.record_call();
        let mut records = self.records.write().await;

        let owned = records
            .get(expense_id)
            .is_some_and(|tx| tx.owner_id == owner_id);
        if !owned {
            return Ok(None);
        }

        Ok(records.remove(expense_id))
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTransaction, TransactionKind};
    use bigdecimal::BigDecimal;

    fn record(owner: &str, expense_id: &str, date: &str) -> Transaction {
        Transaction::new(
            owner.to_string(),
            NewTransaction {
                expense_id: expense_id.to_string(),
                title: "Lunch".to_string(),
                amount: BigDecimal::from(12),
                category: "Food".to_string(),
                description: String::new(),
                occurred_at: date.to_string(),
                kind: TransactionKind::Debit,
            },
        )
    }

    #[tokio::test]
    async fn lists_only_owned_records_newest_first() {
        let repo = MemoryTransactionRepository::new();
        repo.insert(&record("u1", "a", "2024-01-01T00:00:00Z")).await.unwrap();
        repo.insert(&record("u1", "b", "2024-03-01T00:00:00Z")).await.unwrap();
        repo.insert(&record("u2", "c", "2024-02-01T00:00:00Z")).await.unwrap();

        let listed = repo.find_by_owner("u1").await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|tx| tx.expense_id.as_str()).collect();

        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn rejects_duplicate_expense_id_across_owners() {
        let repo = MemoryTransactionRepository::new();
        repo.insert(&record("u1", "dup", "2024-01-01")).await.unwrap();

        let err = repo.insert(&record("u2", "dup", "2024-01-02")).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Duplicate(id) if id == "dup"));
        assert_eq!(repo.len().await, 1);
        let kept = repo.find_one("dup", "u1").await.unwrap().unwrap();
        assert_eq!(kept.occurred_at, "2024-01-01");
    }

    #[tokio::test]
    async fn foreign_records_are_invisible_to_update_and_delete() {
        let repo = MemoryTransactionRepository::new();
        repo.insert(&record("u1", "e1", "2024-01-01")).await.unwrap();
        let patch = TransactionPatch {
            title: Some("Stolen".to_string()),
            ..Default::default()
        };

        assert!(repo.find_one("e1", "u2").await.unwrap().is_none());
        assert!(repo.find_one_and_update("e1", "u2", &patch).await.unwrap().is_none());
        assert!(repo.find_one_and_delete("e1", "u2").await.unwrap().is_none());

        let kept = repo.find_one("e1", "u1").await.unwrap().unwrap();
        assert_eq!(kept.title, "Lunch");
    }

    #[tokio::test]
    async fn counts_store_calls() {
        let repo = MemoryTransactionRepository::new();
        assert_eq!(repo.call_count(), 0);

        repo.find_by_owner("u1").await.unwrap();
        repo.ping().await.unwrap();

        assert_eq!(repo.call_count(), 1);
    }
}
