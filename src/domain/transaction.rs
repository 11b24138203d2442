//! Transaction domain entity.
//! Framework-agnostic representation of a personal income or expense record.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Credit,
    #[default]
    Debit,
}

impl TransactionKind {
    pub const ALLOWED: &'static [&'static str] = &["CREDIT", "DEBIT"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "CREDIT",
            TransactionKind::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(TransactionKind::Credit),
            "DEBIT" => Ok(TransactionKind::Debit),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// A transaction owned by exactly one user.
///
/// `owner_id` and `created_at` are fixed at construction; `expense_id` is the
/// client-chosen key and is unique across all owners.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub owner_id: String,
    #[serde(rename = "expenseID")]
    pub expense_id: String,
    pub title: String,
    #[serde(serialize_with = "crate::domain::amount::serialize")]
    #[schema(value_type = f64)]
    pub amount: BigDecimal,
    pub category: String,
    pub description: String,
    /// Client-supplied ISO-8601 string, kept verbatim.
    #[serde(rename = "date")]
    pub occurred_at: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Validated fields for a new transaction, before an owner is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub expense_id: String,
    pub title: String,
    pub amount: BigDecimal,
    pub category: String,
    pub description: String,
    pub occurred_at: String,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(owner_id: String, input: NewTransaction) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            expense_id: input.expense_id,
            title: input.title,
            amount: input.amount,
            category: input.category,
            description: input.description,
            occurred_at: input.occurred_at,
            kind: input.kind,
            created_at: Utc::now(),
        }
    }

    /// Applies the mutable fields present in `patch`.
    pub fn apply(&mut self, patch: &TransactionPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(amount) = &patch.amount {
            self.amount = amount.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(occurred_at) = &patch.occurred_at {
            self.occurred_at = occurred_at.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
    }
}

/// Partial update. Only the mutable fields exist here, so identity and
/// creation time cannot be changed through it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub title: Option<String>,
    pub amount: Option<BigDecimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: Option<String>,
    pub kind: Option<TransactionKind>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.occurred_at.is_none()
            && self.kind.is_none()
    }
}
