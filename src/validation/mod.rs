use bigdecimal::BigDecimal;
use serde_json::Value;
use std::fmt;

use crate::domain::{amount, NewTransaction, TransactionKind, TransactionPatch};
use crate::schemas::{CreateTransactionRequest, UpdateTransactionRequest};

pub const EXPENSE_ID_MAX_LEN: usize = 128;
pub const TITLE_MAX_LEN: usize = 200;
pub const CATEGORY_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 4000;
pub const DATE_MAX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn missing(field: &'static str) -> Self {
        Self::new(field, "is required")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_enum(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.iter().all(|candidate| value != *candidate) {
        return Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_expense_id(expense_id: Option<String>) -> Result<String, ValidationError> {
    let expense_id = expense_id.ok_or_else(|| ValidationError::missing("expenseID"))?;
    validate_required("expenseID", &expense_id)?;
    validate_max_len("expenseID", &expense_id, EXPENSE_ID_MAX_LEN)?;
    Ok(expense_id)
}

fn text_field(
    field: &'static str,
    value: String,
    max_len: usize,
) -> Result<String, ValidationError> {
    validate_required(field, &value)?;
    validate_max_len(field, &value, max_len)?;
    Ok(value)
}

fn amount_field(value: &Value) -> Result<BigDecimal, ValidationError> {
    let amount =
        amount::parse(value).ok_or_else(|| ValidationError::new("amount", "must be numeric"))?;
    if !amount::in_range(&amount) {
        return Err(ValidationError::new("amount", "is out of range"));
    }

    Ok(amount)
}

fn kind_field(value: &str) -> Result<TransactionKind, ValidationError> {
    validate_enum("type", value, TransactionKind::ALLOWED)?;
    value
        .parse()
        .map_err(|message: String| ValidationError::new("type", message))
}

fn description_field(value: String) -> Result<String, ValidationError> {
    validate_max_len("description", &value, DESCRIPTION_MAX_LEN)?;
    Ok(value)
}

/// Checks a create payload and produces the owner-less record fields.
pub fn validate_create(req: CreateTransactionRequest) -> Result<NewTransaction, ValidationError> {
    let expense_id = validate_expense_id(req.expense_id)?;
    let title = text_field(
        "title",
        req.title.ok_or_else(|| ValidationError::missing("title"))?,
        TITLE_MAX_LEN,
    )?;
    let amount = amount_field(
        req.amount
            .as_ref()
            .ok_or_else(|| ValidationError::missing("amount"))?,
    )?;
    let category = text_field(
        "category",
        req.category
            .ok_or_else(|| ValidationError::missing("category"))?,
        CATEGORY_MAX_LEN,
    )?;
    let occurred_at = text_field(
        "date",
        req.occurred_at
            .ok_or_else(|| ValidationError::missing("date"))?,
        DATE_MAX_LEN,
    )?;
    let description = description_field(req.description.unwrap_or_default())?;
    let kind = match req.kind.as_deref() {
        Some(kind) => kind_field(kind)?,
        None => TransactionKind::default(),
    };

    Ok(NewTransaction {
        expense_id,
        title,
        amount,
        category,
        description,
        occurred_at,
        kind,
    })
}

/// Checks an update payload. Returns the target expense id and the patch of
/// mutable fields; anything else in the payload never reaches the patch.
pub fn validate_update(
    req: UpdateTransactionRequest,
) -> Result<(String, TransactionPatch), ValidationError> {
    let expense_id = validate_expense_id(req.expense_id)?;

    let patch = TransactionPatch {
        title: req
            .title
            .map(|title| text_field("title", title, TITLE_MAX_LEN))
            .transpose()?,
        amount: req.amount.as_ref().map(amount_field).transpose()?,
        category: req
            .category
            .map(|category| text_field("category", category, CATEGORY_MAX_LEN))
            .transpose()?,
        description: req.description.map(description_field).transpose()?,
        occurred_at: req
            .occurred_at
            .map(|date| text_field("date", date, DATE_MAX_LEN))
            .transpose()?,
        kind: req.kind.as_deref().map(kind_field).transpose()?,
    };

    Ok((expense_id, patch))
}
