//! Entry primitives.
//!
//! An `Entry` is one recorded income or expense event. The stored amount is
//! always non-negative; the direction of its effect on the owner's balance
//! is carried by [`EntryKind`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, MoneyCents, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::InvalidArgument(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub amount: MoneyCents,
    pub kind: EntryKind,
    pub occurred_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(owner_id: String, draft: EntryDraft) -> ResultLedger<Self> {
        if draft.amount.is_negative() {
            return Err(LedgerError::InvalidArgument(
                "amount must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            title: draft.title,
            description: draft.description,
            amount: draft.amount,
            kind: draft.kind,
            occurred_at: draft.occurred_at,
        })
    }

    /// The entry's effect on the owner's balance: `+amount` for income,
    /// `-amount` for expense.
    pub fn signed_amount(&self) -> MoneyCents {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }
}

/// Caller-supplied fields for creating or editing an [`Entry`].
///
/// `id` and `owner_id` are never part of a draft; the store assigns the
/// former and the latter is fixed at creation.
#[derive(Clone, Debug)]
pub struct EntryDraft {
    pub title: String,
    pub description: String,
    pub amount: MoneyCents,
    pub kind: EntryKind,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub amount_cents: i64,
    pub kind: String,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::OwnerId",
        to = "super::account::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Entry> for ActiveModel {
    fn from(entry: &Entry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            owner_id: ActiveValue::Set(entry.owner_id.clone()),
            title: ActiveValue::Set(entry.title.clone()),
            description: ActiveValue::Set(entry.description.clone()),
            amount_cents: ActiveValue::Set(entry.amount.cents()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            occurred_at: ActiveValue::Set(entry.occurred_at),
        }
    }
}

impl TryFrom<Model> for Entry {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("entry not exists".to_string()))?,
            owner_id: model.owner_id,
            title: model.title,
            description: model.description,
            amount: MoneyCents::new(model.amount_cents),
            kind: EntryKind::try_from(model.kind.as_str())?,
            occurred_at: model.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(amount: i64, kind: EntryKind) -> EntryDraft {
        EntryDraft {
            title: "Groceries".to_string(),
            description: String::new(),
            amount: MoneyCents::new(amount),
            kind,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn signed_amount_follows_kind() {
        let income = Entry::new("alice".to_string(), draft(1000, EntryKind::Income)).unwrap();
        let expense = Entry::new("alice".to_string(), draft(1000, EntryKind::Expense)).unwrap();

        assert_eq!(income.signed_amount(), MoneyCents::new(1000));
        assert_eq!(expense.signed_amount(), MoneyCents::new(-1000));
    }

    #[test]
    fn negative_amount_rejected() {
        let err = Entry::new("alice".to_string(), draft(-1, EntryKind::Income)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidArgument("amount must be >= 0".to_string())
        );
    }

    #[test]
    fn kind_round_trips_through_str() {
        assert_eq!(EntryKind::try_from("income").unwrap(), EntryKind::Income);
        assert_eq!(EntryKind::try_from("expense").unwrap(), EntryKind::Expense);
        assert!(EntryKind::try_from("transfer").is_err());
    }
}
