//! The module contains the balance-holding account record.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

/// The balance holder for one owner.
///
/// `balance` is denormalized: it must always equal the sum of the signed
/// amounts of the owner's entries. Only the ledger mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub balance: MoneyCents,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: String) -> Self {
        Self {
            id,
            balance: MoneyCents::ZERO,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub balance_cents: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entry::Entity")]
    Entries,
}

impl Related<super::entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.clone()),
            balance_cents: ActiveValue::Set(account.balance.cents()),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            balance: MoneyCents::new(model.balance_cents),
            created_at: model.created_at,
        }
    }
}
