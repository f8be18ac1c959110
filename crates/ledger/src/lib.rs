//! Balance-consistent ledger engine.
//!
//! Every mutating operation runs as one database transaction: the entry
//! write and the account balance write commit together or not at all. The
//! balance update is guarded by an optimistic compare against the value
//! read at the start of the operation, so a concurrent writer on the same
//! account surfaces as [`LedgerError::Conflict`] instead of a lost update.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

pub use account::Account;
pub use entry::{Entry, EntryDraft, EntryKind};
pub use error::LedgerError;
pub use money::MoneyCents;
pub use report::{DailyView, MonthlyReport};

mod account;
mod entry;
mod error;
mod money;
mod report;

type ResultLedger<T> = Result<T, LedgerError>;

/// The ledger engine.
///
/// Holds no state besides the database handle; the account row is the
/// single source of truth for balances.
#[derive(Clone, Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Title given to the synthetic entry recorded by [`adjust_balance`].
    ///
    /// [`adjust_balance`]: Ledger::adjust_balance
    pub const ADJUSTMENT_TITLE: &'static str = "Balance adjustment";

    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    pub(crate) fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Opens an account for `owner_id` with a zero balance.
    ///
    /// Identity registration itself lives outside this crate; callers
    /// invoke this once a new identity has been verified.
    pub async fn open_account(&self, owner_id: &str) -> ResultLedger<Account> {
        let db_tx = self.database.begin().await?;

        if account::Entity::find_by_id(owner_id).one(&db_tx).await?.is_some() {
            return Err(LedgerError::AlreadyExists(owner_id.to_string()));
        }

        let account = Account::new(owner_id.to_string());
        account::ActiveModel::from(&account).insert(&db_tx).await?;
        db_tx.commit().await?;

        Ok(account)
    }

    /// Records a new entry and moves the owner's balance by its signed
    /// amount.
    pub async fn create_entry(&self, owner_id: &str, draft: EntryDraft) -> ResultLedger<Entry> {
        let entry = Entry::new(owner_id.to_string(), draft)?;
        let delta = entry.signed_amount();

        let db_tx = self.database.begin().await?;
        let account = account_of(&db_tx, owner_id).await?;
        let new_balance = account
            .balance
            .checked_add(delta)
            .ok_or_else(balance_overflow)?;

        entry::ActiveModel::from(&entry).insert(&db_tx).await?;
        write_balance(&db_tx, owner_id, account.balance, new_balance).await?;
        db_tx.commit().await?;

        Ok(entry)
    }

    /// Rewrites an existing entry and moves the balance by the difference
    /// between the old and the new signed amount.
    ///
    /// The reverse delta is always computed from the entry row as persisted
    /// immediately before this operation, read inside the same transaction
    /// that mutates it. A concurrently deleted entry fails with
    /// [`LedgerError::NotFound`]; it is never resurrected.
    pub async fn update_entry(
        &self,
        owner_id: &str,
        entry_id: Uuid,
        draft: EntryDraft,
    ) -> ResultLedger<Entry> {
        if draft.amount.is_negative() {
            return Err(LedgerError::InvalidArgument(
                "amount must be >= 0".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;
        let original = owned_entry(&db_tx, owner_id, entry_id).await?;
        let account = account_of(&db_tx, owner_id).await?;

        let updated = Entry {
            id: original.id,
            owner_id: original.owner_id.clone(),
            title: draft.title,
            description: draft.description,
            amount: draft.amount,
            kind: draft.kind,
            occurred_at: draft.occurred_at,
        };

        // Undo the original effect, then apply the new one. When amount and
        // kind are unchanged the two deltas cancel and the balance write is
        // a no-op compare against itself.
        let new_balance = account
            .balance
            .checked_sub(original.signed_amount())
            .and_then(|b| b.checked_add(updated.signed_amount()))
            .ok_or_else(balance_overflow)?;

        entry::ActiveModel::from(&updated).update(&db_tx).await?;
        write_balance(&db_tx, owner_id, account.balance, new_balance).await?;
        db_tx.commit().await?;

        Ok(updated)
    }

    /// Removes an entry and reverses its effect on the owner's balance.
    pub async fn delete_entry(&self, owner_id: &str, entry_id: Uuid) -> ResultLedger<()> {
        let db_tx = self.database.begin().await?;
        let entry = owned_entry(&db_tx, owner_id, entry_id).await?;
        let account = account_of(&db_tx, owner_id).await?;

        let new_balance = account
            .balance
            .checked_sub(entry.signed_amount())
            .ok_or_else(balance_overflow)?;

        write_balance(&db_tx, owner_id, account.balance, new_balance).await?;
        entry::Entity::delete_by_id(entry_id.to_string())
            .exec(&db_tx)
            .await?;
        db_tx.commit().await?;

        Ok(())
    }

    /// Sets the owner's balance to `new_balance` directly, recording one
    /// synthetic entry for the difference so the ledger and the balance
    /// never diverge.
    pub async fn adjust_balance(
        &self,
        owner_id: &str,
        new_balance: MoneyCents,
    ) -> ResultLedger<Entry> {
        let db_tx = self.database.begin().await?;
        let account = account_of(&db_tx, owner_id).await?;

        let diff = new_balance
            .checked_sub(account.balance)
            .ok_or_else(balance_overflow)?;
        let kind = if diff.is_negative() {
            EntryKind::Expense
        } else {
            EntryKind::Income
        };

        let entry = Entry::new(
            owner_id.to_string(),
            EntryDraft {
                title: Self::ADJUSTMENT_TITLE.to_string(),
                description: String::new(),
                amount: diff.abs(),
                kind,
                occurred_at: Utc::now(),
            },
        )?;

        entry::ActiveModel::from(&entry).insert(&db_tx).await?;
        write_balance(&db_tx, owner_id, account.balance, new_balance).await?;
        db_tx.commit().await?;

        Ok(entry)
    }

    /// Returns a single entry owned by `owner_id`.
    pub async fn entry(&self, owner_id: &str, entry_id: Uuid) -> ResultLedger<Entry> {
        owned_entry(&self.database, owner_id, entry_id).await
    }

    /// Returns the stored balance for `owner_id`.
    pub async fn balance(&self, owner_id: &str) -> ResultLedger<MoneyCents> {
        let account = account_of(&self.database, owner_id).await?;
        Ok(account.balance)
    }

    /// Recomputes the sum of the owner's signed entries and checks it
    /// against the stored balance.
    ///
    /// Returns the balance when both agree, [`LedgerError::Inconsistent`]
    /// when they have diverged. Divergence means a write slipped past the
    /// transactional boundary (or the row was edited out of band) and must
    /// be surfaced, never repaired silently here.
    pub async fn audit_balance(&self, owner_id: &str) -> ResultLedger<MoneyCents> {
        let account = account_of(&self.database, owner_id).await?;

        let models = entry::Entity::find()
            .filter(entry::Column::OwnerId.eq(owner_id))
            .all(&self.database)
            .await?;

        let mut total = MoneyCents::ZERO;
        for model in models {
            let entry = Entry::try_from(model)?;
            total = total
                .checked_add(entry.signed_amount())
                .ok_or_else(balance_overflow)?;
        }

        if total != account.balance {
            return Err(LedgerError::Inconsistent(format!(
                "account {owner_id}: stored balance is {} but entries total {}",
                account.balance, total
            )));
        }

        Ok(account.balance)
    }
}

fn balance_overflow() -> LedgerError {
    LedgerError::InvalidArgument("balance overflow".to_string())
}

async fn account_of<C: ConnectionTrait>(conn: &C, owner_id: &str) -> ResultLedger<Account> {
    account::Entity::find_by_id(owner_id)
        .one(conn)
        .await?
        .map(Account::from)
        .ok_or_else(|| LedgerError::AccountNotFound(owner_id.to_string()))
}

async fn owned_entry<C: ConnectionTrait>(
    conn: &C,
    owner_id: &str,
    entry_id: Uuid,
) -> ResultLedger<Entry> {
    let model = entry::Entity::find_by_id(entry_id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound("entry not exists".to_string()))?;
    if model.owner_id != owner_id {
        return Err(LedgerError::NotFound("entry not exists".to_string()));
    }
    Entry::try_from(model)
}

/// Moves the stored balance from `observed` to `new_balance`.
///
/// The compare against `observed` makes the read-modify-write of the
/// balance optimistic: zero affected rows means another writer got there
/// first and the whole operation fails with `Conflict`; more than one row
/// means duplicate account rows, which is reported as `Inconsistent`.
async fn write_balance<C: ConnectionTrait>(
    conn: &C,
    owner_id: &str,
    observed: MoneyCents,
    new_balance: MoneyCents,
) -> ResultLedger<()> {
    let result = account::Entity::update_many()
        .col_expr(
            account::Column::BalanceCents,
            Expr::value(new_balance.cents()),
        )
        .filter(account::Column::Id.eq(owner_id))
        .filter(account::Column::BalanceCents.eq(observed.cents()))
        .exec(conn)
        .await?;

    match result.rows_affected {
        1 => Ok(()),
        0 => Err(LedgerError::Conflict(format!(
            "balance of account {owner_id} changed concurrently"
        ))),
        n => Err(LedgerError::Inconsistent(format!(
            "balance update matched {n} rows for account {owner_id}"
        ))),
    }
}

/// The builder for `Ledger`.
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database.
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`.
    pub fn build(self) -> Ledger {
        Ledger {
            database: self.database,
        }
    }
}
