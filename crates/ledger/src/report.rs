//! Read-only reporting over the entry store.
//!
//! Reports never mutate anything. The daily view returns the *stored*
//! account balance, trusting the engine's invariant instead of recomputing
//! the sum on every read.

use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::{Entry, EntryKind, Ledger, LedgerError, MoneyCents, ResultLedger, account, entry};

/// One calendar day of a ledger: the current balance plus the entries
/// recorded on that date.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyView {
    pub date: NaiveDate,
    pub balance: MoneyCents,
    pub entries: Vec<Entry>,
}

/// Income/expense totals and the entries for one month.
///
/// `net = total_income - total_expense`. Totals are folded over exactly
/// the entries returned, so they can never disagree with the listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub total_income: MoneyCents,
    pub total_expense: MoneyCents,
    pub net: MoneyCents,
    pub entries: Vec<Entry>,
}

impl Ledger {
    /// Returns the stored balance and the entries whose UTC calendar date
    /// equals `date`, ordered by occurrence.
    pub async fn daily_view(&self, owner_id: &str, date: NaiveDate) -> ResultLedger<DailyView> {
        let account = account::Entity::find_by_id(owner_id)
            .one(self.database())
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(owner_id.to_string()))?;

        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = date
            .succ_opt()
            .ok_or_else(|| LedgerError::InvalidArgument("date out of range".to_string()))?
            .and_time(NaiveTime::MIN)
            .and_utc();

        let entries = self.entries_in_range(owner_id, start, end).await?;

        Ok(DailyView {
            date,
            balance: MoneyCents::new(account.balance_cents),
            entries,
        })
    }

    /// Returns the month's entries with income/expense totals.
    pub async fn monthly_report(
        &self,
        owner_id: &str,
        year: i32,
        month: u32,
    ) -> ResultLedger<MonthlyReport> {
        // Existence check; the report itself never reads the balance.
        account::Entity::find_by_id(owner_id)
            .one(self.database())
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(owner_id.to_string()))?;

        let start = month_start(year, month)?;
        let end = if month == 12 {
            month_start(year + 1, 1)?
        } else {
            month_start(year, month + 1)?
        };

        let entries = self
            .entries_in_range(
                owner_id,
                start.and_time(NaiveTime::MIN).and_utc(),
                end.and_time(NaiveTime::MIN).and_utc(),
            )
            .await?;

        let mut total_income = MoneyCents::ZERO;
        let mut total_expense = MoneyCents::ZERO;
        for entry in &entries {
            match entry.kind {
                EntryKind::Income => total_income += entry.amount,
                EntryKind::Expense => total_expense += entry.amount,
            }
        }

        Ok(MonthlyReport {
            year,
            month,
            total_income,
            total_expense,
            net: total_income - total_expense,
            entries,
        })
    }

    async fn entries_in_range(
        &self,
        owner_id: &str,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    ) -> ResultLedger<Vec<Entry>> {
        let models = entry::Entity::find()
            .filter(entry::Column::OwnerId.eq(owner_id))
            .filter(entry::Column::OccurredAt.gte(start))
            .filter(entry::Column::OccurredAt.lt(end))
            .order_by_asc(entry::Column::OccurredAt)
            .all(self.database())
            .await?;

        models.into_iter().map(Entry::try_from).collect()
    }
}

fn month_start(year: i32, month: u32) -> ResultLedger<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| LedgerError::InvalidArgument(format!("invalid month: {year}-{month:02}")))
}
