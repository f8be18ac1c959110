use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of an entry's effect on the balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

pub mod entry {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        pub title: String,
        #[serde(default)]
        pub description: String,
        /// Non-negative magnitude in integer cents; the sign lives in `kind`.
        pub amount_cents: i64,
        pub kind: EntryKind,
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryUpdate {
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub amount_cents: i64,
        pub kind: EntryKind,
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: Uuid,
        pub title: String,
        pub description: String,
        pub amount_cents: i64,
        pub kind: EntryKind,
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyQuery {
        /// Calendar date (UTC); defaults to today.
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyViewResponse {
        pub date: NaiveDate,
        pub balance_cents: i64,
        pub entries: Vec<EntryView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub balance_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceAdjust {
        /// The balance the account should end up with, in integer cents.
        pub balance_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceAdjusted {
        pub balance_cents: i64,
        /// The synthetic entry recorded for the adjustment.
        pub entry_id: Uuid,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyQuery {
        pub year: i32,
        pub month: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyReportResponse {
        pub year: i32,
        pub month: u32,
        pub total_income_cents: i64,
        pub total_expense_cents: i64,
        pub net_cents: i64,
        pub entries: Vec<entry::EntryView>,
    }
}
