//! Reporting API endpoints

use api_types::report::{MonthlyQuery, MonthlyReportResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{
    ServerError,
    entries::entry_view,
    server::{Owner, ServerState},
};

pub async fn monthly(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<MonthlyReportResponse>, ServerError> {
    let report = state
        .ledger
        .monthly_report(&owner, query.year, query.month)
        .await?;

    let entries = report
        .entries
        .into_iter()
        .map(entry_view)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(MonthlyReportResponse {
        year: report.year,
        month: report.month,
        total_income_cents: report.total_income.cents(),
        total_expense_cents: report.total_expense.cents(),
        net_cents: report.net.cents(),
        entries,
    }))
}
