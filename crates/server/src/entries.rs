//! Entry API endpoints

use api_types::entry::{DailyQuery, DailyViewResponse, EntryCreated, EntryNew, EntryUpdate, EntryView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, server::Owner, server::ServerState};

fn map_kind(kind: ledger::EntryKind) -> api_types::EntryKind {
    match kind {
        ledger::EntryKind::Income => api_types::EntryKind::Income,
        ledger::EntryKind::Expense => api_types::EntryKind::Expense,
    }
}

fn unmap_kind(kind: api_types::EntryKind) -> ledger::EntryKind {
    match kind {
        api_types::EntryKind::Income => ledger::EntryKind::Income,
        api_types::EntryKind::Expense => ledger::EntryKind::Expense,
    }
}

pub(crate) fn entry_view(entry: ledger::Entry) -> Result<EntryView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;
    Ok(EntryView {
        id: entry.id,
        title: entry.title,
        description: entry.description,
        amount_cents: entry.amount.cents(),
        kind: map_kind(entry.kind),
        occurred_at: entry.occurred_at.with_timezone(&utc),
    })
}

fn draft_from_new(payload: EntryNew) -> ledger::EntryDraft {
    ledger::EntryDraft {
        title: payload.title,
        description: payload.description,
        amount: ledger::MoneyCents::new(payload.amount_cents),
        kind: unmap_kind(payload.kind),
        occurred_at: payload.occurred_at.with_timezone(&Utc),
    }
}

fn draft_from_update(payload: EntryUpdate) -> ledger::EntryDraft {
    ledger::EntryDraft {
        title: payload.title,
        description: payload.description,
        amount: ledger::MoneyCents::new(payload.amount_cents),
        kind: unmap_kind(payload.kind),
        occurred_at: payload.occurred_at.with_timezone(&Utc),
    }
}

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryCreated>), ServerError> {
    let entry = state
        .ledger
        .create_entry(&owner, draft_from_new(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(EntryCreated { id: entry.id })))
}

pub async fn daily(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailyViewResponse>, ServerError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let view = state.ledger.daily_view(&owner, date).await?;

    let entries = view
        .entries
        .into_iter()
        .map(entry_view)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DailyViewResponse {
        date: view.date,
        balance_cents: view.balance.cents(),
        entries,
    }))
}

pub async fn update(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EntryUpdate>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state
        .ledger
        .update_entry(&owner, id, draft_from_update(payload))
        .await?;

    Ok(Json(entry_view(entry)?))
}

pub async fn remove(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.ledger.delete_entry(&owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
