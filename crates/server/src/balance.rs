//! Balance API endpoints

use api_types::balance::{BalanceAdjust, BalanceAdjusted, BalanceView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::Owner, server::ServerState};

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<BalanceView>, ServerError> {
    let balance = state.ledger.balance(&owner).await?;
    Ok(Json(BalanceView {
        balance_cents: balance.cents(),
    }))
}

pub async fn adjust(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    Json(payload): Json<BalanceAdjust>,
) -> Result<Json<BalanceAdjusted>, ServerError> {
    let entry = state
        .ledger
        .adjust_balance(&owner, ledger::MoneyCents::new(payload.balance_cents))
        .await?;

    Ok(Json(BalanceAdjusted {
        balance_cents: payload.balance_cents,
        entry_id: entry.id,
    }))
}
