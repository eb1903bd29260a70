use crate::api::AppState;
use crate::domain::{Decimal, EventId};
use crate::error::AppError;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    /// Net amount per roster member: positive = owes, negative = is owed.
    pub balances: BTreeMap<String, Decimal>,
}

pub async fn get_balances(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BalancesResponse>, AppError> {
    let balances = state.ledger.balances(&EventId::new(id)).await?;

    Ok(Json(BalancesResponse {
        balances: balances
            .into_iter()
            .map(|(k, v)| (k.as_str().to_string(), v))
            .collect(),
    }))
}
