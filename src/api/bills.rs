use crate::api::AppState;
use crate::domain::{Bill, BillParticipant, Currency, Decimal, EventId, ShareType, UserId};
use crate::engine::BillDraft;
use crate::error::AppError;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    pub title: String,
    pub value: Decimal,
    /// Input currency; converted server-side when it differs from the
    /// settlement currency.
    pub currency: String,
    pub creator_id: String,
    #[serde(default)]
    pub participants: Vec<SelectedParticipant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedParticipant {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub has_paid: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillParticipantDto {
    pub user_id: String,
    pub display_name: String,
    pub has_paid: bool,
    pub share: Decimal,
    pub share_type: ShareType,
    pub creator: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDto {
    pub id: String,
    pub title: String,
    pub value: Decimal,
    pub creator_id: String,
    pub event_id: String,
    pub participants: Vec<BillParticipantDto>,
    pub created_at: DateTime<Utc>,
}

impl From<Bill> for BillDto {
    fn from(bill: Bill) -> Self {
        BillDto {
            id: bill.id.as_str().to_string(),
            title: bill.title,
            value: bill.value,
            creator_id: bill.creator_id.as_str().to_string(),
            event_id: bill.event_id.as_str().to_string(),
            participants: bill.participants.into_iter().map(Into::into).collect(),
            created_at: bill.created_at,
        }
    }
}

impl From<BillParticipant> for BillParticipantDto {
    fn from(p: BillParticipant) -> Self {
        BillParticipantDto {
            user_id: p.user_id.as_str().to_string(),
            display_name: p.display_name,
            has_paid: p.has_paid,
            share: p.share,
            share_type: p.share_type,
            creator: p.creator,
        }
    }
}

pub async fn create_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateBillRequest>,
) -> Result<Json<BillDto>, AppError> {
    let mut draft = BillDraft::new(Currency::new(req.currency)).with_title(req.title);
    for p in req.participants {
        draft = draft.add_participant(UserId::new(p.user_id.clone()), p.display_name);
        if p.has_paid {
            draft = draft.toggle_paid(&UserId::new(p.user_id));
        }
    }
    let draft = draft.set_value(req.value);

    let bill = state
        .ledger
        .add_bill(&EventId::new(id), draft, UserId::new(req.creator_id))
        .await?;

    Ok(Json(bill.into()))
}

pub async fn get_bills(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BillDto>>, AppError> {
    let bills = state.ledger.bills(&EventId::new(id)).await?;
    Ok(Json(bills.into_iter().map(Into::into).collect()))
}
