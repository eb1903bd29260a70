use crate::api::AppState;
use crate::domain::{Decimal, Event, EventId, EventParticipant, UserId};
use crate::error::AppError;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub creator_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Comma-separated event ids.
    pub ids: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinEventRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableUsersQuery {
    pub current_user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParticipantDto {
    pub user_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub creator_id: String,
    pub participants: Vec<EventParticipantDto>,
    pub total_expenses: Decimal,
    pub balances: BTreeMap<String, Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        EventDto {
            id: event.id.as_str().to_string(),
            title: event.title,
            description: event.description,
            creator_id: event.creator_id.as_str().to_string(),
            participants: event.participants.into_iter().map(Into::into).collect(),
            total_expenses: event.total_expenses,
            balances: event
                .balances
                .into_iter()
                .map(|(k, v)| (k.as_str().to_string(), v))
                .collect(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

impl From<EventParticipant> for EventParticipantDto {
    fn from(p: EventParticipant) -> Self {
        EventParticipantDto {
            user_id: p.user_id.as_str().to_string(),
            display_name: p.display_name,
            joined_at: p.joined_at,
            balance: p.balance,
        }
    }
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<EventDto>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }

    let event = state
        .ledger
        .create_event(req.title, req.description, UserId::new(req.creator_id))
        .await?;

    Ok(Json(event.into()))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventDto>, AppError> {
    let event = state.ledger.event(&EventId::new(id)).await?;
    Ok(Json(event.into()))
}

pub async fn get_events_by_ids(
    State(state): State<AppState>,
    Query(params): Query<EventsQuery>,
) -> Result<Json<Vec<EventDto>>, AppError> {
    let ids: Vec<EventId> = params
        .ids
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(EventId::new)
        .collect();

    let events = state.ledger.events_by_ids(&ids).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

pub async fn join_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<JoinEventRequest>,
) -> Result<Json<EventDto>, AppError> {
    let event = state
        .ledger
        .join_event(&EventId::new(id), UserId::new(req.user_id))
        .await?;
    Ok(Json(event.into()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableUserDto {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
}

pub async fn get_available_users(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<AvailableUsersQuery>,
) -> Result<Json<Vec<AvailableUserDto>>, AppError> {
    let users = state
        .ledger
        .available_users(&EventId::new(id), &UserId::new(params.current_user))
        .await?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| AvailableUserDto {
                user_id: u.user_id.as_str().to_string(),
                display_name: u.display_name,
                email: u.email,
            })
            .collect(),
    ))
}
