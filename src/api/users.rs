use crate::api::AppState;
use crate::domain::{UserId, UserProfile};
use crate::error::AppError;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub event_ids: Vec<String>,
}

impl From<UserProfile> for UserDto {
    fn from(profile: UserProfile) -> Self {
        UserDto {
            user_id: profile.user_id.as_str().to_string(),
            display_name: profile.display_name,
            email: profile.email,
            event_ids: profile
                .event_ids
                .into_iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        }
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserDto>, AppError> {
    if req.user_id.trim().is_empty() || req.display_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "userId and displayName must not be empty".into(),
        ));
    }

    let profile = state
        .ledger
        .create_user(UserProfile::new(
            UserId::new(req.user_id),
            req.display_name,
            req.email,
        ))
        .await?;

    Ok(Json(profile.into()))
}
