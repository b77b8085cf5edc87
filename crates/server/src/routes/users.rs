//! User route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ostaa_core::User;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::FormOrJson;
use crate::state::AppState;

/// Body of `POST /add/user`.
#[derive(Deserialize)]
pub struct AddUserForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AddUserForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddUserForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl AddUserForm {
    fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(AppError::BadRequest("username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::BadRequest("password is required".to_string()));
        }
        Ok(())
    }
}

/// List every user.
///
/// GET /get/users/
///
/// Passwords are included as stored.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.market().list_users().await?))
}

/// Create a user.
///
/// POST /add/user
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<AddUserForm>,
) -> Result<(StatusCode, &'static str)> {
    form.validate()?;
    state
        .market()
        .create_user(&form.username, &form.password)
        .await?;
    Ok((StatusCode::OK, "User added successfully"))
}

/// Search users by username.
///
/// GET /search/users/{keyword}
///
/// No match is an empty array, not a 404.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.market().search_users(&keyword).await?))
}
