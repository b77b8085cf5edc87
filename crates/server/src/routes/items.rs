//! Item route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use ostaa_core::{Item, NewItem};
use serde::{Deserialize, Deserializer, Serialize, de};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::FormOrJson;
use crate::state::AppState;

/// Body of `POST /add/item`.
#[derive(Debug, Deserialize)]
pub struct AddItemForm {
    /// Owner whose listings receive the item.
    pub username: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(deserialize_with = "number_or_numeric_text")]
    pub price: f64,
    #[serde(default)]
    pub stat: String,
}

/// Accept `100`, `100.5` or `"100"`: url-encoded bodies and some JSON
/// clients send prices as text.
fn number_or_numeric_text<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Price::deserialize(deserializer)? {
        Price::Number(n) => Ok(n),
        Price::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("price must be a number, got {text:?}"))),
    }
}

impl AddItemForm {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("username", &self.username),
            ("title", &self.title),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::BadRequest(format!("{field} is required")));
            }
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::BadRequest(
                "price must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    fn into_parts(self) -> (String, NewItem) {
        (
            self.username,
            NewItem {
                title: self.title,
                description: self.description,
                image: self.image,
                price: self.price,
                stat: self.stat,
            },
        )
    }
}

/// Confirmation body for writes.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

/// List every item.
///
/// GET /get/items/
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Item>>> {
    Ok(Json(state.market().list_items().await?))
}

/// Create an item and add it to a user's listings.
///
/// POST /add/item
///
/// Unknown users get a 404 and no item is created.
#[instrument(skip(state), fields(username = %form.username))]
pub async fn create(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<AddItemForm>,
) -> Result<Json<MessageBody>> {
    form.validate()?;
    let (username, item) = form.into_parts();
    state.market().add_item_to_user(&username, item).await?;
    Ok(Json(MessageBody {
        message: "Item added successfully",
    }))
}

/// Search items by description.
///
/// GET /search/items/{keyword}
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> Result<Json<Vec<Item>>> {
    Ok(Json(state.market().search_items(&keyword).await?))
}

/// A user's listed items, expanded.
///
/// GET /get/listings/{username}
#[instrument(skip(state))]
pub async fn listings(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Item>>> {
    Ok(Json(state.market().get_listings(&username).await?))
}

/// A user's purchased items, expanded.
///
/// GET /get/purchases/{username}
#[instrument(skip(state))]
pub async fn purchases(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Item>>> {
    Ok(Json(state.market().get_purchases(&username).await?))
}
