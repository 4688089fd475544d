use crate::{error::AppError, AppState};
use axum::{
    extract::{FromRequest, Path, Request, State},
    http::{header, StatusCode},
    Form, Json,
};
use database::{Item, ItemChanges};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ITEM_NOT_FOUND: &str = "Item not found";

/// The body accepted by create and update.
#[derive(Debug, Deserialize)]
pub struct ItemPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Extracts an [`ItemPayload`] from either a JSON or a form-encoded body,
/// chosen by `Content-Type`. Anything else is parsed as JSON.
#[derive(Debug)]
pub struct ItemBody(pub ItemPayload);

impl<S> FromRequest<S> for ItemBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(payload) = Form::<ItemPayload>::from_request(req, state).await?;
            Ok(Self(payload))
        } else {
            let Json(payload) = Json::<ItemPayload>::from_request(req, state).await?;
            Ok(Self(payload))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteConfirmation {
    pub message: String,
    pub id: i32,
}

fn not_found() -> AppError {
    AppError::NotFound(ITEM_NOT_FOUND.to_string())
}

/// Ids that are not integers, in full, are treated as matching no row.
fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.trim().parse::<i32>().map_err(|_| not_found())
}

fn validate(payload: ItemPayload) -> Result<ItemChanges, AppError> {
    ItemChanges::normalize(payload.name.as_deref(), payload.description)
        .ok_or_else(|| AppError::Validation("Name is required".to_string()))
}

/// # GET /api/items
pub async fn list_items(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Item>>, AppError> {
    let items = state.store.list_all().await?;
    Ok(Json(items))
}

/// # GET /api/items/{id}
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, AppError> {
    let id = parse_id(&id)?;
    let item = state.store.get_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Json(item))
}

/// # POST /api/items
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    ItemBody(payload): ItemBody,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let changes = validate(payload)?;
    let item = state.store.insert(&changes).await?;
    tracing::info!(id = item.id, "Item created.");
    Ok((StatusCode::CREATED, Json(item)))
}

/// # PUT /api/items/{id}
/// Checks that the item exists before rewriting it, so a missing id is a 404
/// rather than a silent no-op.
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ItemBody(payload): ItemBody,
) -> Result<Json<Item>, AppError> {
    let changes = validate(payload)?;
    let id = parse_id(&id)?;

    if state.store.get_by_id(id).await?.is_none() {
        return Err(not_found());
    }
    // The row can still disappear between the check and the write.
    let item = state.store.update(id, &changes).await?.ok_or_else(not_found)?;
    Ok(Json(item))
}

/// # DELETE /api/items/{id}
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, AppError> {
    let id = parse_id(&id)?;

    if state.store.get_by_id(id).await?.is_none() {
        return Err(not_found());
    }
    state.store.delete(id).await?;
    tracing::info!(id, "Item deleted.");

    Ok(Json(DeleteConfirmation {
        message: "Item deleted successfully".to_string(),
        id,
    }))
}
