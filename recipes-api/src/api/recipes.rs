//! Recipe CRUD handlers
//!
//! Every mutation takes the same path: validate, run the store call
//! through the shared retry wrapper, then enqueue a notification job.
//! Enqueue failures are logged and swallowed; notifications never affect
//! the HTTP response.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use recipes_common::db::{self, Operation};
use recipes_common::model::{
    Category, FieldError, NewRecipe, Recipe, RecipeFilters, RecipeUpdate,
};
use recipes_common::{retry, Error};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;

use crate::AppState;

/// Query parameters for recipe listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Fetch a single recipe by id (compat with the original client)
    pub id: Option<String>,
    pub query: Option<String>,
    pub category: Option<String>,
    /// Comma-separated tag list, any-match
    pub tags: Option<String>,
    pub max_prep_time: Option<i64>,
    pub max_cook_time: Option<i64>,
}

/// Listing response shape
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub recipes: Vec<Recipe>,
    pub total_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// GET /api/recipes
///
/// Lists recipes, newest first, narrowed by the optional filters.
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    // Single-recipe lookup via ?id= keeps the original client working
    if let Some(id) = &params.id {
        let recipe = db::fetch_recipe(&state.db, id).await?;
        return Ok(Json(ListResponse {
            recipes: vec![recipe],
            total_count: 1,
        }));
    }

    let category = match &params.category {
        Some(raw) => Some(Category::from_str(raw).map_err(ApiError::BadRequest)?),
        None => None,
    };

    let tags = params
        .tags
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let filters = RecipeFilters {
        query: params.query.filter(|q| !q.trim().is_empty()),
        category,
        tags,
        max_prep_time: params.max_prep_time,
        max_cook_time: params.max_cook_time,
    };

    let recipes = db::search_recipes(&state.db, &filters).await?;
    let total_count = recipes.len();

    Ok(Json(ListResponse {
        recipes,
        total_count,
    }))
}

/// POST /api/recipes
///
/// Creates a recipe; ingredients and instructions are renumbered 1..N
/// in submission order. Returns 201 with the stored recipe.
pub async fn create_recipe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<NewRecipe>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let errors = input.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let recipe = input.into_recipe(Utc::now());

    retry::with_retries("create recipe", || db::insert_recipe(&state.db, &recipe)).await?;
    tracing::info!(recipe_id = %recipe.id, title = %recipe.title, "Recipe created");

    let actor = actor_from(&headers, &recipe.created_by);
    notify(&state, Operation::Created, &recipe, &actor).await;

    Ok((StatusCode::CREATED, Json(recipe)))
}

/// GET /api/recipes/:id
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = db::fetch_recipe(&state.db, &id).await?;
    Ok(Json(recipe))
}

/// PUT /api/recipes/:id
///
/// Partial update: omitted fields are preserved; supplied ingredient
/// and instruction arrays fully replace and are renumbered.
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<RecipeUpdate>,
) -> Result<Json<Recipe>, ApiError> {
    apply_update(&state, &id, update, &headers).await
}

/// PUT /api/recipes (id in the body; compat with the original client)
pub async fn update_recipe_compat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<RecipeUpdate>,
) -> Result<Json<Recipe>, ApiError> {
    let Some(id) = update.id.clone() else {
        return Err(ApiError::BadRequest("Recipe ID is required".to_string()));
    };
    apply_update(&state, &id, update, &headers).await
}

async fn apply_update(
    state: &AppState,
    id: &str,
    update: RecipeUpdate,
    headers: &HeaderMap,
) -> Result<Json<Recipe>, ApiError> {
    let errors = update.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let mut recipe = db::fetch_recipe(&state.db, id).await?;

    let fallback = update
        .last_modified_by
        .clone()
        .unwrap_or_else(|| recipe.last_modified_by.clone());
    let actor = actor_from(headers, &fallback);

    update.apply(&mut recipe, &actor, Utc::now());

    retry::with_retries("update recipe", || db::update_recipe(&state.db, &recipe)).await?;
    tracing::info!(recipe_id = %recipe.id, "Recipe updated");

    notify(state, Operation::Updated, &recipe, &actor).await;

    Ok(Json(recipe))
}

/// DELETE /api/recipes/:id
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, ApiError> {
    remove_recipe(&state, &id, &headers).await
}

/// DELETE /api/recipes?id= (compat with the original client)
pub async fn delete_recipe_compat(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Some(id) = params.id else {
        return Err(ApiError::BadRequest("Recipe ID is required".to_string()));
    };
    remove_recipe(&state, &id, &headers).await
}

async fn remove_recipe(
    state: &AppState,
    id: &str,
    headers: &HeaderMap,
) -> Result<Json<DeleteResponse>, ApiError> {
    // Snapshot before deletion so the notification can describe the recipe
    let recipe = db::fetch_recipe(&state.db, id).await?;

    retry::with_retries("delete recipe", || db::delete_recipe(&state.db, id)).await?;
    tracing::info!(recipe_id = %id, title = %recipe.title, "Recipe deleted");

    let actor = actor_from(headers, "unknown");
    notify(state, Operation::Deleted, &recipe, &actor).await;

    Ok(Json(DeleteResponse {
        message: "Recipe deleted successfully".to_string(),
    }))
}

/// Actor attribution: x-user-email header when present, else the
/// payload-provided fallback.
fn actor_from(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get("x-user-email")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Fire-and-forget notification enqueue
async fn notify(state: &AppState, operation: Operation, recipe: &Recipe, actor: &str) {
    if let Err(e) = db::enqueue_notification(&state.db, operation, recipe, actor).await {
        tracing::warn!(
            recipe_id = %recipe.id,
            operation = operation.as_str(),
            error = %e,
            "Failed to enqueue notification"
        );
    }
}

/// Recipe API errors
#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<FieldError>),
    BadRequest(String),
    NotFound,
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(_) => ApiError::NotFound,
            Error::InvalidInput(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid input data",
                    "details": details,
                })),
            )
                .into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Recipe not found" })),
            )
                .into_response(),
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
