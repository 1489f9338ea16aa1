use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::database::models::{parse_recipe, parse_title, DrinkChanges, LongDrink, NewDrink};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::utils::{parse_drink_id, parse_json_object, present};

#[derive(Debug, Serialize)]
pub struct LongDrinks<'a> {
    pub drinks: Vec<LongDrink<'a>>,
}

#[derive(Debug, Serialize)]
pub struct DeletedDrink {
    pub delete: i32,
}

/// GET /drinks-detail - List every drink with its full recipe
///
/// Requires `get:drinks-detail`.
///
/// ```json
/// {
///   "success": true,
///   "drinks": [{
///     "id": 1,
///     "title": "water",
///     "recipe": [{ "name": "water", "color": "blue", "parts": 1 }]
///   }]
/// }
/// ```
pub async fn detail(State(state): State<AppState>) -> Result<Response, ApiError> {
    let drinks = state.store.list().await?;

    let payload = LongDrinks {
        drinks: drinks.iter().map(|d| d.long()).collect(),
    };
    Ok(ApiResponse::success(payload).into_response())
}

/// POST /drinks - Create a drink
///
/// Requires `post:drinks`. Body: `{ "title": "...", "recipe": [ingredient, ...] }`
/// where a single ingredient object is also accepted. Responds 201 with the
/// created drink in long form.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = parse_json_object(&body)?;

    let title = present(&body, "title")
        .ok_or_else(|| ApiError::unprocessable("title is required"))
        .and_then(|v| parse_title(v).map_err(|e| ApiError::unprocessable(e.to_string())))?;
    let recipe = present(&body, "recipe")
        .ok_or_else(|| ApiError::unprocessable("recipe is required"))
        .and_then(|v| parse_recipe(v).map_err(|e| ApiError::unprocessable(e.to_string())))?;

    let drink = state.store.insert(NewDrink { title, recipe }).await?;
    tracing::info!("Drink {} '{}' created by {}", drink.id, drink.title, user.who());

    let payload = LongDrinks {
        drinks: vec![drink.long()],
    };
    Ok(ApiResponse::created(payload).into_response())
}

/// PATCH /drinks/:id - Update the title and/or recipe of a drink
///
/// Requires `patch:drinks`. Unknown ids are 404 before the body is looked at;
/// a body with neither `title` nor `recipe` is 400.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_drink_id(&id)?;
    if state.store.find(id).await?.is_none() {
        return Err(ApiError::resource_not_found());
    }

    let body = parse_json_object(&body)?;
    let changes = DrinkChanges {
        title: present(&body, "title")
            .map(parse_title)
            .transpose()
            .map_err(|e| ApiError::unprocessable(e.to_string()))?,
        recipe: present(&body, "recipe")
            .map(parse_recipe)
            .transpose()
            .map_err(|e| ApiError::unprocessable(e.to_string()))?,
    };
    if changes.is_empty() {
        return Err(ApiError::bad_request("Request must include a title or a recipe"));
    }

    // The row can vanish between the lookup and the update
    let drink = state
        .store
        .update(id, changes)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;
    tracing::info!("Drink {} updated by {}", drink.id, user.who());

    let payload = LongDrinks {
        drinks: vec![drink.long()],
    };
    Ok(ApiResponse::success(payload).into_response())
}

/// DELETE /drinks/:id - Remove a drink
///
/// Requires `delete:drinks`.
///
/// ```json
/// { "success": true, "delete": 3 }
/// ```
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<DeletedDrink> {
    let id = parse_drink_id(&id)?;

    if !state.store.delete(id).await? {
        return Err(ApiError::resource_not_found());
    }
    tracing::info!("Drink {} deleted by {}", id, user.who());

    Ok(ApiResponse::success(DeletedDrink { delete: id }))
}
