use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::database::models::ShortDrink;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ShortDrinks<'a> {
    pub drinks: Vec<ShortDrink<'a>>,
}

/// GET /drinks - Public menu; recipes show ingredient names and colors only
///
/// ```json
/// {
///   "success": true,
///   "drinks": [{ "id": 1, "title": "water", "recipe": [{ "name": "water", "color": "blue" }] }]
/// }
/// ```
pub async fn list(State(state): State<AppState>) -> Result<Response, ApiError> {
    let drinks = state.store.list().await?;

    let payload = ShortDrinks {
        drinks: drinks.iter().map(|d| d.short()).collect(),
    };
    Ok(ApiResponse::success(payload).into_response())
}
