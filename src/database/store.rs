use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use super::models::{parse_recipe, Drink, DrinkChanges, NewDrink};

/// Errors raised by drink stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate drink title: {0}")]
    DuplicateTitle(String),

    #[error("stored recipe for drink {id} is unreadable: {source}")]
    CorruptRecipe {
        id: i32,
        #[source]
        source: serde_json::Error,
    },

    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Sqlx(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam for drink records.
///
/// Handlers only see this trait; the PostgreSQL store backs production and
/// the in-memory store backs `--in-memory` runs and the test-suite.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks ordered by id
    async fn list(&self) -> StoreResult<Vec<Drink>>;

    async fn find(&self, id: i32) -> StoreResult<Option<Drink>>;

    async fn insert(&self, drink: NewDrink) -> StoreResult<Drink>;

    /// Apply the supplied fields; `Ok(None)` when the id does not exist
    async fn update(&self, id: i32, changes: DrinkChanges) -> StoreResult<Option<Drink>>;

    /// Remove a drink; `Ok(false)` when the id does not exist
    async fn delete(&self, id: i32) -> StoreResult<bool>;

    /// Create the backing table if it is missing
    async fn ensure_schema(&self) -> StoreResult<()>;

    /// Drop everything, recreate the schema and insert the seed drink
    async fn reset(&self) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
}

/// The drink inserted after a reset
pub fn seed_drink() -> NewDrink {
    let recipe = json!([{"name": "water", "color": "blue", "parts": 1}]);
    NewDrink {
        title: "water".to_string(),
        recipe: parse_recipe(&recipe).unwrap_or_default(),
    }
}
