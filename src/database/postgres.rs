use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{recipe_to_text, Drink, DrinkChanges, DrinkRow, NewDrink};
use super::store::{seed_drink, DrinkStore, StoreError, StoreResult};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drink (
        id SERIAL PRIMARY KEY,
        title VARCHAR(80) NOT NULL UNIQUE,
        recipe TEXT NOT NULL
    )
"#;

/// PostgreSQL error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Drink store backed by the `drink` table
#[derive(Debug, Clone)]
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn decode(row: DrinkRow) -> StoreResult<Drink> {
        let id = row.id;
        Drink::try_from(row).map_err(|source| StoreError::CorruptRecipe { id, source })
    }

    /// Turn unique violations on `title` into a domain error
    fn classify(err: sqlx::Error, title: Option<&str>) -> StoreError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::DuplicateTitle(title.unwrap_or_default().to_string());
            }
        }
        err.into()
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list(&self) -> StoreResult<Vec<Drink>> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drink ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::decode).collect()
    }

    async fn find(&self, id: i32) -> StoreResult<Option<Drink>> {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drink WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::decode).transpose()
    }

    async fn insert(&self, drink: NewDrink) -> StoreResult<Drink> {
        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drink (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(recipe_to_text(&drink.recipe))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::classify(e, Some(&drink.title)))?;

        tracing::debug!("Inserted drink {} ({})", row.id, row.title);
        Self::decode(row)
    }

    async fn update(&self, id: i32, changes: DrinkChanges) -> StoreResult<Option<Drink>> {
        let recipe = changes.recipe.as_deref().map(recipe_to_text);

        // COALESCE keeps the current value for fields the caller left out
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drink
               SET title = COALESCE($2, title),
                   recipe = COALESCE($3, recipe)
             WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(recipe)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::classify(e, changes.title.as_deref()))?;

        row.map(Self::decode).transpose()
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM drink WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn reset(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drink").execute(&mut *tx).await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;

        let seed = seed_drink();
        sqlx::query("INSERT INTO drink (title, recipe) VALUES ($1, $2)")
            .bind(&seed.title)
            .bind(recipe_to_text(&seed.recipe))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!("Drink table dropped, recreated and seeded");
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
