//! PostgreSQL store against a live database.
//!
//! Runs only when `DATABASE_URL` is set (a `.env` file is honoured). The
//! `drink` table in that database is dropped and reseeded, so point it at a
//! scratch database. Everything runs in one test to keep the shared table
//! free of concurrent writers.

use anyhow::{Context, Result};
use serde_json::json;

use drinks_api::config::DatabaseConfig;
use drinks_api::database::models::{parse_recipe, DrinkChanges, NewDrink};
use drinks_api::database::{DatabaseManager, DrinkStore, PgDrinkStore, StoreError};

async fn store_from_env() -> Result<Option<PgDrinkStore>> {
    let _ = dotenvy::dotenv();
    let Some(url) = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()) else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL store tests");
        return Ok(None);
    };

    let config = DatabaseConfig {
        url: Some(url),
        max_connections: 2,
        connection_timeout: 5,
        reset_on_start: false,
    };
    let pool = DatabaseManager::connect(&config)
        .await
        .context("failed to connect to DATABASE_URL")?;
    Ok(Some(PgDrinkStore::new(pool)))
}

fn new_drink(title: &str) -> Result<NewDrink> {
    let recipe = json!([
        {"name": "rum", "color": "amber", "parts": 2},
        {"name": "lime", "color": "green", "parts": 0.5}
    ]);
    Ok(NewDrink {
        title: title.to_string(),
        recipe: parse_recipe(&recipe)?,
    })
}

#[tokio::test]
async fn postgres_store_lifecycle() -> Result<()> {
    let Some(store) = store_from_env().await? else {
        return Ok(());
    };

    store.ensure_schema().await?;
    store.health_check().await?;

    // Reset leaves exactly the seed
    store.reset().await?;
    let drinks = store.list().await?;
    assert_eq!(drinks.len(), 1);
    assert_eq!(drinks[0].id, 1);
    assert_eq!(drinks[0].title, "water");
    assert_eq!(
        serde_json::to_value(&drinks[0].recipe)?,
        json!([{"name": "water", "color": "blue", "parts": 1}])
    );

    // Insert, listed in id order
    let daiquiri = store.insert(new_drink("daiquiri")?).await?;
    let mojito = store.insert(new_drink("mojito")?).await?;
    assert!(daiquiri.id < mojito.id);
    let ids: Vec<i32> = store.list().await?.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, daiquiri.id, mojito.id]);
    assert_eq!(store.find(mojito.id).await?, Some(mojito.clone()));

    // Unique titles
    assert!(matches!(
        store.insert(new_drink("water")?).await,
        Err(StoreError::DuplicateTitle(title)) if title == "water"
    ));

    // Title-only update keeps the recipe
    let changes = DrinkChanges {
        title: Some("daiquiri no. 2".to_string()),
        recipe: None,
    };
    let updated = store
        .update(daiquiri.id, changes)
        .await?
        .context("daiquiri vanished")?;
    assert_eq!(updated.title, "daiquiri no. 2");
    assert_eq!(updated.recipe, daiquiri.recipe);

    // Recipe-only update keeps the title
    let changes = DrinkChanges {
        title: None,
        recipe: Some(parse_recipe(&json!({"name": "soda", "color": "clear", "parts": 1}))?),
    };
    let updated = store.update(mojito.id, changes).await?.context("mojito vanished")?;
    assert_eq!(updated.title, "mojito");
    assert_eq!(updated.recipe.len(), 1);

    // Renaming onto an existing title
    let changes = DrinkChanges {
        title: Some("water".to_string()),
        recipe: None,
    };
    assert!(matches!(
        store.update(mojito.id, changes).await,
        Err(StoreError::DuplicateTitle(_))
    ));

    // Unknown id
    let changes = DrinkChanges {
        title: Some("ghost".to_string()),
        recipe: None,
    };
    assert!(store.update(9999, changes).await?.is_none());

    // Delete
    assert!(store.delete(mojito.id).await?);
    assert!(!store.delete(mojito.id).await?);
    assert!(store.find(mojito.id).await?.is_none());
    assert_eq!(store.list().await?.len(), 2);

    // Ids are not reused after a delete
    let next = store.insert(new_drink("mojito")?).await?;
    assert!(next.id > mojito.id);

    store.reset().await?;
    assert_eq!(store.list().await?.len(), 1);
    Ok(())
}
