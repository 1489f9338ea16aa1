use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Drink, DrinkChanges, NewDrink};
use super::store::{seed_drink, DrinkStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i32, Drink>,
    next_id: i32,
}

impl Table {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

/// Process-local drink store with the same semantics as the PostgreSQL one:
/// serial ids starting at 1 and unique titles.
#[derive(Debug, Default)]
pub struct MemoryDrinkStore {
    table: RwLock<Table>,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list(&self) -> StoreResult<Vec<Drink>> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find(&self, id: i32) -> StoreResult<Option<Drink>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert(&self, drink: NewDrink) -> StoreResult<Drink> {
        let mut table = self.table.write().await;
        if table.title_taken(&drink.title, None) {
            return Err(StoreError::DuplicateTitle(drink.title));
        }

        table.next_id += 1;
        let created = Drink {
            id: table.next_id,
            title: drink.title,
            recipe: drink.recipe,
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, changes: DrinkChanges) -> StoreResult<Option<Drink>> {
        let mut table = self.table.write().await;
        if let Some(title) = &changes.title {
            if table.title_taken(title, Some(id)) {
                return Err(StoreError::DuplicateTitle(title.clone()));
            }
        }

        let Some(drink) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            drink.title = title;
        }
        if let Some(recipe) = changes.recipe {
            drink.recipe = recipe;
        }
        Ok(Some(drink.clone()))
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn ensure_schema(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn reset(&self) -> StoreResult<()> {
        {
            let mut table = self.table.write().await;
            *table = Table::default();
        }
        self.insert(seed_drink()).await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
