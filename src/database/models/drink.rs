use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use sqlx::FromRow;
use thiserror::Error;

/// Maximum title length, matching the `VARCHAR(80)` column
pub const TITLE_MAX_LEN: usize = 80;

/// Problems with client-supplied drink fields
#[derive(Debug, Error, PartialEq)]
pub enum DrinkValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title must be at most {} characters", TITLE_MAX_LEN)]
    TitleTooLong,

    #[error("title must be a string")]
    TitleNotString,

    #[error("recipe must be an ingredient object or a list of ingredient objects")]
    RecipeShape,

    #[error("recipe must contain at least one ingredient")]
    EmptyRecipe,

    #[error("ingredient {index}: {reason}")]
    Ingredient { index: usize, reason: String },
}

/// One line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: Number,
}

/// Public-safe ingredient: no quantities
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortIngredient<'a> {
    pub name: &'a str,
    pub color: &'a str,
}

/// A persisted drink with its recipe already decoded
#[derive(Debug, Clone, PartialEq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Public listing representation
#[derive(Debug, Serialize)]
pub struct ShortDrink<'a> {
    pub id: i32,
    pub title: &'a str,
    pub recipe: Vec<ShortIngredient<'a>>,
}

/// Privileged representation with full recipe detail
#[derive(Debug, Serialize)]
pub struct LongDrink<'a> {
    pub id: i32,
    pub title: &'a str,
    pub recipe: &'a [Ingredient],
}

impl Drink {
    pub fn short(&self) -> ShortDrink<'_> {
        ShortDrink {
            id: self.id,
            title: &self.title,
            recipe: self
                .recipe
                .iter()
                .map(|i| ShortIngredient {
                    name: &i.name,
                    color: &i.color,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink<'_> {
        LongDrink {
            id: self.id,
            title: &self.title,
            recipe: &self.recipe,
        }
    }
}

/// Raw `drink` table row; the recipe is JSON text
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = serde_json::Error;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe: serde_json::from_str(&row.recipe)?,
        })
    }
}

/// Validated fields for a new drink
#[derive(Debug, Clone, PartialEq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Validated partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

impl DrinkChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }
}

/// Serialize a recipe to the text stored in the `recipe` column
pub fn recipe_to_text(recipe: &[Ingredient]) -> String {
    // A Vec of plain structs with string keys cannot fail to serialize
    serde_json::to_string(recipe).unwrap_or_else(|_| "[]".to_string())
}

/// Validate a title value from a request body
///
/// The title is kept exactly as sent; only blank titles are rejected.
pub fn parse_title(value: &Value) -> Result<String, DrinkValidationError> {
    let title = value.as_str().ok_or(DrinkValidationError::TitleNotString)?;
    if title.trim().is_empty() {
        return Err(DrinkValidationError::EmptyTitle);
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(DrinkValidationError::TitleTooLong);
    }
    Ok(title.to_string())
}

/// Validate a recipe value from a request body.
///
/// Accepts either a list of ingredient objects or a single ingredient object,
/// which is normalised into a one-element list.
pub fn parse_recipe(value: &Value) -> Result<Vec<Ingredient>, DrinkValidationError> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => return Err(DrinkValidationError::RecipeShape),
    };

    if items.is_empty() {
        return Err(DrinkValidationError::EmptyRecipe);
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_ingredient(index, item))
        .collect()
}

fn parse_ingredient(index: usize, value: &Value) -> Result<Ingredient, DrinkValidationError> {
    let fail = |reason: &str| DrinkValidationError::Ingredient {
        index,
        reason: reason.to_string(),
    };

    let obj = value.as_object().ok_or_else(|| fail("must be an object"))?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| fail("name must be a non-empty string"))?;

    let color = obj
        .get("color")
        .and_then(Value::as_str)
        .ok_or_else(|| fail("color must be a string"))?;

    let parts = match obj.get("parts") {
        Some(Value::Number(n)) if n.as_f64().map_or(false, |f| f >= 0.0) => n.clone(),
        _ => return Err(fail("parts must be a non-negative number")),
    };

    Ok(Ingredient {
        name: name.to_string(),
        color: color.to_string(),
        parts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn margarita() -> Drink {
        Drink {
            id: 7,
            title: "margarita".to_string(),
            recipe: parse_recipe(&json!([
                {"name": "tequila", "color": "gold", "parts": 2},
                {"name": "lime", "color": "green", "parts": 1}
            ]))
            .unwrap(),
        }
    }

    #[test]
    fn short_view_hides_parts() {
        let value = serde_json::to_value(margarita().short()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "title": "margarita",
                "recipe": [
                    {"name": "tequila", "color": "gold"},
                    {"name": "lime", "color": "green"}
                ]
            })
        );
    }

    #[test]
    fn long_view_keeps_integer_parts() {
        let value = serde_json::to_value(margarita().long()).unwrap();
        assert_eq!(value["recipe"][0]["parts"], json!(2));
        assert_eq!(value["recipe"][1], json!({"name": "lime", "color": "green", "parts": 1}));
    }

    #[test]
    fn single_ingredient_object_becomes_list() {
        let recipe = parse_recipe(&json!({"name": "water", "color": "blue", "parts": 1})).unwrap();
        assert_eq!(recipe.len(), 1);
        assert_eq!(recipe[0].name, "water");
    }

    #[test]
    fn rejects_malformed_recipes() {
        assert_eq!(parse_recipe(&json!("water")), Err(DrinkValidationError::RecipeShape));
        assert_eq!(parse_recipe(&json!([])), Err(DrinkValidationError::EmptyRecipe));
        assert!(matches!(
            parse_recipe(&json!([{"name": "water", "color": "blue"}])),
            Err(DrinkValidationError::Ingredient { index: 0, .. })
        ));
        assert!(matches!(
            parse_recipe(&json!([
                {"name": "a", "color": "b", "parts": 1},
                {"name": "", "color": "b", "parts": 1}
            ])),
            Err(DrinkValidationError::Ingredient { index: 1, .. })
        ));
        assert!(parse_recipe(&json!([{"name": "a", "color": "b", "parts": -1}])).is_err());
    }

    #[test]
    fn validates_titles() {
        assert_eq!(parse_title(&json!("mojito")).unwrap(), "mojito");
        assert_eq!(parse_title(&json!("  mojito ")).unwrap(), "  mojito ");
        assert_eq!(parse_title(&json!("   ")), Err(DrinkValidationError::EmptyTitle));
        assert_eq!(parse_title(&json!(3)), Err(DrinkValidationError::TitleNotString));
        assert_eq!(parse_title(&json!("x".repeat(81))), Err(DrinkValidationError::TitleTooLong));
    }

    #[test]
    fn row_round_trips_through_recipe_text() {
        let drink = margarita();
        let row = DrinkRow {
            id: drink.id,
            title: drink.title.clone(),
            recipe: recipe_to_text(&drink.recipe),
        };
        assert_eq!(Drink::try_from(row).unwrap(), drink);
    }

    #[test]
    fn corrupt_row_fails_to_decode() {
        let row = DrinkRow {
            id: 1,
            title: "broken".into(),
            recipe: "{not json".into(),
        };
        assert!(Drink::try_from(row).is_err());
    }
}
