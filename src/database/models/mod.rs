pub mod drink;

pub use drink::{
    parse_recipe, parse_title, recipe_to_text, Drink, DrinkChanges, DrinkRow,
    DrinkValidationError, Ingredient, LongDrink, NewDrink, ShortDrink,
};
