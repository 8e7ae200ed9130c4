use anyhow::Result;
use std::io;

use mealplan_core::db::Database;
use mealplan_core::models::{
    CATEGORIES, NewMeal, parse_ingredients, validate_category, validate_meal_name,
};

use super::helpers::write_meals;

pub(crate) fn cmd_add(
    db: &Database,
    category: &str,
    name: &str,
    ingredients: &str,
    json: bool,
) -> Result<()> {
    let category = validate_category(category)?;
    validate_meal_name(name)?;
    let ingredients = parse_ingredients(ingredients)?;

    let meal = db.add_meal(&NewMeal {
        name: name.to_string(),
        category: category.to_string(),
        ingredients,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meal)?);
    } else {
        let id = meal.id;
        let count = meal.ingredients.len();
        println!("Added {category} meal: {name} (id: {id}, {count} ingredients)");
    }
    Ok(())
}

pub(crate) fn cmd_show(db: &Database, category: Option<&str>, json: bool) -> Result<()> {
    let category = category.map(validate_category).transpose()?;
    let meals = db.get_meals(category)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meals)?);
        return Ok(());
    }
    if meals.is_empty() {
        eprintln!("No meals found.");
        return Ok(());
    }

    let mut out = io::stdout().lock();
    let categories: &[&str] = match category {
        Some(ref c) => std::slice::from_ref(c),
        None => CATEGORIES,
    };
    for c in categories {
        let in_category: Vec<_> = meals.iter().filter(|m| m.category == *c).cloned().collect();
        if !in_category.is_empty() {
            write_meals(&mut out, c, &in_category)?;
        }
    }
    Ok(())
}
