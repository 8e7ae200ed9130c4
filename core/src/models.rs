use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewMeal {
    pub name: String,
    pub category: String,
    pub ingredients: Vec<String>,
}

/// One day of the weekly plan. The three slots hold meal names, not ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
}

impl DayPlan {
    /// The planned meal name for `category`, if it is a known category.
    #[must_use]
    pub fn meal_for(&self, category: &str) -> Option<&str> {
        match category {
            "breakfast" => Some(self.breakfast.as_str()),
            "lunch" => Some(self.lunch.as_str()),
            "dinner" => Some(self.dinner.as_str()),
            _ => None,
        }
    }
}

/// A shopping list line: an ingredient and how many planned meals need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    pub name: String,
    pub count: usize,
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count > 1 {
            write!(f, "{} x{}", self.name, self.count)
        } else {
            f.write_str(&self.name)
        }
    }
}

pub const CATEGORIES: &[&str] = &["breakfast", "lunch", "dinner"];

pub const WEEKDAYS: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Categories are matched exactly; "Lunch" is not a category.
pub fn validate_category(category: &str) -> Result<&'static str> {
    match CATEGORIES.iter().copied().find(|c| *c == category) {
        Some(c) => Ok(c),
        None => bail!(
            "Invalid meal category '{category}'. Must be one of: {}",
            CATEGORIES.join(", ")
        ),
    }
}

/// Meal names are ASCII letters and spaces, with at least one letter.
pub fn validate_meal_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        bail!("Invalid meal name '{name}'. Use letters and spaces only");
    }
    if name.trim().is_empty() {
        bail!("Meal name must contain at least one letter");
    }
    Ok(())
}

/// Parse a comma-separated ingredient list such as "oats, milk,honey".
///
/// Each ingredient is trimmed and must be non-empty ASCII letters. The input
/// may not start or end with a separator or whitespace, but whitespace around
/// an inner comma is tolerated: "oats ,milk" and "oats,  milk" both parse.
pub fn parse_ingredients(input: &str) -> Result<Vec<String>> {
    if input.trim() != input || input.starts_with(',') || input.ends_with(',') {
        bail!("Invalid ingredient list '{input}'. Use comma-separated letters only");
    }
    let mut ingredients = Vec::new();
    for part in input.split(',') {
        let ingredient = part.trim();
        if ingredient.is_empty() || !ingredient.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("Invalid ingredient '{ingredient}'. Use letters only");
        }
        ingredients.push(ingredient.to_string());
    }
    Ok(ingredients)
}
