use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::debug;

use crate::models::{CATEGORIES, DayPlan, Meal, NewMeal};

/// Connection parameters for the meal store. Built once at startup and
/// handed to [`Database::open`]; never reloaded.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

const TABLES: &[(&str, &str)] = &[
    (
        "meals",
        "CREATE TABLE meals (
            meal_id INTEGER,
            meal TEXT NOT NULL,
            category TEXT NOT NULL
        )",
    ),
    (
        "ingredients",
        "CREATE TABLE ingredients (
            ingredient_id INTEGER,
            ingredient TEXT NOT NULL,
            meal_id INTEGER
        )",
    ),
    (
        "plan",
        "CREATE TABLE plan (
            day TEXT NOT NULL,
            breakfast TEXT NOT NULL,
            lunch TEXT NOT NULL,
            dinner TEXT NOT NULL
        )",
    ),
];

/// Meal and plan storage backed by a SQLite file.
///
/// Every operation opens its own connection and drops it before returning.
pub struct Database {
    config: StoreConfig,
}

impl Database {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let db = Database {
            config: config.clone(),
        };
        db.ensure_schema()?;
        Ok(db)
    }

    fn connect(&self) -> Result<Connection> {
        let path = &self.config.db_path;
        Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))
    }

    /// Create any of the three tables that are missing. Existing tables are
    /// left untouched.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        for (table, ddl) in TABLES {
            if Self::table_exists(&conn, table)? {
                continue;
            }
            debug!(table, "creating table");
            conn.execute_batch(ddl)
                .with_context(|| format!("Failed to create table '{table}'"))?;
        }
        Ok(())
    }

    fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            params![table],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    // --- Meals ---

    /// Store a meal and its ingredients in one transaction.
    ///
    /// The id is one past the largest stored id, so it stays unique even if
    /// rows were deleted by hand. A second meal with the same name in the
    /// same category is rejected.
    pub fn add_meal(&self, meal: &NewMeal) -> Result<Meal> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let duplicate: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM meals WHERE meal = ?1 AND category = ?2)",
            params![meal.name, meal.category],
            |row| row.get(0),
        )?;
        if duplicate {
            bail!(
                "A {} meal named '{}' already exists",
                meal.category,
                meal.name
            );
        }

        let meal_id: i64 = tx.query_row(
            "SELECT COALESCE(MAX(meal_id), 0) + 1 FROM meals",
            [],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO meals (meal_id, meal, category) VALUES (?1, ?2, ?3)",
            params![meal_id, meal.name, meal.category],
        )?;

        let mut ingredient_id: i64 = tx.query_row(
            "SELECT COALESCE(MAX(ingredient_id), 0) + 1 FROM ingredients",
            [],
            |row| row.get(0),
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO ingredients (ingredient_id, ingredient, meal_id) VALUES (?1, ?2, ?3)",
            )?;
            for ingredient in &meal.ingredients {
                stmt.execute(params![ingredient_id, ingredient, meal_id])?;
                ingredient_id += 1;
            }
        }
        tx.commit()?;

        debug!(meal_id, name = %meal.name, category = %meal.category, "meal added");
        Ok(Meal {
            id: meal_id,
            name: meal.name.clone(),
            category: meal.category.clone(),
            ingredients: meal.ingredients.clone(),
        })
    }

    /// All meals, or only those in `category`, in insertion order.
    pub fn get_meals(&self, category: Option<&str>) -> Result<Vec<Meal>> {
        let conn = self.connect()?;

        // With no category bound, `?1 IS NULL` selects every meal
        let mut stmt = conn.prepare(
            "SELECT meal_id, meal, category FROM meals
             WHERE ?1 IS NULL OR category = ?1
             ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map(params![category], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut find_ingredients =
            conn.prepare("SELECT ingredient FROM ingredients WHERE meal_id = ?1 ORDER BY rowid")?;
        let mut meals = Vec::with_capacity(rows.len());
        for (id, name, category) in rows {
            let ingredients = find_ingredients
                .query_map(params![id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            meals.push(Meal {
                id,
                name,
                category,
                ingredients,
            });
        }
        Ok(meals)
    }

    /// Names of the meals in `category`, sorted ascending.
    pub fn get_meal_names(&self, category: &str) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .get_meals(Some(category))?
            .into_iter()
            .map(|m| m.name)
            .collect();
        names.sort();
        Ok(names)
    }

    // --- Plan ---

    pub fn is_plan_exist(&self) -> Result<bool> {
        let conn = self.connect()?;
        let exists = conn.query_row("SELECT EXISTS(SELECT 1 FROM plan)", [], |row| row.get(0))?;
        Ok(exists)
    }

    /// Replace the stored week with `days`. Exactly seven entries are
    /// required; the old plan survives if anything fails.
    pub fn plan_meals(&self, days: &[DayPlan]) -> Result<()> {
        if days.len() != 7 {
            bail!("A plan needs exactly 7 days (got {})", days.len());
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let cleared = tx.execute("DELETE FROM plan", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO plan (day, breakfast, lunch, dinner) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for d in days {
                stmt.execute(params![d.day, d.breakfast, d.lunch, d.dinner])?;
            }
        }
        tx.commit()?;

        debug!(cleared, "plan replaced");
        Ok(())
    }

    pub fn get_plan(&self) -> Result<Vec<DayPlan>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT day, breakfast, lunch, dinner FROM plan ORDER BY rowid")?;
        let days = stmt
            .query_map([], |row| {
                Ok(DayPlan {
                    day: row.get(0)?,
                    breakfast: row.get(1)?,
                    lunch: row.get(2)?,
                    dinner: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(days)
    }

    /// Every ingredient of every planned meal, one entry per use, in plan
    /// order. A planned name resolves to the meal of that name in the slot's
    /// category, else to the first meal of that name in any category. A name
    /// with no matching meal contributes nothing.
    pub fn get_plan_ingredients(&self) -> Result<Vec<String>> {
        let days = self.get_plan()?;
        let conn = self.connect()?;

        // Same-category matches sort first, then insertion order
        let mut find_meal = conn.prepare(
            "SELECT meal_id FROM meals WHERE meal = ?1
             ORDER BY category = ?2 DESC, rowid LIMIT 1",
        )?;
        let mut find_ingredients =
            conn.prepare("SELECT ingredient FROM ingredients WHERE meal_id = ?1 ORDER BY rowid")?;

        let mut ingredients = Vec::new();
        for day in &days {
            for category in CATEGORIES {
                let Some(name) = day.meal_for(category) else {
                    continue;
                };
                let meal_id: Option<i64> = find_meal
                    .query_row(params![name, category], |row| row.get(0))
                    .optional()?;
                let Some(meal_id) = meal_id else {
                    debug!(day = %day.day, category, name, "planned meal not found");
                    continue;
                };
                let rows = find_ingredients
                    .query_map(params![meal_id], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                ingredients.extend(rows);
            }
        }
        Ok(ingredients)
    }
}
