use std::path::Path;

use anyhow::Result;
use tracing::error;

use crate::db::{Database, StoreConfig};
use crate::models::{DayPlan, Meal, NewMeal, ShoppingItem};
use crate::shopping;

/// Front door for the interactive planner.
///
/// Storage failures never escape from here: each one is logged at `error`
/// level and the operation returns an empty or negative result, so a caller
/// cannot tell "no data" from "storage error" by the return value alone.
/// Use [`Database`] directly when errors should propagate.
pub struct PlannerService {
    db: Database,
}

impl PlannerService {
    /// Opening is the one fallible step: a store that cannot create its
    /// schema is not handed out.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let db = Database::open(config)?;
        Ok(Self { db })
    }

    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the stored meal, or `None` if it could not be stored.
    pub fn add_meal(&self, meal: &NewMeal) -> Option<Meal> {
        self.db
            .add_meal(meal)
            .map_err(|e| report("add meal", &e))
            .ok()
    }

    pub fn meals(&self, category: Option<&str>) -> Vec<Meal> {
        self.db
            .get_meals(category)
            .unwrap_or_else(|e| masked("list meals", &e))
    }

    pub fn meal_names(&self, category: &str) -> Vec<String> {
        self.db
            .get_meal_names(category)
            .unwrap_or_else(|e| masked("list meal names", &e))
    }

    pub fn plan_exists(&self) -> bool {
        self.db
            .is_plan_exist()
            .unwrap_or_else(|e| masked("check plan", &e))
    }

    /// Returns `false` if the week was not stored; the previous plan is
    /// then still in place.
    pub fn plan_week(&self, days: &[DayPlan]) -> bool {
        self.db
            .plan_meals(days)
            .map_err(|e| report("save plan", &e))
            .is_ok()
    }

    pub fn current_plan(&self) -> Vec<DayPlan> {
        self.db
            .get_plan()
            .unwrap_or_else(|e| masked("read plan", &e))
    }

    /// The aggregated shopping list for the stored plan.
    pub fn shopping_list(&self) -> Vec<ShoppingItem> {
        let raw = self
            .db
            .get_plan_ingredients()
            .unwrap_or_else(|e| masked("collect plan ingredients", &e));
        shopping::aggregate(&raw)
    }

    /// Export the shopping list to `path`. File errors are returned so the
    /// caller can report the failed save.
    pub fn export_shopping_list(&self, path: &Path) -> Result<Vec<ShoppingItem>> {
        let items = self.shopping_list();
        shopping::write_shopping_list(path, &items)?;
        Ok(items)
    }
}

fn report(operation: &str, err: &anyhow::Error) {
    error!(operation, "Error: {err:#}");
}

fn masked<T: Default>(operation: &str, err: &anyhow::Error) -> T {
    report(operation, err);
    T::default()
}
