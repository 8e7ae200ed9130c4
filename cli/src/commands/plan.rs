use anyhow::Result;
use std::path::Path;
use std::process;

use mealplan_core::db::Database;
use mealplan_core::shopping::{aggregate, write_shopping_list};

use super::helpers::{json_error, print_plan_table};

const NO_PLAN: &str = "Unable to save. Plan your meals first.";

pub(crate) fn cmd_plan_show(db: &Database, json: bool) -> Result<()> {
    let days = db.get_plan()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&days)?);
    } else if days.is_empty() {
        eprintln!("No plan yet. Run `mealplan` and choose `plan` to create one.");
    } else {
        print_plan_table(&days);
    }
    Ok(())
}

pub(crate) fn cmd_save(db: &Database, file: &Path, json: bool) -> Result<()> {
    if !db.is_plan_exist()? {
        if json {
            println!("{}", json_error(NO_PLAN));
        } else {
            eprintln!("{NO_PLAN}");
        }
        process::exit(2);
    }

    let items = aggregate(&db.get_plan_ingredients()?);
    write_shopping_list(file, &items)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "file": file.display().to_string(), "items": items })
        );
    } else {
        let count = items.len();
        println!("Saved {count} items to {}", file.display());
    }
    Ok(())
}
