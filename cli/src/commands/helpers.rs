use serde::Serialize;
use std::io::{self, Write};
use tabled::{Table, Tabled, settings::Style};

use mealplan_core::models::{DayPlan, Meal};

/// Print one category's meals in the `Name:` / `Ingredients:` block layout.
pub(crate) fn write_meals<W: Write>(out: &mut W, category: &str, meals: &[Meal]) -> io::Result<()> {
    writeln!(out, "Category: {category}")?;
    for meal in meals {
        writeln!(out, "Name: {}", meal.name)?;
        writeln!(out, "Ingredients:")?;
        for ingredient in &meal.ingredients {
            writeln!(out, "{ingredient}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub(crate) fn write_plan<W: Write>(out: &mut W, days: &[DayPlan]) -> io::Result<()> {
    for d in days {
        writeln!(out, "{}", d.day)?;
        writeln!(out, "Breakfast: {}", d.breakfast)?;
        writeln!(out, "Lunch: {}", d.lunch)?;
        writeln!(out, "Dinner: {}", d.dinner)?;
        writeln!(out)?;
    }
    Ok(())
}

pub(crate) fn print_plan_table(days: &[DayPlan]) {
    #[derive(Tabled)]
    struct PlanRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "Breakfast")]
        breakfast: String,
        #[tabled(rename = "Lunch")]
        lunch: String,
        #[tabled(rename = "Dinner")]
        dinner: String,
    }

    let rows: Vec<PlanRow> = days
        .iter()
        .map(|d| PlanRow {
            day: d.day.clone(),
            breakfast: truncate(&d.breakfast, 30),
            lunch: truncate(&d.lunch, 30),
            dinner: truncate(&d.dinner, 30),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
