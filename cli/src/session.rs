use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::Path;

use mealplan_core::models::{
    DayPlan, NewMeal, WEEKDAYS, parse_ingredients, validate_category, validate_meal_name,
};
use mealplan_core::service::PlannerService;

use crate::commands::{write_meals, write_plan};

const MENU: &str = "What would you like to do (add, show, plan, save, exit)?";
const WRONG_CATEGORY: &str = "Wrong meal category! Choose from: breakfast, lunch, dinner.";
const WRONG_FORMAT: &str = "Wrong format. Use letters only!";
const DUPLICATE_MEAL: &str = "This meal already exists. Choose another name.";
const UNKNOWN_MEAL: &str = "This meal doesn’t exist. Choose a meal from the list above.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    MainMenu,
    AddMeal,
    ShowMeal,
    PlanMeal,
    SavePlan,
    Terminated,
}

/// The interactive planner loop. Reads one answer per line from `input`
/// and writes prompts to `output`; end of input ends the session.
pub struct Session<'a, R, W> {
    service: &'a PlannerService,
    input: R,
    output: W,
    state: State,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(service: &'a PlannerService, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
            state: State::MainMenu,
        }
    }

    pub fn run(mut self) -> Result<()> {
        while self.state != State::Terminated {
            self.state = match self.state {
                State::MainMenu => self.main_menu()?,
                State::AddMeal => self.add_meal()?,
                State::ShowMeal => self.show_meal()?,
                State::PlanMeal => self.plan_meal()?,
                State::SavePlan => self.save_plan()?,
                State::Terminated => State::Terminated,
            };
        }
        self.output.flush()?;
        Ok(())
    }

    fn main_menu(&mut self) -> Result<State> {
        writeln!(self.output, "{MENU}")?;
        let Some(command) = self.read_line()? else {
            return Ok(State::Terminated);
        };
        let next = match command.as_str() {
            "add" => State::AddMeal,
            "show" => State::ShowMeal,
            "plan" => State::PlanMeal,
            "save" => State::SavePlan,
            "exit" => {
                writeln!(self.output, "Bye!")?;
                State::Terminated
            }
            _ => State::MainMenu,
        };
        Ok(next)
    }

    fn add_meal(&mut self) -> Result<State> {
        writeln!(
            self.output,
            "Which meal do you want to add (breakfast, lunch, dinner)?"
        )?;
        let Some(category) = self.prompt_until(|s| validate_category(s).map_err(|_| WRONG_CATEGORY))?
        else {
            return Ok(State::Terminated);
        };

        writeln!(self.output, "Input the meal's name:")?;
        let existing = self.service.meal_names(category);
        let Some(name) = self.prompt_until(|s| {
            if validate_meal_name(s).is_err() {
                Err(WRONG_FORMAT)
            } else if existing.iter().any(|n| n == s) {
                Err(DUPLICATE_MEAL)
            } else {
                Ok(s.to_string())
            }
        })?
        else {
            return Ok(State::Terminated);
        };

        writeln!(self.output, "Input the ingredients:")?;
        let Some(ingredients) =
            self.prompt_until(|s| parse_ingredients(s).map_err(|_| WRONG_FORMAT))?
        else {
            return Ok(State::Terminated);
        };

        let meal = NewMeal {
            name,
            category: category.to_string(),
            ingredients,
        };
        if self.service.add_meal(&meal).is_some() {
            writeln!(self.output, "The meal has been added!")?;
        } else {
            writeln!(self.output, "The meal could not be added.")?;
        }
        Ok(State::MainMenu)
    }

    fn show_meal(&mut self) -> Result<State> {
        writeln!(
            self.output,
            "Which category do you want to print (breakfast, lunch, dinner)?"
        )?;
        let Some(category) = self.prompt_until(|s| validate_category(s).map_err(|_| WRONG_CATEGORY))?
        else {
            return Ok(State::Terminated);
        };

        let meals = self.service.meals(Some(category));
        if meals.is_empty() {
            writeln!(self.output, "No meals found.")?;
        } else {
            write_meals(&mut self.output, category, &meals)?;
        }
        Ok(State::MainMenu)
    }

    fn plan_meal(&mut self) -> Result<State> {
        let breakfasts = self.service.meal_names("breakfast");
        let lunches = self.service.meal_names("lunch");
        let dinners = self.service.meal_names("dinner");
        for (category, names) in [
            ("breakfast", &breakfasts),
            ("lunch", &lunches),
            ("dinner", &dinners),
        ] {
            if names.is_empty() {
                writeln!(
                    self.output,
                    "No {category} meals found. Add some meals first."
                )?;
                return Ok(State::MainMenu);
            }
        }

        let mut days = Vec::with_capacity(WEEKDAYS.len());
        for weekday in WEEKDAYS {
            writeln!(self.output, "{weekday}")?;
            let Some(breakfast) = self.choose_meal(weekday, "breakfast", &breakfasts)? else {
                return Ok(State::Terminated);
            };
            let Some(lunch) = self.choose_meal(weekday, "lunch", &lunches)? else {
                return Ok(State::Terminated);
            };
            let Some(dinner) = self.choose_meal(weekday, "dinner", &dinners)? else {
                return Ok(State::Terminated);
            };
            days.push(DayPlan {
                day: (*weekday).to_string(),
                breakfast,
                lunch,
                dinner,
            });
            writeln!(self.output, "Yeah! We planned the meals for {weekday}.")?;
        }

        if self.service.plan_week(&days) {
            write_plan(&mut self.output, &days)?;
        } else {
            writeln!(self.output, "The plan could not be saved.")?;
        }
        Ok(State::MainMenu)
    }

    fn choose_meal(
        &mut self,
        weekday: &str,
        category: &str,
        names: &[String],
    ) -> Result<Option<String>> {
        for name in names {
            writeln!(self.output, "{name}")?;
        }
        writeln!(
            self.output,
            "Choose the {category} for {weekday} from the list above:"
        )?;
        self.prompt_until(|s| {
            if names.iter().any(|n| n == s) {
                Ok(s.to_string())
            } else {
                Err(UNKNOWN_MEAL)
            }
        })
    }

    fn save_plan(&mut self) -> Result<State> {
        if !self.service.plan_exists() {
            writeln!(self.output, "Unable to save. Plan your meals first.")?;
            return Ok(State::MainMenu);
        }

        writeln!(self.output, "Input a filename:")?;
        let Some(filename) = self.read_line()? else {
            return Ok(State::Terminated);
        };
        match self.service.export_shopping_list(Path::new(&filename)) {
            Ok(_) => writeln!(self.output, "Saved!")?,
            Err(e) => writeln!(self.output, "Unable to save the shopping list: {e:#}")?,
        }
        Ok(State::MainMenu)
    }

    /// Read answers until `accept` takes one, printing its complaint after
    /// each rejected line. `None` means the input ran out.
    fn prompt_until<T>(
        &mut self,
        mut accept: impl FnMut(&str) -> Result<T, &'static str>,
    ) -> Result<Option<T>> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match accept(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(message) => writeln!(self.output, "{message}")?,
            }
        }
    }

    /// Bytes that are not UTF-8 become U+FFFD, which every validator
    /// rejects, so a garbled line is re-prompted like any other bad answer.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let mut line = String::from_utf8_lossy(&raw).into_owned();
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealplan_core::db::StoreConfig;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, PlannerService) {
        let dir = tempfile::tempdir().unwrap();
        let svc = PlannerService::open(&StoreConfig::new(dir.path().join("meals.db"))).unwrap();
        (dir, svc)
    }

    fn run_script(svc: &PlannerService, lines: &[&str]) -> String {
        let input = Cursor::new(lines.join("\n"));
        let mut output = Vec::new();
        Session::new(svc, input, &mut output).run().unwrap();
        String::from_utf8(output).unwrap()
    }

    fn seed(svc: &PlannerService, name: &str, category: &str, ingredients: &[&str]) {
        svc.add_meal(&NewMeal {
            name: name.to_string(),
            category: category.to_string(),
            ingredients: ingredients.iter().map(|s| (*s).to_string()).collect(),
        })
        .unwrap();
    }

    fn seed_catalog(svc: &PlannerService) {
        seed(svc, "Oatmeal", "breakfast", &["oats", "milk"]);
        seed(svc, "Soup", "lunch", &["tomato", "salt"]);
        seed(svc, "Bagel", "lunch", &["bread", "cheese"]);
        seed(svc, "Pasta", "dinner", &["pasta", "tomato"]);
    }

    #[test]
    fn test_add_meal() {
        let (_dir, svc) = open_temp();
        let out = run_script(
            &svc,
            &["add", "breakfast", "testmeal", "bits, bytes, arrays", "exit"],
        );
        let expected = "\
What would you like to do (add, show, plan, save, exit)?
Which meal do you want to add (breakfast, lunch, dinner)?
Input the meal's name:
Input the ingredients:
The meal has been added!
What would you like to do (add, show, plan, save, exit)?
Bye!
";
        assert_eq!(out, expected);

        let meals = svc.meals(Some("breakfast"));
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name, "testmeal");
        assert_eq!(meals[0].ingredients, vec!["bits", "bytes", "arrays"]);
    }

    #[test]
    fn test_add_meal_reprompts_on_bad_input() {
        let (_dir, svc) = open_temp();
        let out = run_script(
            &svc,
            &[
                "add", "brunch", "lunch", "Soup2", "Tomato Soup", "tomato,", "tomato, salt",
                "exit",
            ],
        );
        assert!(out.contains(&format!(
            "Which meal do you want to add (breakfast, lunch, dinner)?\n{WRONG_CATEGORY}\n"
        )));
        assert!(out.contains(&format!("Input the meal's name:\n{WRONG_FORMAT}\n")));
        assert!(out.contains(&format!("Input the ingredients:\n{WRONG_FORMAT}\n")));
        assert!(out.contains("The meal has been added!"));

        let meals = svc.meals(Some("lunch"));
        assert_eq!(meals[0].name, "Tomato Soup");
        assert_eq!(meals[0].ingredients, vec!["tomato", "salt"]);
    }

    #[test]
    fn test_add_meal_rejects_duplicate_name() {
        let (_dir, svc) = open_temp();
        seed(&svc, "Soup", "lunch", &["tomato"]);
        let out = run_script(&svc, &["add", "lunch", "Soup", "Stew", "beef", "exit"]);
        assert!(out.contains(DUPLICATE_MEAL));
        assert_eq!(svc.meal_names("lunch"), vec!["Soup", "Stew"]);
    }

    #[test]
    fn test_invalid_utf8_answer_is_reprompted() {
        let (_dir, svc) = open_temp();
        let mut input = b"add\nbreakfast\n".to_vec();
        input.extend([0xff, 0xfe, b'\n']);
        input.extend(b"Oatmeal\noats\nexit\n");

        let mut output = Vec::new();
        Session::new(&svc, Cursor::new(input), &mut output)
            .run()
            .unwrap();
        let out = String::from_utf8(output).unwrap();

        assert!(out.contains(&format!("Input the meal's name:\n{WRONG_FORMAT}\n")));
        assert!(out.contains("The meal has been added!\n"));
        assert!(out.ends_with("Bye!\n"));
        assert_eq!(svc.meal_names("breakfast"), vec!["Oatmeal"]);
    }

    #[test]
    fn test_show_meal() {
        let (_dir, svc) = open_temp();
        seed(&svc, "Oatmeal", "breakfast", &["oats", "milk"]);
        let out = run_script(&svc, &["show", "breakfast", "exit"]);
        let expected = "\
What would you like to do (add, show, plan, save, exit)?
Which category do you want to print (breakfast, lunch, dinner)?
Category: breakfast
Name: Oatmeal
Ingredients:
oats
milk

What would you like to do (add, show, plan, save, exit)?
Bye!
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_show_empty_category() {
        let (_dir, svc) = open_temp();
        let out = run_script(&svc, &["show", "dinner", "exit"]);
        assert!(out.contains("No meals found.\n"));
    }

    #[test]
    fn test_unknown_command_reprompts() {
        let (_dir, svc) = open_temp();
        let out = run_script(&svc, &["help", "exit"]);
        assert_eq!(out, format!("{MENU}\n{MENU}\nBye!\n"));
    }

    #[test]
    fn test_end_of_input_terminates() {
        let (_dir, svc) = open_temp();
        let out = run_script(&svc, &["add", "dinner"]);
        assert!(out.ends_with("Input the meal's name:\n"));
        assert!(!out.contains("Bye!"));
        assert!(svc.meals(None).is_empty());
    }

    #[test]
    fn test_plan_meal() {
        let (_dir, svc) = open_temp();
        seed_catalog(&svc);

        let mut script = vec!["plan"];
        // Monday's first answer names a meal that does not exist
        script.push("Pancakes");
        for day in 0..7 {
            script.push("Oatmeal");
            script.push(if day % 2 == 0 { "Soup" } else { "Bagel" });
            script.push("Pasta");
        }
        script.push("exit");
        let out = run_script(&svc, &script);

        assert!(out.contains(
            "Monday\nOatmeal\nChoose the breakfast for Monday from the list above:\n"
        ));
        assert!(out.contains(&format!("{UNKNOWN_MEAL}\n")));
        // Lunch options are listed sorted
        assert!(out.contains("Bagel\nSoup\nChoose the lunch for Tuesday from the list above:\n"));
        assert!(out.contains("Yeah! We planned the meals for Sunday.\n"));
        assert!(out.contains("Tuesday\nBreakfast: Oatmeal\nLunch: Bagel\nDinner: Pasta\n\n"));

        let plan = svc.current_plan();
        assert_eq!(plan.len(), 7);
        assert_eq!(plan[0].lunch, "Soup");
        assert_eq!(plan[1].lunch, "Bagel");
    }

    #[test]
    fn test_plan_meal_needs_every_category() {
        let (_dir, svc) = open_temp();
        seed(&svc, "Oatmeal", "breakfast", &["oats"]);
        seed(&svc, "Soup", "lunch", &["tomato"]);
        let out = run_script(&svc, &["plan", "exit"]);
        assert!(out.contains("No dinner meals found. Add some meals first.\n"));
        assert!(!svc.plan_exists());
    }

    #[test]
    fn test_save_without_plan() {
        let (_dir, svc) = open_temp();
        let out = run_script(&svc, &["save", "exit"]);
        assert!(out.contains("Unable to save. Plan your meals first.\n"));
        assert!(!out.contains("Input a filename:"));
    }

    #[test]
    fn test_save_plan() {
        let (dir, svc) = open_temp();
        seed_catalog(&svc);
        let mut script = vec!["plan"];
        for _ in 0..7 {
            script.extend(["Oatmeal", "Soup", "Pasta"]);
        }
        let path = dir.path().join("shopping");
        let path_str = path.to_str().unwrap().to_string();
        script.extend(["save", path_str.as_str(), "exit"]);

        let out = run_script(&svc, &script);
        assert!(out.contains("Input a filename:\nSaved!\n"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "oats x7\nmilk x7\ntomato x14\nsalt x7\npasta x7\n"
        );
    }

    #[test]
    fn test_save_reports_bad_path() {
        let (dir, svc) = open_temp();
        seed_catalog(&svc);
        let mut script = vec!["plan"];
        for _ in 0..7 {
            script.extend(["Oatmeal", "Bagel", "Pasta"]);
        }
        let path = dir.path().join("missing").join("list.txt");
        let path_str = path.to_str().unwrap().to_string();
        script.extend(["save", path_str.as_str(), "exit"]);

        let out = run_script(&svc, &script);
        assert!(out.contains("Unable to save the shopping list:"));
        assert!(!out.contains("Saved!"));
        assert!(out.ends_with("Bye!\n"));
    }
}
