mod commands;
mod config;
mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;

use crate::commands::{cmd_add, cmd_plan_show, cmd_save, cmd_show};
use crate::config::Config;
use crate::session::Session;
use mealplan_core::service::PlannerService;

#[derive(Parser)]
#[command(
    name = "mealplan",
    version,
    about = "Plan a week of meals and export the shopping list",
    long_about = "Plan a week of meals and export the shopping list.\n\n\
        Run without a command to start the interactive planner."
)]
struct Cli {
    /// Path to the meal database (default: per-user data directory)
    #[arg(long, global = true, env = "MEALPLAN_DB", value_name = "PATH")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive planner (the default)
    Interactive,
    /// Add a meal to the catalog
    Add {
        /// Meal category: breakfast, lunch, dinner
        category: String,
        /// Meal name (letters and spaces)
        name: String,
        /// Comma-separated ingredients (e.g. "oats, milk, honey")
        ingredients: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the meals in a category (default: all categories)
    Show {
        /// Meal category: breakfast, lunch, dinner
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current weekly plan
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save the shopping list for the current plan to a file
    Save {
        /// File to create or overwrite
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    tracing::debug!(db = %config.db_path.display(), "opening meal database");
    let service = PlannerService::open(&config.store_config())?;
    let db = service.database();

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let stdin = io::stdin();
            Session::new(&service, stdin.lock(), io::stdout()).run()
        }
        Commands::Add {
            category,
            name,
            ingredients,
            json,
        } => cmd_add(db, &category, &name, &ingredients, json),
        Commands::Show { category, json } => cmd_show(db, category.as_deref(), json),
        Commands::Plan { json } => cmd_plan_show(db, json),
        Commands::Save { file, json } => cmd_save(db, &file, json),
    }
}
