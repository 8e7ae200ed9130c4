//! Storage, planning, and shopping-list aggregation for the mealplan CLI.

pub mod db;
pub mod models;
pub mod service;
pub mod shopping;
