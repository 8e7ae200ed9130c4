mod helpers;
mod meal;
mod plan;

pub(crate) use helpers::{write_meals, write_plan};
pub(crate) use meal::{cmd_add, cmd_show};
pub(crate) use plan::{cmd_plan_show, cmd_save};
