//! Daily goal commands

use anyhow::Result;
use clap::Subcommand;
use reptrack_core::Config;
use tabled::{Table, Tabled};

use super::helpers::{open_store, rule};
use super::workout::print_progress;

#[derive(Subcommand, Debug)]
pub enum GoalAction {
    /// Set the daily rep target for an exercise (replaces any existing goal)
    Set {
        /// Exercise type, e.g. pushups
        exercise: String,
        /// Reps to reach each day
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        reps: u32,
    },
    /// Change the target of an existing goal
    Edit {
        /// Goal ID (see `goal list`)
        id: String,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        reps: u32,
    },
    /// Remove a goal
    Reset {
        /// Goal ID (see `goal list`)
        id: String,
    },
    /// List goals
    List,
    /// Show today's progress against every active goal
    Progress,
}

#[derive(Tabled)]
struct GoalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Exercise")]
    exercise: String,
    #[tabled(rename = "Target")]
    target: u32,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Created")]
    created: String,
}

pub fn handle_goal_command(config: &Config, action: GoalAction) -> Result<()> {
    let mut store = open_store(config)?;

    match action {
        GoalAction::Set { exercise, reps } => {
            let goal = store.set_goal(&exercise, reps)?;
            println!("Goal set: {} x{} per day", goal.exercise_type, goal.target_reps);
            println!("ID: {}", goal.id);
        }
        GoalAction::Edit { id, reps } => {
            if store.edit_goal(&id, reps)? {
                println!("Goal {id} now targets {reps} reps");
            } else {
                println!("No goal with ID {id}");
            }
        }
        GoalAction::Reset { id } => {
            if store.reset_goal(&id) {
                println!("Goal {id} removed");
            } else {
                println!("No goal with ID {id}");
            }
        }
        GoalAction::List => {
            if store.goals().is_empty() {
                println!("No goals set. Use: reptrack goal set <exercise> <reps>");
                return Ok(());
            }

            let rows: Vec<GoalRow> = store
                .goals()
                .iter()
                .map(|g| GoalRow {
                    id: g.id.clone(),
                    exercise: g.exercise_type.clone(),
                    target: g.target_reps,
                    active: if g.is_active { "yes" } else { "no" }.to_string(),
                    created: g.created_at.format("%Y-%m-%d").to_string(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
        GoalAction::Progress => {
            let progress = store.all_goals_progress();
            if progress.is_empty() {
                println!("No active goals");
                return Ok(());
            }

            println!("\nToday's Goals");
            println!("{}", rule(28));
            for p in &progress {
                print_progress(p);
            }
            let completed = progress.iter().filter(|p| p.is_completed).count();
            println!("\n{completed}/{} completed", progress.len());
        }
    }

    Ok(())
}
