//! Common functionality for powerplan.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod assembly;
pub mod cli;
pub mod day;
pub mod demand_response;
pub mod fuel;
pub mod generator;
pub mod id;
pub mod input;
pub mod load_zone;
pub mod log;
pub mod model;
pub mod output;
pub mod registry;
pub mod settings;
pub mod solver;
pub mod timescale;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// This is the platform's config dir with `powerplan` appended, or the current directory if the
/// platform has no config dir.
pub fn get_powerplan_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        return PathBuf::from(".");
    };
    config_dir.push("powerplan");

    config_dir
}
