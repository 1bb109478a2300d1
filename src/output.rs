//! The module responsible for writing output data to disk.
use crate::model::Model;
use crate::registry::{Block, IndexKey, index_key};
use crate::solver::Solution;
use anyhow::{Context, Result, ensure};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

pub mod metadata;
pub use metadata::write_metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "powerplan_results";

/// The output file name for the breakdown of the objective
const OBJECTIVE_FILE_NAME: &str = "objective.csv";

/// The name used for the row holding the total system cost
const TOTAL_COST_NAME: &str = "SystemCost";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally replacing an existing one.
///
/// # Returns
///
/// Whether an existing, non-empty output directory is being overwritten.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        if fs::read_dir(output_dir)?.next().is_none() {
            // Empty, so there is nothing to overwrite
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Pass --overwrite to replace it."
        );
        fs::remove_dir_all(output_dir)?;
        fs::create_dir_all(output_dir)?;

        return Ok(true);
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// A row of the objective breakdown file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ObjectiveRow {
    component: String,
    value: f64,
}

/// Write the solution to CSV files in the output folder.
///
/// One file is written per variable block, with a column for each index set plus a `value`
/// column, along with a breakdown of the objective by cost component.
///
/// # Arguments
///
/// * `output_path` - Folder where files will be saved
/// * `model` - The model which was solved
/// * `solution` - The optimal solution
/// * `debug_model` - Whether to also write every expression block evaluated at the solution
pub fn write_solution(
    output_path: &Path,
    model: &Model,
    solution: &Solution,
    debug_model: bool,
) -> Result<()> {
    let registry = solution.registry();
    for block in registry.iter_variable_blocks() {
        write_block(
            output_path,
            block,
            block
                .iter()
                .map(|(key, var)| (key, solution.values()[var.index()])),
        )?;
    }

    if debug_model {
        for block in registry.iter_expression_blocks() {
            write_block(
                output_path,
                block,
                block.iter().map(|(key, expr)| (key, solution.evaluate(expr))),
            )?;
        }
    }

    write_objective(output_path, model, solution)
}

/// Write the values of a block to a CSV file named after it
fn write_block<'a, T, I>(output_path: &Path, block: &Block<T>, values: I) -> Result<()>
where
    I: Iterator<Item = (&'a IndexKey, f64)>,
{
    let file_path = output_path.join(format!("{}.csv", block.name()));
    let mut writer = csv::Writer::from_path(&file_path)?;
    writer.write_record(block.index_names().iter().copied().chain(iter::once("value")))?;
    for (key, value) in values {
        writer.write_record(
            key.iter()
                .map(ToString::to_string)
                .chain(iter::once(value.to_string())),
        )?;
    }
    writer.flush()?;
    debug!("Wrote {}", file_path.display());

    Ok(())
}

/// Write the contribution of each cost component to the objective, followed by the total
fn write_objective(output_path: &Path, model: &Model, solution: &Solution) -> Result<()> {
    let registry = solution.registry();
    let mut rows = Vec::new();
    for &name in registry.cost_components_per_period() {
        let mut value = 0.0;
        for period in model.time_domain.iter_periods() {
            value += solution.evaluate(&registry.term(name, &index_key!(period))?);
        }
        rows.push(ObjectiveRow {
            component: name.to_string(),
            value,
        });
    }
    for &name in registry.cost_components_per_tp() {
        let mut value = 0.0;
        for tp in model.time_domain.iter_timepoints() {
            let weight = model.time_domain.tp_weight(tp).value();
            value += weight * solution.evaluate(&registry.term(name, &index_key!(tp))?);
        }
        rows.push(ObjectiveRow {
            component: name.to_string(),
            value,
        });
    }
    rows.push(ObjectiveRow {
        component: TOTAL_COST_NAME.to_string(),
        value: solution.objective_value(),
    });

    let mut writer = csv::Writer::from_path(output_path.join(OBJECTIVE_FILE_NAME))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
