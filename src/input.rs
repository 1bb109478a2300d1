//! Common routines for handling input data.
use crate::model::Model;
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use indexmap::map::Entry;
use itertools::Itertools;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fmt::Display;
use std::fs;
use std::hash::Hash;
use std::path::Path;

pub mod day;
pub mod demand_response;
pub mod fuel;
pub mod generator;
pub mod load_zone;
pub mod timescale;

/// The string Switch-style input files use to indicate a missing value
const MISSING_VALUE_MARKER: &str = ".";

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    ensure!(!vec.is_empty(), "CSV file {} cannot be empty", file_path.display());

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file.
///
/// Unlike [`read_csv`], a missing or empty file is not an error: an empty iterator is returned.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    if !file_path.exists() {
        log::debug!(
            "Optional input file {} not found; using defaults",
            file_path.display()
        );
        return Ok(Vec::new().into_iter());
    }

    Ok(read_csv_internal(file_path)?.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?;

    reader
        .deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read an optional number, treating an empty cell or "." as a missing value
pub fn deserialise_optional<'de, D, T>(deserialiser: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: Display,
{
    let value: Option<String> = Deserialize::deserialize(deserialiser)?;
    match value.as_deref().map(str::trim) {
        None | Some("" | MISSING_VALUE_MARKER) => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Read a 0/1 flag as a boolean
pub fn deserialise_flag<'de, D>(deserialiser: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: String = Deserialize::deserialize(deserialiser)?;
    match value.trim() {
        "1" | "1.0" => Ok(true),
        "0" | "0.0" | "" | MISSING_VALUE_MARKER => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "Invalid flag value '{other}': must be 0 or 1"
        ))),
    }
}

/// Check that a value is finite and non-negative
pub fn check_non_negative(value: f64, name: &str) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a finite number greater than or equal to zero (got {value})"
    );

    Ok(())
}

/// Inserts a key-value pair into a map if the key does not already exist.
///
/// If the key already exists, it returns an error with a message indicating the key's existence.
pub fn try_insert<K, V>(map: &mut IndexMap<K, V>, key: K, value: V) -> Result<()>
where
    K: Eq + Hash + std::fmt::Debug,
{
    match map.entry(key) {
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(())
        }
        Entry::Occupied(entry) => bail!("Duplicate entry for {:?}", entry.key()),
    }
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The static model data or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    Model::from_path(model_dir)
}
