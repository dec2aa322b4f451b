use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::{analysis::report::StabilityReport, model::FoodWeb};

/// Loads a food web from a JSON file and validates it.
///
/// # Arguments
///
/// * `path` - Path to the JSON file containing the food web
///
/// # Returns
///
/// Returns a `Result` containing either:
/// * `Ok(FoodWeb)` - The parsed and validated food web
/// * `Err(IOError)` - An error that occurred during reading or parsing
///
/// # Errors
///
/// This function will return an error if:
/// * The file cannot be found or opened (`IOError::FileNotFound`)
/// * The file contents are not a valid food web (`IOError::JsonParseError`), including
///   parameters that fail [`FoodWeb::validate`]
pub fn load_food_web(path: impl Into<PathBuf>) -> Result<FoodWeb, IOError> {
    let path = path.into();
    let file = std::fs::File::open(path).map_err(IOError::FileNotFound)?;
    serde_json::from_reader(file).map_err(IOError::JsonParseError)
}

/// Saves a food web to a JSON file.
pub fn save_food_web(path: impl Into<PathBuf>, web: &FoodWeb) -> Result<(), IOError> {
    write_json(path, web)
}

/// Saves a stability report to a JSON file.
///
/// # Arguments
///
/// * `path` - Path of the JSON file to create
/// * `report` - The report to save
pub fn save_report(path: impl Into<PathBuf>, report: &StabilityReport) -> Result<(), IOError> {
    write_json(path, report)
}

fn write_json<T: Serialize + ?Sized>(path: impl Into<PathBuf>, value: &T) -> Result<(), IOError> {
    let path = path.into();
    let file = std::fs::File::create(path).map_err(IOError::FileNotFound)?;
    serde_json::to_writer_pretty(file, value).map_err(IOError::JsonParseError)
}

/// Represents errors that can occur while reading or writing JSON files.
#[derive(Error, Debug)]
pub enum IOError {
    /// The file could not be found, opened or created.
    #[error("File not found: {0}")]
    FileNotFound(#[from] std::io::Error),

    /// The file contents could not be parsed or serialized as JSON.
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),
}
