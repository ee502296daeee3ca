//! Scenario validation.

use std::path::{Path, PathBuf};

use warpfleet_core::scenario::ScenarioData;

use crate::error::ToolResult;

/// Counts from a scenario that loaded and built cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Scenario name.
    pub name: String,
    /// Star systems.
    pub systems: usize,
    /// Empires.
    pub empires: usize,
    /// Fleets.
    pub fleets: usize,
}

/// Load and build one scenario file.
///
/// # Errors
///
/// Returns the first parse or consistency error found.
pub fn validate_scenario(path: &Path) -> ToolResult<ValidationSummary> {
    let data = ScenarioData::load(path)?;
    let scenario = data.build()?;
    Ok(ValidationSummary {
        name: scenario.name,
        systems: scenario.state.galaxy.len(),
        empires: scenario.state.empires.len(),
        fleets: scenario.state.fleets.len(),
    })
}

/// Validate every `.ron` file under `path`, or `path` itself if it is a file.
///
/// Files are checked in name order. Each result is paired with its path so
/// one bad file does not hide the others.
///
/// # Errors
///
/// Returns an error only if the directory cannot be read.
pub fn validate_path(path: &Path) -> ToolResult<Vec<(PathBuf, ToolResult<ValidationSummary>)>> {
    if path.is_file() {
        return Ok(vec![(path.to_path_buf(), validate_scenario(path))]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let file = entry?.path();
        if file.extension().is_some_and(|ext| ext == "ron") {
            files.push(file);
        }
    }
    files.sort();

    Ok(files
        .into_iter()
        .map(|file| {
            let result = validate_scenario(&file);
            (file, result)
        })
        .collect())
}
