use linfit_model::ModelState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::IoResult;

/// Which model a saved state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearRegression,
    Perceptron,
    Svm,
}

impl ModelKind {
    pub fn is_classifier(&self) -> bool {
        !matches!(self, ModelKind::LinearRegression)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::LinearRegression => "linear regression",
            ModelKind::Perceptron => "perceptron",
            ModelKind::Svm => "linear svm",
        };
        f.write_str(name)
    }
}

/// A trained model on disk: its kind plus everything inference needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    pub kind: ModelKind,
    pub state: ModelState<f64>,
}

/// Save a model to a pretty-printed JSON file.
pub fn save_model<P: AsRef<Path>>(model: &SavedModel, path: P) -> IoResult<()> {
    let json = serde_json::to_string_pretty(model)?;
    fs::write(path.as_ref(), json)?;
    log::info!("saved {} to {}", model.kind, path.as_ref().display());
    Ok(())
}

/// Load a model from a JSON file.
pub fn load_model<P: AsRef<Path>>(path: P) -> IoResult<SavedModel> {
    let json = fs::read_to_string(path.as_ref())?;
    let model: SavedModel = serde_json::from_str(&json)?;
    Ok(model)
}
