//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_demand_response, bool, true);
define_param_default!(default_distribution, bool, false);
define_param_default!(default_loss_rate, f64, 0.0);

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq, Default)]
pub struct ModelParameters {
    /// Which optional modules are included in the model
    #[serde(default)]
    pub modules: ModuleFlags,
    /// Parameters for the distribution node
    #[serde(default)]
    pub distribution: DistributionParameters,
}

/// Flags for enabling optional modules
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModuleFlags {
    /// Whether demand in each zone can be shifted within each day
    #[serde(default = "default_demand_response")]
    pub demand_response: bool,
    /// Whether loads are served from a separate distribution node
    #[serde(default = "default_distribution")]
    pub distribution: bool,
}

impl Default for ModuleFlags {
    fn default() -> Self {
        Self {
            demand_response: default_demand_response(),
            distribution: default_distribution(),
        }
    }
}

/// Parameters for the distribution node
#[derive(Debug, Deserialize, PartialEq)]
pub struct DistributionParameters {
    /// Fraction of power withdrawn from the central grid which is lost in distribution
    #[serde(default = "default_loss_rate")]
    pub loss_rate: f64,
}

impl Default for DistributionParameters {
    fn default() -> Self {
        Self {
            loss_rate: default_loss_rate(),
        }
    }
}

/// Check that the `loss_rate` parameter is valid
fn check_loss_rate(value: f64) -> Result<()> {
    ensure!(
        (0.0..1.0).contains(&value),
        "distribution.loss_rate must be at least 0 and less than 1"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_loss_rate(self.distribution.loss_rate)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[rstest]
    #[case(0.0, true)]
    #[case(0.05, true)]
    #[case(0.999, true)]
    #[case(1.0, false)]
    #[case(-0.1, false)]
    #[case(f64::NAN, false)]
    fn test_check_loss_rate(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(check_loss_rate(value).is_ok(), expected_valid);
    }

    #[test]
    fn test_model_params_from_path_defaults() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();

        let model_params = ModelParameters::from_path(dir.path()).unwrap();
        assert!(model_params.modules.demand_response);
        assert!(!model_params.modules.distribution);
        assert_approx_eq!(f64, model_params.distribution.loss_rate, 0.0);
    }

    #[test]
    fn test_model_params_from_path() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "[modules]\ndemand_response = false\ndistribution = true\n\n[distribution]\nloss_rate = 0.05"
            )
            .unwrap();
        }

        let model_params = ModelParameters::from_path(dir.path()).unwrap();
        assert!(!model_params.modules.demand_response);
        assert!(model_params.modules.distribution);
        assert_approx_eq!(f64, model_params.distribution.loss_rate, 0.05);
    }

    #[test]
    fn test_model_params_from_path_invalid_loss_rate() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            writeln!(file, "[distribution]\nloss_rate = 1.5").unwrap();
        }

        assert!(ModelParameters::from_path(dir.path()).is_err());
    }
}
