//! Runtime configuration for alignment and regression.
//!
//! Every section defaults, so a JSON document only has to name what it
//! overrides:
//!
//! ```json
//! { "regression": { "predictors": ["co2", "ch4", "n2o", "hfc", "pfc", "sf6"] } }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::align::AlignmentPolicy;
use crate::error::{CoreError, Result};
use crate::records::Gas;

/// Which gases take part in multiple regression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    pub predictors: Vec<Gas>,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            predictors: Gas::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub alignment: AlignmentPolicy,
    pub regression: RegressionConfig,
}

impl CoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading configuration");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let predictors = &self.regression.predictors;
        if predictors.is_empty() {
            return Err(CoreError::Config(
                "regression.predictors must name at least one gas".to_string(),
            ));
        }
        let unique: HashSet<Gas> = predictors.iter().copied().collect();
        if unique.len() != predictors.len() {
            return Err(CoreError::Config(
                "regression.predictors lists a gas twice".to_string(),
            ));
        }

        let alignment = &self.alignment;
        if alignment.default_start > alignment.end {
            return Err(CoreError::Config(format!(
                "alignment.default_start {} is after alignment.end {}",
                alignment.default_start, alignment.end
            )));
        }
        if let Some((region, start)) = alignment
            .start_overrides
            .iter()
            .find(|(_, start)| **start > alignment.end)
        {
            return Err(CoreError::Config(format!(
                "start year {start} for '{region}' is after alignment.end {}",
                alignment.end
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.regression.predictors, Gas::ALL.to_vec());
        assert_eq!(config.alignment.start_year("Nunavut"), 1999);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config = CoreConfig::from_json_str(
            r#"{ "regression": { "predictors": ["co2", "ch4", "n2o", "hfc", "pfc", "sf6"] } }"#,
        )
        .unwrap();
        assert_eq!(config.regression.predictors.len(), 6);
        assert!(!config.regression.predictors.contains(&Gas::Nf3));
        assert_eq!(config.alignment, AlignmentPolicy::default());
    }

    #[test]
    fn test_override_table_from_json() {
        let config = CoreConfig::from_json_str(
            r#"{ "alignment": { "start_overrides": { "Yukon": 1995 } } }"#,
        )
        .unwrap();
        assert_eq!(config.alignment.start_year("Yukon"), 1995);
        // Replacing the table drops the built-in entries.
        assert_eq!(config.alignment.start_year("Nunavut"), 1990);
        assert_eq!(config.alignment.end, 2016);
    }

    #[test]
    fn test_validation_failures() {
        for json in [
            r#"{ "regression": { "predictors": [] } }"#,
            r#"{ "regression": { "predictors": ["co2", "co2"] } }"#,
            r#"{ "alignment": { "default_start": 2020 } }"#,
            r#"{ "alignment": { "start_overrides": { "Yukon": 2030 } } }"#,
        ] {
            assert!(
                matches!(CoreConfig::from_json_str(json), Err(CoreError::Config(_))),
                "{json} should be rejected"
            );
        }
        assert!(matches!(
            CoreConfig::from_json_str(r#"{ "regression": { "predictors": ["o3"] } }"#),
            Err(CoreError::Json(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "alignment": {{ "end": 2010 }} }}"#).unwrap();
        let config = CoreConfig::from_path(file.path()).unwrap();
        assert_eq!(config.alignment.end, 2010);
        assert!(matches!(
            CoreConfig::from_path("/nonexistent/bird_ghg.json"),
            Err(CoreError::Io(_))
        ));
    }
}
