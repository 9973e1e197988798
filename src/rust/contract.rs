use std::collections::{BTreeMap, HashMap, HashSet};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;
use crate::schema::{AttributeDomain, AttributeSchema};

/// The fitted state of the training-time `StandardScaler`, as exported next to the model.
///
/// Field names follow the fitted attribute names, with or without their trailing underscore.
/// `mean` and `scale` are absent when the scaler was fit with `with_mean=False` or
/// `with_std=False`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    #[serde(default, alias = "feature_names_in_")]
    pub feature_names_in: Option<Vec<String>>,
    #[serde(default, alias = "mean_")]
    pub mean: Option<Vec<f64>>,
    #[serde(default, alias = "scale_")]
    pub scale: Option<Vec<f64>>,
    #[serde(default, alias = "n_features_in_")]
    pub n_features_in: Option<usize>,
}

/// The ordered columns, and their standardization statistics, that the classifier
/// and scaler were fit on.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedFeatureContract {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl TrainedFeatureContract {
    /// Creates a contract from column names and per-column statistics.
    ///
    /// # Errors
    /// `ContractError` if there are no columns, a column repeats, the statistics do not
    /// match the column count, or a statistic is not finite (scales must also be non-zero).
    pub fn new(columns: Vec<String>, mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, PipelineError> {
        if columns.is_empty() {
            return Err(PipelineError::ContractError("Contract must list at least one column".into()));
        }
        if mean.len() != columns.len() || scale.len() != columns.len() {
            return Err(PipelineError::ContractError(format!(
                "Contract has {} columns but {} means and {} scales",
                columns.len(), mean.len(), scale.len()
            )));
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if index.insert(column.clone(), i).is_some() {
                return Err(PipelineError::ContractError(format!("Duplicate column '{}'", column)));
            }
        }

        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(PipelineError::ContractError(
                format!("Mean for column '{}' is not finite", columns[i])
            ));
        }
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(PipelineError::ContractError(
                format!("Scale for column '{}' must be finite and non-zero, got {}", columns[i], scale[i])
            ));
        }

        Ok(Self {
            columns,
            index,
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        })
    }

    /// Builds the contract from an exported scaler.
    ///
    /// Column names are required: without them encoded columns cannot be aligned,
    /// so their absence is rejected here rather than discovered per request.
    pub fn from_scaler(artifact: ScalerArtifact) -> Result<Self, PipelineError> {
        let columns = artifact.feature_names_in.ok_or_else(|| {
            PipelineError::ContractError(
                "Scaler carries no feature names; encoded columns cannot be aligned".into()
            )
        })?;

        if let Some(n) = artifact.n_features_in {
            if n != columns.len() {
                return Err(PipelineError::ContractError(format!(
                    "Scaler reports {} features but names {} columns", n, columns.len()
                )));
            }
        }

        let mean = artifact.mean.unwrap_or_else(|| vec![0.0; columns.len()]);
        let scale = artifact.scale.unwrap_or_else(|| vec![1.0; columns.len()]);
        Self::new(columns, mean, scale)
    }

    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let artifact: ScalerArtifact = serde_json::from_str(json)
            .map_err(|e| PipelineError::ContractError(format!("Invalid scaler artifact: {}", e)))?;
        Self::from_scaler(artifact)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Contract columns the encoder can never produce for any valid input.
    ///
    /// Such columns are always zero-filled, which usually means the schema and the
    /// training data disagree on a category spelling.
    pub fn unreachable_columns(&self, schema: &AttributeSchema) -> Vec<&str> {
        let producible: HashSet<String> = schema.expanded_columns().into_iter().collect();
        self.columns.iter()
            .filter(|c| !producible.contains(c.as_str()))
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum EncoderClasses {
    List(Vec<String>),
    Fitted {
        #[serde(alias = "classes_")]
        classes: Vec<String>,
    },
}

impl EncoderClasses {
    fn classes(&self) -> &[String] {
        match self {
            Self::List(classes) | Self::Fitted { classes } => classes,
        }
    }
}

/// Class lists of the training-time label encoders, keyed by attribute name.
///
/// Encoding never consults them; they are loaded so a build can warn when the schema's
/// enumerations drift from what training saw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoders {
    encoders: BTreeMap<String, EncoderClasses>,
}

impl LabelEncoders {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn classes(&self, attribute: &str) -> Option<&[String]> {
        self.encoders.get(attribute).map(EncoderClasses::classes)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Describes every categorical option the encoders never saw, and every encoder
    /// class the schema does not offer. Attributes without an encoder are skipped.
    pub fn cross_check(&self, schema: &AttributeSchema) -> Vec<String> {
        let mut mismatches = Vec::new();
        for spec in schema.categorical() {
            let (Some(classes), AttributeDomain::Categorical { options }) = (self.classes(spec.name()), &spec.domain) else {
                continue;
            };
            for option in options.iter() {
                if !classes.iter().any(|c| c.as_str() == *option) {
                    mismatches.push(format!("{}: option '{}' unknown to the label encoder", spec.name(), option));
                }
            }
            for class in classes.iter().filter(|c| !options.contains(&c.as_str())) {
                mismatches.push(format!("{}: encoder class '{}' not offered by the schema", spec.name(), class));
            }
        }
        mismatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_with_fitted_names() {
        let contract = TrainedFeatureContract::from_json_str(r#"{
            "feature_names_in_": ["Tenure", "Contract_Two_year"],
            "mean_": [32.0, 0.25],
            "scale_": [24.0, 0.5],
            "n_features_in_": 2
        }"#).unwrap();

        assert_eq!(contract.len(), 2);
        assert_eq!(contract.position("Contract_Two_year"), Some(1));
        assert_eq!(contract.mean()[0], 32.0);
        assert_eq!(contract.scale()[1], 0.5);
    }

    #[test]
    fn test_missing_feature_names_rejected() {
        let result = TrainedFeatureContract::from_json_str(r#"{"mean": [1.0], "scale": [1.0]}"#);
        assert!(matches!(result, Err(PipelineError::ContractError(_))));
    }

    #[test]
    fn test_identity_statistics_when_absent() {
        let contract = TrainedFeatureContract::from_scaler(ScalerArtifact {
            feature_names_in: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        }).unwrap();
        assert_eq!(contract.mean().to_vec(), vec![0.0, 0.0]);
        assert_eq!(contract.scale().to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_invalid_statistics() {
        let columns = vec!["a".to_string(), "b".to_string()];
        assert!(TrainedFeatureContract::new(columns.clone(), vec![0.0], vec![1.0, 1.0]).is_err());
        assert!(TrainedFeatureContract::new(columns.clone(), vec![0.0, 0.0], vec![1.0, 0.0]).is_err());
        assert!(TrainedFeatureContract::new(columns, vec![f64::NAN, 0.0], vec![1.0, 1.0]).is_err());
        assert!(TrainedFeatureContract::new(
            vec!["a".into(), "a".into()], vec![0.0, 0.0], vec![1.0, 1.0]
        ).is_err());
        assert!(TrainedFeatureContract::new(vec![], vec![], vec![]).is_err());
    }

    #[test]
    fn test_feature_count_mismatch() {
        let result = TrainedFeatureContract::from_json_str(
            r#"{"feature_names_in": ["a"], "n_features_in": 3}"#
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unreachable_columns() {
        let contract = TrainedFeatureContract::new(
            vec!["Tenure".into(), "Contract_one_year".into(), "Contract_One_year".into()],
            vec![0.0; 3],
            vec![1.0; 3],
        ).unwrap();
        assert_eq!(contract.unreachable_columns(AttributeSchema::global()), vec!["Contract_one_year"]);
    }

    #[test]
    fn test_label_encoder_forms() {
        let encoders = LabelEncoders::from_json_str(r#"{
            "Gender": ["Female", "Male"],
            "Contract": {"classes_": ["Month-to-month", "One_year", "Two_year"]}
        }"#).unwrap();

        assert_eq!(encoders.len(), 2);
        assert_eq!(encoders.classes("Gender").map(|c| c.len()), Some(2));
        assert_eq!(encoders.classes("Contract").map(|c| c[2].as_str()), Some("Two_year"));
        assert!(encoders.cross_check(AttributeSchema::global()).is_empty());
    }

    #[test]
    fn test_label_encoder_cross_check() {
        let encoders = LabelEncoders::from_json_str(
            r#"{"Internet_Service": ["DSL", "Fiber optic", "No"]}"#
        ).unwrap();
        let mismatches = encoders.cross_check(AttributeSchema::global());
        assert_eq!(mismatches.len(), 2);
        assert!(mismatches[0].contains("Fiber_optic"));
        assert!(mismatches[1].contains("Fiber optic"));
    }
}
