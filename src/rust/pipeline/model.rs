use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use ndarray::{Array1, Array2};
use ort::session::Session;
use ort::value::Tensor;
use log::info;
use serde::{Deserialize, Serialize};

use crate::runtime::{create_session_builder, RuntimeConfig};
use super::error::PipelineError;

/// The classifier's decision for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChurnLabel {
    #[serde(rename = "No Churn")]
    NoChurn,
    Churn,
}

impl ChurnLabel {
    /// Maps the classifier's class index (0 = stays, 1 = churns) to a label.
    pub fn from_class_index(index: i64) -> Result<Self, PipelineError> {
        match index {
            0 => Ok(Self::NoChurn),
            1 => Ok(Self::Churn),
            other => Err(PipelineError::InferenceError(format!("Unknown class index {}", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoChurn => "No Churn",
            Self::Churn => "Churn",
        }
    }
}

impl fmt::Display for ChurnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a classifier returns for one scaled feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOutput {
    /// The classifier's own decision
    pub label: ChurnLabel,
    /// Class distribution as `[no churn, churn]`
    pub probabilities: [f32; 2],
}

/// A trained binary churn classifier.
///
/// Implementations own their decision threshold: the label in `ModelOutput` is never
/// re-derived from the probabilities by the pipeline.
pub trait ChurnModel: Send + Sync + fmt::Debug {
    /// Scores one standardized feature vector laid out in contract order.
    fn predict(&self, features: &Array1<f64>) -> Result<ModelOutput, PipelineError>;

    /// Short human readable description used in logs and `PredictorInfo`.
    fn describe(&self) -> String {
        "churn classifier".to_string()
    }
}

/// A gradient-boosted classifier exported to ONNX, run through ONNX Runtime.
///
/// The model is expected to:
/// - Accept a single float input of shape [batch_size, num_features]
/// - Output the predicted class index (int64, shape [batch_size]) first
/// - Output class probabilities (float, shape [batch_size, 2]) second
///
/// Models exported with a ZipMap probability output are rejected at predict time;
/// export them with `zipmap=False`.
#[derive(Debug)]
pub struct OnnxChurnModel {
    session: Session,
    model_path: String,
    input_name: String,
    label_output: String,
    probability_output: String,
}

impl OnnxChurnModel {
    /// Loads the classifier from an ONNX file.
    ///
    /// # Errors
    /// - `BuildError` if the file does not exist or ONNX Runtime cannot load it
    /// - `InferenceError` if the model does not have the expected input/output structure
    pub fn from_file(path: impl AsRef<Path>, config: &RuntimeConfig) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::BuildError(format!("Model file not found: {}", path.display())));
        }

        let session = create_session_builder(config)?
            .commit_from_file(path)?;

        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        Ok(Self {
            input_name: session.inputs[0].name.clone(),
            label_output: session.outputs[0].name.clone(),
            probability_output: session.outputs[1].name.clone(),
            model_path: path.to_string_lossy().to_string(),
            session,
        })
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Validates that the model has the expected input/output structure
    fn validate_model(session: &Session) -> Result<(), PipelineError> {
        if session.inputs.len() != 1 {
            return Err(PipelineError::InferenceError(
                format!("Model must have exactly 1 input (the feature matrix), found {}", session.inputs.len())
            ));
        }
        if session.outputs.len() < 2 {
            return Err(PipelineError::InferenceError(format!(
                "Model must have at least 2 outputs (label and probabilities), found {}",
                session.outputs.len()
            )));
        }
        Ok(())
    }
}

impl ChurnModel for OnnxChurnModel {
    fn predict(&self, features: &Array1<f64>) -> Result<ModelOutput, PipelineError> {
        let row: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let input_array = Array2::from_shape_vec((1, row.len()), row)
            .map_err(|e| PipelineError::InferenceError(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(self.input_name.as_str(), Tensor::from_array(&input)
            .map_err(|e| PipelineError::InferenceError(format!("Failed to create input tensor: {}", e)))?);

        let outputs = self.session.run(input_tensors)
            .map_err(|e| PipelineError::InferenceError(format!("Failed to run model: {}", e)))?;

        let labels = outputs[self.label_output.as_str()].try_extract_tensor::<i64>()
            .map_err(|e| PipelineError::InferenceError(format!("Failed to extract label tensor: {}", e)))?;
        let class_index = labels.iter().next().copied()
            .ok_or_else(|| PipelineError::InferenceError("Model returned no label".into()))?;

        let probabilities = outputs[self.probability_output.as_str()].try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::InferenceError(format!("Failed to extract probability tensor: {}", e)))?;
        let probabilities: Vec<f32> = probabilities.iter().copied().collect();
        if probabilities.len() != 2 {
            return Err(PipelineError::InferenceError(format!(
                "Expected 2 class probabilities, got {}", probabilities.len()
            )));
        }

        Ok(ModelOutput {
            label: ChurnLabel::from_class_index(class_index)?,
            probabilities: [probabilities[0], probabilities[1]],
        })
    }

    fn describe(&self) -> String {
        format!("ONNX classifier at {} (input '{}')", self.model_path, self.input_name)
    }
}
