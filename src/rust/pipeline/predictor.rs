use std::sync::Arc;
use ndarray::Array1;
use log::{debug, error};

use crate::artifacts::ArtifactPaths;
use crate::contract::{LabelEncoders, TrainedFeatureContract};
use crate::input::RawInput;
use super::encoder::FeatureEncoder;
use super::error::PipelineError;
use super::model::ChurnModel;
use super::result::{PredictionRecord, PredictionResult};
use super::scaler::StandardScaler;
use super::validator::validate;
use super::PredictorInfo;

/// A thread-safe churn predictor: validation, encoding, scaling and inference over
/// trained artifacts loaded once.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync`: the contract and label encoders sit
/// behind `Arc`, and `ChurnModel` requires `Send + Sync`. Nothing is mutated after
/// build, so concurrent predictions need no locking.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use churnlens::{ChurnPredictor, RawInput};
///
/// let predictor = ChurnPredictor::builder()
///     .with_artifact_dir("artifacts")?
///     .build()?;
///
/// let input: RawInput = serde_json::from_str(&std::fs::read_to_string("customer.json")?)?;
/// let result = predictor.predict(&input)?;
/// println!("{} ({})", result.label, result.probability_percent());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChurnPredictor {
    pub(crate) artifact_paths: Option<ArtifactPaths>,
    pub(crate) contract: Arc<TrainedFeatureContract>,
    pub(crate) encoder: FeatureEncoder,
    pub(crate) scaler: StandardScaler,
    pub(crate) model: Arc<dyn ChurnModel>,
    pub(crate) label_encoders: Arc<LabelEncoders>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ChurnPredictor>();
    }
};

impl ChurnPredictor {
    /// Creates a new PredictorBuilder for fluent construction
    pub fn builder() -> super::builder::PredictorBuilder {
        super::builder::PredictorBuilder::new()
    }

    /// Returns information about the predictor and the artifacts it was built from
    pub fn info(&self) -> PredictorInfo {
        let paths = self.artifact_paths.as_ref();
        PredictorInfo {
            model_path: paths.map(|p| p.model.to_string_lossy().to_string()),
            scaler_path: paths.map(|p| p.scaler.to_string_lossy().to_string()),
            label_encoders_path: paths.map(|p| p.label_encoders.to_string_lossy().to_string()),
            num_features: self.contract.len(),
            model_description: self.model.describe(),
            num_label_encoders: self.label_encoders.len(),
        }
    }

    pub fn contract(&self) -> &TrainedFeatureContract {
        &self.contract
    }

    pub fn label_encoders(&self) -> &LabelEncoders {
        &self.label_encoders
    }

    /// Validates and encodes an input into contract order, without scaling.
    pub fn encode(&self, input: &RawInput) -> Result<Array1<f64>, PipelineError> {
        let validated = validate(input)?;
        self.encoder.encode(&validated).map_err(|e| {
            error!("Failed to encode input {:?}: {}", input, e);
            e
        })
    }

    /// Validates, encodes and standardizes an input into the vector the model scores.
    pub fn prepare(&self, input: &RawInput) -> Result<Array1<f64>, PipelineError> {
        let encoded = self.encode(input)?;
        self.scaler.transform(&encoded)
    }

    /// Predicts whether a customer will churn.
    ///
    /// # Errors
    /// - `ValidationError` if the input is incomplete or out of domain; nothing is encoded
    /// - `EncodingError` if the validated input cannot be expanded into columns
    /// - `DimensionMismatch` if the encoded width differs from the fitted scaler
    /// - `InferenceError` if the classifier fails or returns an unusable output
    pub fn predict(&self, input: &RawInput) -> Result<PredictionResult, PipelineError> {
        let scaled = self.prepare(input)?;
        let output = self.model.predict(&scaled)?;
        let result = PredictionResult::from_model_output(output)?;
        debug!("Predicted {} with churn probability {:.4}", result.label, result.probability);
        Ok(result)
    }

    /// Predicts and packages the result with its input as an exportable row.
    pub fn predict_record(&self, input: &RawInput) -> Result<PredictionRecord, PipelineError> {
        let result = self.predict(input)?;
        Ok(PredictionRecord::new(input, &result))
    }

    /// Predicts each input independently; one failure does not affect the others.
    pub fn predict_batch(&self, inputs: &[RawInput]) -> Vec<Result<PredictionResult, PipelineError>> {
        inputs.iter().map(|input| self.predict(input)).collect()
    }
}
