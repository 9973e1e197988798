use std::path::Path;
use std::sync::Arc;
use log::{info, warn};

use crate::artifacts::{ArtifactPaths, ArtifactStore};
use crate::contract::{LabelEncoders, TrainedFeatureContract};
use crate::runtime::RuntimeConfig;
use crate::schema::AttributeSchema;
use super::encoder::FeatureEncoder;
use super::error::PipelineError;
use super::model::{ChurnModel, OnnxChurnModel};
use super::predictor::ChurnPredictor;
use super::scaler::StandardScaler;

/// A builder for constructing a ChurnPredictor with a fluent interface.
///
/// All three trained artifacts are required: the classifier, the scaler-derived
/// feature contract and the label encoders. `build` refuses to produce a predictor
/// with any of them missing.
#[derive(Default, Debug)]
pub struct PredictorBuilder {
    artifact_paths: Option<ArtifactPaths>,
    contract: Option<TrainedFeatureContract>,
    label_encoders: Option<LabelEncoders>,
    model: Option<Arc<dyn ChurnModel>>,
    runtime_config: RuntimeConfig,
}

impl PredictorBuilder {
    /// Creates a new empty PredictorBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use churnlens::PredictorBuilder;
    ///
    /// let builder = PredictorBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            artifact_paths: None,
            contract: None,
            label_encoders: None,
            model: None,
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration used when loading an ONNX classifier.
    /// Must be called before `with_artifacts` to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Loads all three artifacts from a store.
    ///
    /// # Returns
    /// * `Result<Self, PipelineError>` - The builder instance if successful, or an error if:
    ///   - Artifacts were already set
    ///   - Any artifact file is missing (`ArtifactError::NotFound` names it)
    ///   - The scaler or label encoders cannot be parsed
    ///   - The scaler carries no feature names
    ///   - The classifier fails to load or has an unexpected structure
    pub fn with_artifacts(mut self, store: &ArtifactStore) -> Result<Self, PipelineError> {
        if self.contract.is_some() || self.model.is_some() || self.label_encoders.is_some() {
            return Err(PipelineError::BuildError("Artifacts already set".to_string()));
        }

        let paths = store.ensure_complete()?;
        info!("Loading artifacts from {:?}", store.artifacts_dir());

        let contract = store.load_contract()?;
        info!("Feature contract loaded: {} columns", contract.len());

        let label_encoders = store.load_label_encoders()?;
        info!("Label encoders loaded for {} attributes", label_encoders.len());

        let model = OnnxChurnModel::from_file(&paths.model, &self.runtime_config)?;
        info!("Classifier loaded from {:?}", paths.model);

        self.contract = Some(contract);
        self.label_encoders = Some(label_encoders);
        self.model = Some(Arc::new(model));
        self.artifact_paths = Some(paths);
        Ok(self)
    }

    /// Loads all three artifacts from a directory.
    pub fn with_artifact_dir(self, dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let store = ArtifactStore::new(dir);
        self.with_artifacts(&store)
    }

    pub fn with_contract(mut self, contract: TrainedFeatureContract) -> Result<Self, PipelineError> {
        if self.contract.is_some() {
            return Err(PipelineError::BuildError("Feature contract already set".to_string()));
        }
        self.contract = Some(contract);
        Ok(self)
    }

    pub fn with_label_encoders(mut self, label_encoders: LabelEncoders) -> Result<Self, PipelineError> {
        if self.label_encoders.is_some() {
            return Err(PipelineError::BuildError("Label encoders already set".to_string()));
        }
        self.label_encoders = Some(label_encoders);
        Ok(self)
    }

    /// Sets the classifier directly, e.g. one not backed by an ONNX file.
    pub fn with_model(mut self, model: impl ChurnModel + 'static) -> Result<Self, PipelineError> {
        if self.model.is_some() {
            return Err(PipelineError::BuildError("Model already set".to_string()));
        }
        self.model = Some(Arc::new(model));
        Ok(self)
    }

    /// Builds and returns the final ChurnPredictor instance
    ///
    /// Drift between the schema and the trained artifacts is logged as warnings:
    /// contract columns no valid input can produce, and label encoder classes that
    /// disagree with the schema's enumerations.
    ///
    /// # Returns
    /// * `Result<ChurnPredictor, PipelineError>` - The constructed predictor if successful,
    ///   or a `BuildError` naming the first missing artifact
    pub fn build(self) -> Result<ChurnPredictor, PipelineError> {
        let contract = self.contract
            .ok_or_else(|| PipelineError::BuildError("Feature contract must be set".to_string()))?;
        let model = self.model
            .ok_or_else(|| PipelineError::BuildError("Model must be set".to_string()))?;
        let label_encoders = self.label_encoders
            .ok_or_else(|| PipelineError::BuildError("Label encoders must be set".to_string()))?;

        let schema = AttributeSchema::global();
        let unreachable = contract.unreachable_columns(schema);
        if !unreachable.is_empty() {
            warn!("{} contract column(s) can never be produced and will always be 0.0: {:?}",
                unreachable.len(), unreachable);
        }
        for mismatch in label_encoders.cross_check(schema) {
            warn!("Label encoder mismatch: {}", mismatch);
        }

        let contract = Arc::new(contract);
        info!("Predictor ready: {} features, {}", contract.len(), model.describe());

        Ok(ChurnPredictor {
            artifact_paths: self.artifact_paths,
            encoder: FeatureEncoder::new(Arc::clone(&contract)),
            scaler: StandardScaler::new(Arc::clone(&contract)),
            contract,
            model,
            label_encoders: Arc::new(label_encoders),
        })
    }
}
