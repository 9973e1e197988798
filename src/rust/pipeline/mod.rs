mod error;
mod validator;
mod encoder;
mod scaler;
mod model;
mod result;
mod predictor;
pub mod builder;

pub use error::PipelineError;
pub use validator::{validate, ValidatedInput};
pub use encoder::{EncodedFrame, FeatureEncoder};
pub use scaler::StandardScaler;
pub use model::{ChurnLabel, ChurnModel, ModelOutput, OnnxChurnModel};
pub use result::{write_records, PredictionRecord, PredictionResult};
pub use predictor::ChurnPredictor;
pub use builder::PredictorBuilder;

/// Information about a built predictor and the artifacts behind it
#[derive(Debug, Clone)]
pub struct PredictorInfo {
    /// Path to the classifier artifact, when loaded from disk
    pub model_path: Option<String>,
    /// Path to the scaler artifact, when loaded from disk
    pub scaler_path: Option<String>,
    /// Path to the label encoder artifact, when loaded from disk
    pub label_encoders_path: Option<String>,
    /// Number of columns in the trained feature contract
    pub num_features: usize,
    /// Short description of the classifier
    pub model_description: String,
    /// Number of attributes the label encoders cover
    pub num_label_encoders: usize,
}
