//! A thread-safe churn prediction library: validates raw customer attributes, encodes
//! them into the exact feature layout a classifier was trained on, standardizes them and
//! runs the classifier through ONNX Runtime.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use churnlens::{ChurnPredictor, RawInput};
//!
//! let predictor = ChurnPredictor::builder()
//!     .with_artifact_dir("artifacts")?
//!     .build()?;
//!
//! let input = RawInput::new()
//!     .with("City", "Antioch")
//!     .with("Gender", "Male")
//!     .with("Senior_Citizen", "No")
//!     .with("Partner", "No")
//!     .with("Dependents", "No")
//!     .with("Tenure", 12)
//!     .with("Phone_Service", "Yes")
//!     .with("Multiple_Lines", "No")
//!     .with("Internet_Service", "DSL")
//!     .with("Online_Security", "Yes")
//!     .with("Online_Backup", "No")
//!     .with("Device_Protection", "No")
//!     .with("Tech_Support", "No")
//!     .with("Streaming_TV", "No")
//!     .with("Streaming_Movies", "No")
//!     .with("Contract", "One_year")
//!     .with("Paperless_Billing", "No")
//!     .with("Payment_Method", "Mailed_check")
//!     .with("Monthly_Charges", 54.3)
//!     .with("Total_Charges", 651.6);
//!
//! let result = predictor.predict(&input)?;
//! println!("{}: {:.1}%", result.label, result.probability * 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The predictor is immutable once built and can be shared across threads using `Arc`:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use churnlens::{ArtifactStore, ChurnPredictor, RawInput};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let predictor = Arc::new(ChurnPredictor::builder()
//!     .with_artifacts(&ArtifactStore::new_default())?
//!     .build()?);
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let predictor = Arc::clone(&predictor);
//!     handles.push(thread::spawn(move || {
//!         let input: RawInput = serde_json::from_str(r#"{"Tenure": 3}"#).unwrap();
//!         assert!(predictor.predict(&input).unwrap_err().is_validation());
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod schema;
pub mod input;
pub mod contract;
pub mod pipeline;
pub mod artifacts;
mod runtime;

#[cfg(test)]
mod test_support;

pub use schema::{Attribute, AttributeDomain, AttributeSchema, AttributeSpec, Encoding, Section};
pub use input::{RawInput, RawValue};
pub use contract::{LabelEncoders, ScalerArtifact, TrainedFeatureContract};
pub use pipeline::{
    ChurnLabel, ChurnModel, ChurnPredictor, ModelOutput, OnnxChurnModel, PipelineError,
    PredictionRecord, PredictionResult, PredictorBuilder, PredictorInfo, write_records,
};
pub use artifacts::{ArtifactError, ArtifactPaths, ArtifactStore};
pub use runtime::{RuntimeConfig, create_session_builder};

pub fn init_logger() {
    env_logger::init();
}
