use std::sync::Arc;
use ndarray::Array1;

use crate::contract::TrainedFeatureContract;
use super::error::PipelineError;

/// Applies the training-time standardization, `(x - mean) / scale` per column.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    contract: Arc<TrainedFeatureContract>,
}

impl StandardScaler {
    pub fn new(contract: Arc<TrainedFeatureContract>) -> Self {
        Self { contract }
    }

    /// Number of columns the scaler was fit on
    pub fn n_features(&self) -> usize {
        self.contract.len()
    }

    /// Standardizes an encoded vector.
    ///
    /// # Errors
    /// `DimensionMismatch` when `features` is not exactly as wide as the fitted
    /// columns. The vector is never padded or truncated.
    pub fn transform(&self, features: &Array1<f64>) -> Result<Array1<f64>, PipelineError> {
        if features.len() != self.n_features() {
            return Err(PipelineError::DimensionMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }
        Ok((features - self.contract.mean()) / self.contract.scale())
    }
}
