use std::collections::HashMap;
use std::sync::Arc;
use ndarray::Array1;
use log::debug;

use crate::contract::TrainedFeatureContract;
use crate::input::RawValue;
use crate::schema::{one_hot_column, AttributeSchema, AttributeSpec, Encoding};
use super::error::PipelineError;
use super::validator::ValidatedInput;

/// Columns built from one input, in construction order, before alignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedFrame {
    columns: Vec<(String, f64)>,
}

impl EncodedFrame {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns.iter().find(|(name, _)| name == column).map(|(_, value)| *value)
    }

    /// Values in construction order. Not aligned to any contract.
    pub fn values(&self) -> Vec<f64> {
        self.columns.iter().map(|(_, value)| *value).collect()
    }

    fn push(&mut self, column: String, value: f64) {
        self.columns.push((column, value));
    }

    /// Reindexes the frame against `contract`.
    ///
    /// Contract columns the frame lacks become 0.0, frame columns the contract lacks
    /// are dropped, and the result follows contract order.
    pub fn align(&self, contract: &TrainedFeatureContract) -> Array1<f64> {
        let built: HashMap<&str, f64> = self.columns.iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();

        let aligned: Array1<f64> = contract.columns().iter()
            .map(|column| built.get(column.as_str()).copied().unwrap_or(0.0))
            .collect();

        if log::log_enabled!(log::Level::Debug) {
            let dropped: Vec<&str> = self.columns().filter(|c| !contract.contains(c)).collect();
            let filled = contract.columns().iter().filter(|c| !built.contains_key(c.as_str())).count();
            if !dropped.is_empty() {
                debug!("Dropped {} column(s) outside the contract: {:?}", dropped.len(), dropped);
            }
            debug!("Aligned {} built columns to {} contract columns ({} zero-filled)",
                self.len(), contract.len(), filled);
        }

        aligned
    }
}

/// Reproduces the training-time feature engineering for a single customer.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    contract: Arc<TrainedFeatureContract>,
}

impl FeatureEncoder {
    pub fn new(contract: Arc<TrainedFeatureContract>) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &TrainedFeatureContract {
        &self.contract
    }

    /// Builds the unaligned columns for a validated input.
    ///
    /// Pass-through and binary columns come first in schema order, followed by one
    /// indicator column per categorical attribute, in the order the categorical
    /// columns were expanded at training time. Only the observed value's indicator is
    /// emitted; its siblings are left to alignment.
    ///
    /// # Errors
    /// `EncodingError` if a value has the wrong shape for its encoding, or a binary
    /// attribute holds something other than `Yes`/`No`.
    pub fn build_frame(input: &ValidatedInput<'_>) -> Result<EncodedFrame, PipelineError> {
        let schema = AttributeSchema::global();
        let mut frame = EncodedFrame::default();

        for spec in schema.attributes().iter().filter(|s| s.encoding != Encoding::OneHot) {
            let value = match spec.encoding {
                Encoding::Binary => binary_value(spec, required(input, spec)?)?,
                _ => required(input, spec)?.as_f64().ok_or_else(|| {
                    PipelineError::EncodingError(format!("{} is not numeric", spec.name()))
                })?,
            };
            frame.push(spec.name().to_string(), value);
        }

        for spec in schema.attributes().iter().filter(|s| s.encoding == Encoding::OneHot) {
            let value = required(input, spec)?.as_str().ok_or_else(|| {
                PipelineError::EncodingError(format!("{} is not categorical text", spec.name()))
            })?;
            frame.push(one_hot_column(spec.attribute, value), 1.0);
        }

        Ok(frame)
    }

    /// Encodes a validated input into the vector the scaler expects, in contract order.
    pub fn encode(&self, input: &ValidatedInput<'_>) -> Result<Array1<f64>, PipelineError> {
        let frame = Self::build_frame(input)?;
        Ok(frame.align(&self.contract))
    }
}

fn required<'a>(input: &ValidatedInput<'a>, spec: &AttributeSpec) -> Result<&'a RawValue, PipelineError> {
    input.value(spec.attribute)
        .ok_or_else(|| PipelineError::EncodingError(format!("{} disappeared after validation", spec.name())))
}

fn binary_value(spec: &AttributeSpec, value: &RawValue) -> Result<f64, PipelineError> {
    match value.as_str() {
        Some("Yes") => Ok(1.0),
        Some("No") => Ok(0.0),
        _ => Err(PipelineError::EncodingError(
            format!("{} has no binary mapping for '{}'", spec.name(), value)
        )),
    }
}
