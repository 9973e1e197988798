#![allow(dead_code)]

use std::collections::HashMap;
use churnlens::{
    AttributeSchema, ChurnLabel, ChurnModel, ChurnPredictor, LabelEncoders, ModelOutput,
    PipelineError, RawInput, TrainedFeatureContract,
};
use env_logger::{Builder, Env};
use ndarray::Array1;

// Initialize test logger
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

/// A logistic model over named contract columns, standing in for the ONNX classifier.
#[derive(Debug)]
pub struct WeightedModel {
    bias: f64,
    weights: Vec<(usize, f64)>,
}

impl WeightedModel {
    pub fn new(contract: &TrainedFeatureContract, bias: f64, weights: &[(&str, f64)]) -> Self {
        let weights = weights.iter()
            .filter_map(|(column, weight)| contract.position(column).map(|i| (i, *weight)))
            .collect();
        Self { bias, weights }
    }

    /// Month-to-month contracts push towards churn, two-year contracts away from it.
    pub fn contract_sensitive(contract: &TrainedFeatureContract) -> Self {
        Self::new(contract, 0.0, &[
            ("Contract_Month-to-month", 1.2),
            ("Contract_One_year", -0.4),
            ("Contract_Two_year", -1.5),
        ])
    }
}

impl ChurnModel for WeightedModel {
    fn predict(&self, features: &Array1<f64>) -> Result<ModelOutput, PipelineError> {
        let logit = self.bias + self.weights.iter().map(|&(i, w)| w * features[i]).sum::<f64>();
        let p = 1.0 / (1.0 + (-logit).exp());
        let label = if p >= 0.5 { ChurnLabel::Churn } else { ChurnLabel::NoChurn };
        Ok(ModelOutput {
            label,
            probabilities: [(1.0 - p) as f32, p as f32],
        })
    }

    fn describe(&self) -> String {
        format!("weighted test model over {} columns", self.weights.len())
    }
}

/// A contract over every column the encoder can produce, with identity statistics.
pub fn identity_contract() -> TrainedFeatureContract {
    let columns = AttributeSchema::global().expanded_columns();
    let n = columns.len();
    TrainedFeatureContract::new(columns, vec![0.0; n], vec![1.0; n]).unwrap()
}

pub fn predictor() -> ChurnPredictor {
    let contract = identity_contract();
    let model = WeightedModel::contract_sensitive(&contract);
    ChurnPredictor::builder()
        .with_contract(contract).unwrap()
        .with_model(model).unwrap()
        .with_label_encoders(LabelEncoders::default()).unwrap()
        .build()
        .unwrap()
}

pub fn customer(contract: &str) -> RawInput {
    RawInput::new()
        .with("City", "Antioch")
        .with("Gender", "Male")
        .with("Senior_Citizen", "No")
        .with("Partner", "Yes")
        .with("Dependents", "No")
        .with("Tenure", 12)
        .with("Phone_Service", "Yes")
        .with("Multiple_Lines", "No")
        .with("Internet_Service", "DSL")
        .with("Online_Security", "Yes")
        .with("Online_Backup", "No")
        .with("Device_Protection", "No")
        .with("Tech_Support", "No")
        .with("Streaming_TV", "No")
        .with("Streaming_Movies", "No")
        .with("Contract", contract)
        .with("Paperless_Billing", "No")
        .with("Payment_Method", "Mailed_check")
        .with("Monthly_Charges", 54.3)
        .with("Total_Charges", 651.6)
}

/// Encoded values keyed by column name.
pub fn encoded_by_column(contract: &TrainedFeatureContract, encoded: &Array1<f64>) -> HashMap<String, f64> {
    contract.columns().iter().cloned().zip(encoded.iter().copied()).collect()
}
