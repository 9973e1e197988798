use std::io;
use serde::Serialize;

use crate::input::RawInput;
use crate::schema::AttributeSchema;
use super::error::PipelineError;
use super::model::{ChurnLabel, ModelOutput};

/// The label and churn probability for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: ChurnLabel,
    /// Probability mass on the churn class, in [0, 1]
    pub probability: f64,
}

impl PredictionResult {
    /// Takes the churn-class probability from a model output.
    ///
    /// # Errors
    /// `InferenceError` if the probability is not a finite value in [0, 1].
    pub fn from_model_output(output: ModelOutput) -> Result<Self, PipelineError> {
        let probability = f64::from(output.probabilities[1]);
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(PipelineError::InferenceError(
                format!("Churn probability {} is outside [0, 1]", probability)
            ));
        }
        Ok(Self { label: output.label, probability })
    }

    pub fn is_churn(&self) -> bool {
        self.label == ChurnLabel::Churn
    }

    /// Probability as a percentage with two decimals, e.g. `83.27%`.
    pub fn probability_percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// A flat, exportable row: the raw input followed by `Prediction` and `Probability`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    fields: Vec<(String, String)>,
}

impl PredictionRecord {
    /// Builds the row. Schema attributes come first in form order, then any other keys
    /// the input carried in name order. Missing or null values export as empty cells.
    pub fn new(input: &RawInput, result: &PredictionResult) -> Self {
        let schema = AttributeSchema::global();
        let cell = |name: &str| input.get(name).map(|v| v.to_string()).unwrap_or_default();

        let mut fields: Vec<(String, String)> = schema.form_order()
            .map(|spec| (spec.name().to_string(), cell(spec.name())))
            .collect();
        fields.extend(
            input.keys()
                .filter(|k| schema.get(k).is_none())
                .map(|k| (k.to_string(), cell(k)))
        );
        fields.push(("Prediction".to_string(), result.label.to_string()));
        fields.push(("Probability".to_string(), result.probability_percent()));

        Self { fields }
    }

    pub fn headers(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn values(&self) -> Vec<&str> {
        self.fields.iter().map(|(_, value)| value.as_str()).collect()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.iter().find(|(name, _)| name == column).map(|(_, value)| value.as_str())
    }

    /// The record as a CSV document with a header line.
    pub fn to_csv(&self) -> Result<Vec<u8>, PipelineError> {
        let mut buffer = Vec::new();
        write_records(std::slice::from_ref(self), &mut buffer)?;
        Ok(buffer)
    }
}

/// Writes records as CSV, taking the header from the first record.
///
/// # Errors
/// `ExportError` if the records do not share the same columns or the writer fails.
pub fn write_records<W: io::Write>(records: &[PredictionRecord], writer: W) -> Result<(), PipelineError> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let headers = first.headers();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&headers)?;
    for record in records {
        if record.headers() != headers {
            return Err(PipelineError::ExportError("Records do not share the same columns".into()));
        }
        csv_writer.write_record(record.values())?;
    }
    csv_writer.flush().map_err(|e| PipelineError::ExportError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_customer;

    fn churn(probability: f32) -> PredictionResult {
        PredictionResult::from_model_output(ModelOutput {
            label: ChurnLabel::Churn,
            probabilities: [1.0 - probability, probability],
        }).unwrap()
    }

    #[test]
    fn test_probability_bounds() {
        for probability in [-0.01f32, 1.01, f32::NAN] {
            let result = PredictionResult::from_model_output(ModelOutput {
                label: ChurnLabel::NoChurn,
                probabilities: [0.5, probability],
            });
            assert!(matches!(result, Err(PipelineError::InferenceError(_))));
        }
        assert!(churn(0.0).probability == 0.0);
        assert!(churn(1.0).is_churn());
    }

    #[test]
    fn test_probability_percent() {
        let result = PredictionResult { label: ChurnLabel::Churn, probability: 0.83271 };
        assert_eq!(result.probability_percent(), "83.27%");
    }

    #[test]
    fn test_record_layout() {
        let input = sample_customer().with("Customer_ID", "7590-VHVEG");
        let record = PredictionRecord::new(&input, &PredictionResult { label: ChurnLabel::Churn, probability: 0.5 });
        let headers = record.headers();

        assert_eq!(headers[0], "Gender");
        assert_eq!(headers[19], "City");
        assert_eq!(headers[20], "Customer_ID");
        assert_eq!(&headers[21..], &["Prediction", "Probability"]);
        assert_eq!(record.get("Tenure"), Some("2"));
        assert_eq!(record.get("Prediction"), Some("Churn"));
        assert_eq!(record.get("Probability"), Some("50.00%"));
    }

    #[test]
    fn test_csv_export() {
        let input = sample_customer().with("Payment_Method", "Bank_transfer_(automatic)");
        let record = PredictionRecord::new(&input, &PredictionResult { label: ChurnLabel::NoChurn, probability: 0.1234 });
        let csv = String::from_utf8(record.to_csv().unwrap()).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Gender,Senior_Citizen,Partner,Dependents,Tenure,"));
        assert!(lines[0].ends_with(",City,Prediction,Probability"));
        assert!(lines[1].ends_with(",Alameda,No Churn,12.34%"));
        assert!(lines[1].contains(",Bank_transfer_(automatic),"));
    }

    #[test]
    fn test_write_records_rejects_mixed_columns() {
        let result = PredictionResult { label: ChurnLabel::NoChurn, probability: 0.2 };
        let plain = PredictionRecord::new(&sample_customer(), &result);
        let extra = PredictionRecord::new(&sample_customer().with("Customer_ID", "1"), &result);

        let mut buffer = Vec::new();
        assert!(write_records(&[plain.clone(), plain.clone()], &mut buffer).is_ok());
        assert!(matches!(
            write_records(&[plain, extra], &mut Vec::new()),
            Err(PipelineError::ExportError(_))
        ));
    }
}
