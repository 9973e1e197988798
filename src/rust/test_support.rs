use crate::contract::TrainedFeatureContract;
use crate::input::RawInput;
use crate::schema::{AttributeDomain, AttributeSchema, Encoding};

/// A month-to-month fiber customer, complete and valid.
pub(crate) fn sample_customer() -> RawInput {
    RawInput::new()
        .with("City", "Alameda")
        .with("Gender", "Female")
        .with("Senior_Citizen", "No")
        .with("Partner", "Yes")
        .with("Dependents", "No")
        .with("Tenure", 2)
        .with("Phone_Service", "Yes")
        .with("Multiple_Lines", "No")
        .with("Internet_Service", "Fiber_optic")
        .with("Online_Security", "No")
        .with("Online_Backup", "No")
        .with("Device_Protection", "No")
        .with("Tech_Support", "No")
        .with("Streaming_TV", "Yes")
        .with("Streaming_Movies", "Yes")
        .with("Contract", "Month-to-month")
        .with("Paperless_Billing", "Yes")
        .with("Payment_Method", "Electronic_check")
        .with("Monthly_Charges", 99.65)
        .with("Total_Charges", 199.3)
}

/// A contract over every producible column, with one-hot statistics of a uniform
/// category distribution.
pub(crate) fn training_contract() -> TrainedFeatureContract {
    let schema = AttributeSchema::global();
    let mut columns = Vec::new();
    let mut mean = Vec::new();
    let mut scale = Vec::new();

    for spec in schema.attributes() {
        match (&spec.encoding, &spec.domain) {
            (Encoding::OneHot, AttributeDomain::Categorical { options }) => {
                let p = 1.0 / options.len() as f64;
                for option in options.iter() {
                    columns.push(format!("{}_{}", spec.name(), option));
                    mean.push(p);
                    scale.push((p * (1.0 - p)).sqrt());
                }
            }
            (Encoding::Binary, _) => {
                columns.push(spec.name().to_string());
                mean.push(0.9);
                scale.push(0.3);
            }
            (_, AttributeDomain::Numeric { max, .. }) => {
                columns.push(spec.name().to_string());
                mean.push(max / 2.0);
                scale.push(max / 4.0);
            }
            _ => {}
        }
    }

    TrainedFeatureContract::new(columns, mean, scale).expect("valid test contract")
}
