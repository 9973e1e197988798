use crate::input::{RawInput, RawValue};
use crate::schema::{Attribute, AttributeDomain, AttributeSchema};
use super::error::PipelineError;

/// A raw input that passed validation.
///
/// Only `validate` constructs it, so holding one proves every schema attribute is
/// present, numeric values are in bounds and categorical values are enumerated.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedInput<'a> {
    raw: &'a RawInput,
}

impl<'a> ValidatedInput<'a> {
    pub fn raw(&self) -> &'a RawInput {
        self.raw
    }

    pub(crate) fn value(&self, attribute: Attribute) -> Option<&'a RawValue> {
        self.raw.get(attribute.name())
    }
}

/// Validates a raw input against the attribute schema.
///
/// Checks run in this order and stop at the first failure:
/// 1. every schema attribute is present and not null
/// 2. numeric attributes are finite numbers within their inclusive bounds
/// 3. categorical attributes are text values from their enumeration
///
/// Keys the schema does not declare are ignored.
///
/// # Errors
/// `ValidationError` with a message naming the offending field, e.g.
/// `missing field: Payment_Method`.
pub fn validate(raw: &RawInput) -> Result<ValidatedInput<'_>, PipelineError> {
    let schema = AttributeSchema::global();

    if let Some(spec) = schema.attributes().iter().find(|s| !raw.contains(s.name())) {
        return Err(PipelineError::ValidationError(format!("missing field: {}", spec.name())));
    }

    for spec in schema.numeric() {
        let AttributeDomain::Numeric { min, max, .. } = spec.domain else {
            continue;
        };
        let value = match raw.get(spec.name()) {
            Some(RawValue::Number(value)) => *value,
            Some(RawValue::Text(text)) => {
                return Err(PipelineError::ValidationError(
                    format!("{} must be a number, got '{}'", spec.name(), text)
                ));
            }
            None => return Err(PipelineError::ValidationError(format!("missing field: {}", spec.name()))),
        };
        if !value.is_finite() {
            return Err(PipelineError::ValidationError(format!("{} must be a finite number", spec.name())));
        }
        if value < min || value > max {
            return Err(PipelineError::ValidationError(
                format!("{} must be between {} and {}, got {}", spec.name(), min, max, value)
            ));
        }
    }

    for spec in schema.categorical() {
        match raw.get(spec.name()) {
            Some(RawValue::Text(text)) if spec.domain.contains_option(text) => {}
            Some(RawValue::Text(text)) => {
                return Err(PipelineError::ValidationError(
                    format!("{} has no option '{}'", spec.name(), text)
                ));
            }
            Some(RawValue::Number(value)) => {
                return Err(PipelineError::ValidationError(
                    format!("{} expects one of its options, got the number {}", spec.name(), value)
                ));
            }
            None => return Err(PipelineError::ValidationError(format!("missing field: {}", spec.name()))),
        }
    }

    Ok(ValidatedInput { raw })
}
