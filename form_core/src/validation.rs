//! # Value Validation
//!
//! Concept-driven checks run by leaf controls whenever their value changes.
//! Results are [`ValidationError`]s, never `Err`: the caller decides whether
//! to block submission.
//!
//! | Check          | Source                               | Kind    |
//! |----------------|--------------------------------------|---------|
//! | `mandatory`    | `properties.mandatory` + empty value | Error   |
//! | `allowDecimal` | `concept.allowDecimal == false`      | Error   |
//! | `minMaxRange`  | `lowAbsolute` / `hiAbsolute`         | Error   |
//! | `abnormal`     | `lowNormal` / `hiNormal`             | Warning |

use crate::errors::ValidationError;
use crate::metadata::{Concept, ControlMetadata};
use crate::obs::Obs;

pub const MANDATORY: &str = "mandatory";
pub const ALLOW_DECIMAL: &str = "allowDecimal";
pub const MIN_MAX_RANGE: &str = "minMaxRange";
pub const ABNORMAL: &str = "abnormal";

/// Run every applicable check for `obs` as produced by `metadata`'s control.
pub fn validate(metadata: &ControlMetadata, obs: &Obs) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if obs.voided || obs.value.is_none() {
        if metadata.is_mandatory() {
            errors.push(ValidationError::error(MANDATORY));
        }
        return errors;
    }

    let Some(concept) = metadata.concept.as_ref() else {
        return errors;
    };
    if !concept.is_numeric() {
        return errors;
    }
    let Some(number) = obs.numeric_value() else {
        return errors;
    };

    if concept.allow_decimal == Some(false) && number.fract() != 0.0 {
        errors.push(ValidationError::error(ALLOW_DECIMAL));
    }
    if outside(number, concept.low_absolute, concept.hi_absolute) {
        errors.push(ValidationError::error(MIN_MAX_RANGE));
    } else if is_outside_normal(concept, number) {
        errors.push(ValidationError::warning(ABNORMAL));
    }

    errors
}

/// True when `number` falls outside the concept's normal range.
pub fn is_outside_normal(concept: &Concept, number: f64) -> bool {
    outside(number, concept.low_normal, concept.hi_normal)
}

fn outside(number: f64, low: Option<f64>, high: Option<f64>) -> bool {
    low.is_some_and(|l| number < l) || high.is_some_and(|h| number > h)
}
