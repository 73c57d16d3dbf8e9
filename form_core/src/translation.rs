//! Translation keys for designer-authored text.

/// Builds `VALUE_IN_CAPS_<id>` keys.
///
/// ```rust
/// use form_core::translation::TranslationKeyGenerator;
///
/// assert_eq!(TranslationKeyGenerator::new("Pulse Data", "3").build(), "PULSE_DATA_3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationKeyGenerator {
    value: String,
    id: String,
}

impl TranslationKeyGenerator {
    pub fn new(value: impl Into<String>, id: impl Into<String>) -> Self {
        TranslationKeyGenerator {
            value: value.into(),
            id: id.into(),
        }
    }

    /// Uppercase, every space replaced by `_`, then `_<id>`.
    pub fn build(&self) -> String {
        format!("{}_{}", self.value.to_uppercase().replace(' ', "_"), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_space_becomes_underscore() {
        assert_eq!(TranslationKeyGenerator::new("heart  rate", "12").build(), "HEART__RATE_12");
    }

    #[test]
    fn test_default_id() {
        assert_eq!(TranslationKeyGenerator::new("Label", "0").build(), "LABEL_0");
    }
}
