//! # Form Settings
//!
//! Engine-wide defaults, loaded from a JSON file with
//! [`crate::file_io::load_settings`]. Every field has a default, so a partial
//! file (or `{}`) is a valid settings file.
//!
//! ```json
//! { "rowWidth": 4, "minRows": 2, "locale": "en" }
//! ```

use serde::{Deserialize, Serialize};

/// Number of columns in a designer grid row.
pub const DEFAULT_ROW_WIDTH: usize = 4;

/// Rows a top-level designer grid shows even when empty.
pub const DEFAULT_MIN_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSettings {
    /// Columns per grid row
    pub row_width: usize,

    /// Minimum rows of a top-level grid
    pub min_rows: usize,

    /// Locale tag handed to the presentation layer as is
    pub locale: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        FormSettings {
            row_width: DEFAULT_ROW_WIDTH,
            min_rows: DEFAULT_MIN_ROWS,
            locale: "en".to_string(),
        }
    }
}

impl FormSettings {
    /// Row width, never zero.
    pub fn columns(&self) -> usize {
        self.row_width.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fall_back_to_defaults() {
        let settings: FormSettings = serde_json::from_str(r#"{"rowWidth": 6}"#).unwrap();
        assert_eq!(settings.row_width, 6);
        assert_eq!(settings.min_rows, DEFAULT_MIN_ROWS);
        assert_eq!(settings.locale, "en");
    }

    #[test]
    fn test_zero_width_is_clamped() {
        let settings = FormSettings {
            row_width: 0,
            ..Default::default()
        };
        assert_eq!(settings.columns(), 1);
    }
}
