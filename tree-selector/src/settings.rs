use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::sort::SortMode;

const DEFAULT_ROW_HEIGHT: f32 = 20.0;

/// Tunables for a [`crate::Selector`].
///
/// Deserialization fills missing fields with defaults, so hosts can persist
/// only what the user changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    row_height: f32,
    sort_mode: SortMode,
    case_sensitive: bool,
    expand_matches: bool,
    initial_filter: String,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            sort_mode: SortMode::default(),
            case_sensitive: false,
            expand_matches: true,
            initial_filter: String::new(),
        }
    }
}

impl SelectorSettings {
    /// Height of one row, used to turn jump targets into scroll offsets.
    pub fn with_row_height(mut self, row_height: f32) -> Self {
        self.row_height = sanitize_row_height(row_height);
        self
    }

    pub fn with_sort_mode(mut self, sort_mode: SortMode) -> Self {
        self.sort_mode = sort_mode;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Show matching subtrees open while a filter is active.
    pub fn with_expand_matches(mut self, expand_matches: bool) -> Self {
        self.expand_matches = expand_matches;
        self
    }

    pub fn with_initial_filter(mut self, filter: impl Into<String>) -> Self {
        self.initial_filter = filter.into();
        self
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn expand_matches(&self) -> bool {
        self.expand_matches
    }

    pub fn initial_filter(&self) -> &str {
        &self.initial_filter
    }

    /// Parse settings from JSON, falling back to defaults for missing or
    /// out-of-range values.
    pub fn from_json(input: &str) -> Result<Self, SettingsError> {
        let mut settings: SelectorSettings = serde_json::from_str(input)?;
        settings.row_height = sanitize_row_height(settings.row_height);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn sanitize_row_height(row_height: f32) -> f32 {
    if row_height.is_finite() && row_height > 0.0 {
        row_height
    } else {
        log::warn!("invalid row height {row_height}, using {DEFAULT_ROW_HEIGHT}");
        DEFAULT_ROW_HEIGHT
    }
}
