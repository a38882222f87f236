//! Display strings for poker hands.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the `<n>s` suffix (`"5s"`, `"3s5s"`).
pub const PLACEHOLDER: &str = "%s";

/// The description template for every poker outcome.
///
/// Field names double as the JSON keys of the on-disk config file. Missing
/// keys fall back to their default individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandTemplates {
    pub five_of_a_kind: String,
    pub four_of_a_kind: String,
    pub full_house: String,
    pub high_straight: String,
    pub low_straight: String,
    pub three_of_a_kind: String,
    pub two_pair: String,
    pub one_pair: String,
    pub nothing: String,
}

impl Default for HandTemplates {
    fn default() -> Self {
        Self {
            five_of_a_kind: "Five of a kind: %s".into(),
            four_of_a_kind: "Four of a kind: %s".into(),
            full_house: "Full House: %s".into(),
            high_straight: "High Str8".into(),
            low_straight: "Low Str8".into(),
            three_of_a_kind: "Three of a kind: %s".into(),
            two_pair: "Two Pair: %s".into(),
            one_pair: "One Pair: %s".into(),
            nothing: "Nothing".into(),
        }
    }
}

/// Substitutes the first placeholder in `template` with `suffix`.
///
/// Templates without a placeholder are returned as-is.
pub(crate) fn render(template: &str, suffix: &str) -> String {
    template.replacen(PLACEHOLDER, suffix, 1)
}

/// `5` → `"5s"`.
pub(crate) fn kind_suffix(value: u8) -> String {
    format!("{value}s")
}
