//! B-roll style catalogue.
//!
//! The style is chosen client-side and forwarded to the processor without
//! server-side validation; this catalogue only feeds the selector.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// B-roll footage categories offered to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrollStyle {
    /// No B-roll overlay (empty selector value)
    #[default]
    #[serde(rename = "")]
    None,
    Nature,
    City,
    People,
    Office,
    Technology,
    Food,
    Abstract,
}

impl BrollStyle {
    pub const ALL: &'static [BrollStyle] = &[
        BrollStyle::None,
        BrollStyle::Nature,
        BrollStyle::City,
        BrollStyle::People,
        BrollStyle::Office,
        BrollStyle::Technology,
        BrollStyle::Food,
        BrollStyle::Abstract,
    ];

    /// Value sent in the `broll` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            BrollStyle::None => "",
            BrollStyle::Nature => "nature",
            BrollStyle::City => "city",
            BrollStyle::People => "people",
            BrollStyle::Office => "office",
            BrollStyle::Technology => "technology",
            BrollStyle::Food => "food",
            BrollStyle::Abstract => "abstract",
        }
    }

    /// Human-readable label for selectors.
    pub fn label(&self) -> &'static str {
        match self {
            BrollStyle::None => "No B-roll",
            BrollStyle::Nature => "Nature & Landscapes",
            BrollStyle::City => "Urban & City",
            BrollStyle::People => "People & Lifestyle",
            BrollStyle::Office => "Business & Work",
            BrollStyle::Technology => "Technology",
            BrollStyle::Food => "Food & Cuisine",
            BrollStyle::Abstract => "Abstract Concepts",
        }
    }
}

impl fmt::Display for BrollStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BrollStyle {
    type Err = BrollStyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Ok(BrollStyle::None),
            "nature" => Ok(BrollStyle::Nature),
            "city" => Ok(BrollStyle::City),
            "people" => Ok(BrollStyle::People),
            "office" => Ok(BrollStyle::Office),
            "technology" => Ok(BrollStyle::Technology),
            "food" => Ok(BrollStyle::Food),
            "abstract" => Ok(BrollStyle::Abstract),
            _ => Err(BrollStyleParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown B-roll style: {0}")]
pub struct BrollStyleParseError(String);

/// Normalize a raw `broll` form value for forwarding.
///
/// Blank values mean "no B-roll" and are dropped; anything else, including
/// values outside the catalogue, is forwarded unchanged.
pub fn normalize_broll(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
