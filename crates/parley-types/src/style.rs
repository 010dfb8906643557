//! Assistant personality styles.
//!
//! A style selects the system preamble sent ahead of every conversation.
//! The preamble text itself lives in `parley-core::gateway::style`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tone of the assistant for a given user.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (style IN ('sassy', 'friendly', 'formal'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Sassy,
    Friendly,
    Formal,
}

impl Style {
    /// Every selectable style, in display order.
    pub const ALL: [Style; 3] = [Style::Sassy, Style::Friendly, Style::Formal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Sassy => "sassy",
            Style::Friendly => "friendly",
            Style::Formal => "formal",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sassy" => Ok(Style::Sassy),
            "friendly" => Ok(Style::Friendly),
            "formal" => Ok(Style::Formal),
            other => Err(format!("invalid style: '{other}'")),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Style::Sassy
    }
}
