//! Closed set of tracking algorithms selectable by name

use crate::error::TrackError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Available tracking algorithms, in the order they are listed to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrackerKind {
    Boosting,
    Mil,
    Kcf,
    Tld,
    MedianFlow,
    Goturn,
    Mosse,
    Csrt,
}

impl TrackerKind {
    /// Every algorithm in listing order
    pub const ALL: [TrackerKind; 8] = [
        TrackerKind::Boosting,
        TrackerKind::Mil,
        TrackerKind::Kcf,
        TrackerKind::Tld,
        TrackerKind::MedianFlow,
        TrackerKind::Goturn,
        TrackerKind::Mosse,
        TrackerKind::Csrt,
    ];

    /// Canonical upper-case name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boosting => "BOOSTING",
            Self::Mil => "MIL",
            Self::Kcf => "KCF",
            Self::Tld => "TLD",
            Self::MedianFlow => "MEDIANFLOW",
            Self::Goturn => "GOTURN",
            Self::Mosse => "MOSSE",
            Self::Csrt => "CSRT",
        }
    }

    /// Names of all algorithms in listing order
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(TrackerKind::name).collect()
    }
}

impl Default for TrackerKind {
    fn default() -> Self {
        Self::Csrt
    }
}

impl std::fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact, case-sensitive lookup
impl FromStr for TrackerKind {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| TrackError::UnknownTrackerName {
                name: s.to_string(),
                available: Self::names(),
            })
    }
}
