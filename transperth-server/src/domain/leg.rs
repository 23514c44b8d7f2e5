//! Journey leg type.
//!
//! A `Leg` is one segment of a journey option: a walk, or a single ride
//! on one service.

use std::fmt;

use serde::Serialize;

/// Mode of travel for a leg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    #[default]
    Walk,
    Bus,
    Train,
    Ferry,
    /// Free CAT bus
    Cat,
}

impl LegKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LegKind::Walk => "walk",
            LegKind::Bus => "bus",
            LegKind::Train => "train",
            LegKind::Ferry => "ferry",
            LegKind::Cat => "cat",
        }
    }
}

impl fmt::Display for LegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One segment of a journey option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leg {
    #[serde(rename = "type")]
    pub kind: LegKind,

    /// Human-readable summary, e.g. `"Walk 501m"` or `"276 Bus to Perth"`
    pub description: String,

    /// Route or line code, e.g. `"276"`, `"AIR"`; absent for walks
    pub service_code: Option<String>,
}

impl Leg {
    pub fn new(kind: LegKind, description: impl Into<String>, service_code: Option<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            service_code: service_code.filter(|code| !code.trim().is_empty()),
        }
    }

    pub fn is_walk(&self) -> bool {
        self.kind == LegKind::Walk
    }
}
