//! Drop placement: classifying pointer geometry and gating moves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::path::NodePath;

/// Where a relocated subtree attaches relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovePosition {
    /// First child of the target.
    Adopt,
    /// Last child of the target.
    AdoptLast,
    /// Sibling immediately before the target.
    Before,
    /// Sibling immediately after the target.
    After,
}

impl MovePosition {
    pub const ALL: [MovePosition; 4] = [Self::Adopt, Self::AdoptLast, Self::Before, Self::After];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adopt => "adopt",
            Self::AdoptLast => "adopt-last",
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for MovePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovePosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                format!("unknown move position '{s}' (expected adopt, adopt-last, before or after)")
            })
    }
}

/// Pointer location in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Bounding box of a drop target in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl TargetBox {
    pub fn vertical_midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Classify the pointer over `target` into a placement.
///
/// Right of the adoption zone (`left + zone_width`) adopts; otherwise the
/// upper half places before and the lower half after.
pub fn classify(pointer: Point, target: &TargetBox, zone_width: f64) -> MovePosition {
    if pointer.x > target.left + zone_width {
        MovePosition::Adopt
    } else if pointer.y < target.vertical_midpoint() {
        MovePosition::Before
    } else {
        MovePosition::After
    }
}

/// A move is legal unless the target is the source or lies inside its subtree.
#[instrument(level = "trace", skip_all, fields(source = %source, target = %target))]
pub fn validate_target(source: &NodePath, target: &NodePath) -> bool {
    target != source && !source.is_ancestor_of(target)
}
