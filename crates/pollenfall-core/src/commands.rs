//! Launch requests and targets queued against the engine by gameplay code.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::ResourceKind;
use crate::types::UnitId;

/// A pending request to launch `count` particles of `kind` from a tower.
/// Requests sit in the tower's queue until a trigger arrives; a trigger
/// without a resolvable target discards them (no retry, no backlog).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub kind: ResourceKind,
    pub count: u32,
}

/// Target for a launch trigger: an explicit position, a tracked unit, or
/// both. A tracked unit makes launched particles chase it; the position
/// (or the unit's position at trigger time) is the initial aim point.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LaunchTarget {
    pub position: Option<Vec2>,
    pub unit: Option<UnitId>,
}

impl LaunchTarget {
    pub fn at(position: Vec2) -> Self {
        Self {
            position: Some(position),
            unit: None,
        }
    }

    pub fn tracking(unit: UnitId) -> Self {
        Self {
            position: None,
            unit: Some(unit),
        }
    }
}
