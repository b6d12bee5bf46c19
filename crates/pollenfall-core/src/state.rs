//! Frame snapshot views handed to the rendering host each tick.
//!
//! Views are deterministically ordered (by spawn sequence or id) so two
//! engines with the same seed and host script serialize identically.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::{ParticlePhase, ResourceKind, ShieldMode};
use crate::events::EffectEvent;
use crate::types::{SimTime, UnitId};

/// Complete per-tick view of the effects subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub time: SimTime,
    pub particles: Vec<ParticleView>,
    pub clouds: Vec<CloudView>,
    pub seeds: Vec<SeedView>,
    pub shields: Vec<ShieldView>,
    pub events: Vec<EffectEvent>,
}

/// Render view of one particle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleView {
    pub id: u64,
    pub position: Vec2,
    pub kind: ResourceKind,
    pub phase: ParticlePhase,
    pub opacity: f32,
    pub pulse_phase: f32,
}

/// Render view of one swarm cloud.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudView {
    pub id: u64,
    pub position: Vec2,
    pub radius: f32,
    pub remaining_secs: f64,
}

/// Render view of one supply seed in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedView {
    pub run_id: u64,
    pub position: Vec2,
    pub kind: ResourceKind,
}

/// Render view of one unit's shield coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldView {
    pub unit: UnitId,
    pub mode: ShieldMode,
    pub source: UnitId,
}
