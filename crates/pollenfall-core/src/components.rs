//! ECS components for hecs entities owned by the effects engine.
//!
//! Components are plain data structs with no methods beyond small
//! constructors. Behavior lives in the engine's systems.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::{ParticlePhase, ResourceKind};
use crate::types::{EmitterId, UnitId};

/// A resource particle owned by a tower.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ResourceKind,
    /// Owning tower. Resolved through the host each tick; if the tower is
    /// gone the particle's anchored motion is skipped for that tick.
    pub owner: EmitterId,
    /// Monotonic spawn sequence. Newest-first trim order and stable
    /// snapshot ordering both key off this.
    pub seq: u64,
    pub phase: ParticlePhase,
    /// Current orbit angle (radians).
    pub angle: f32,
    /// Per-particle angular speed (radians per second).
    pub angular_speed: f32,
    /// Orbit radius around the owning tower (pixels).
    pub orbit_radius: f32,
    /// Decorative pulse phase. No gameplay effect.
    pub pulse_phase: f32,
    /// Current rendered position.
    pub position: Vec2,
    /// Render opacity; decays during the swarm fade.
    pub opacity: f32,
}

/// Interpolation state attached only while a particle is in the Arrive or
/// Launch phase. Dropped when the glide completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Glide {
    pub start: Vec2,
    pub target: Vec2,
    /// When set, the target is re-resolved from this unit each tick so the
    /// particle chases a moving target.
    pub tracked_unit: Option<UnitId>,
    pub elapsed_secs: f64,
    pub duration_secs: f64,
}

/// Post-impact motion state, attached when a launch completes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwarmMotion {
    /// Impact center recorded at launch completion.
    pub center: Vec2,
    pub elapsed_secs: f64,
}

/// An area damage-over-time cloud spawned from one binned impact group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmCloud {
    pub id: u64,
    pub position: Vec2,
    /// Radius in pixels, converted from meters at spawn.
    pub radius: f32,
    pub pollen_shots: u32,
    pub nectar_shots: u32,
    pub duration_secs: f64,
    pub elapsed_secs: f64,
    pub owner: EmitterId,
    /// Damage per hit, snapshotted from the owning tower at spawn.
    pub damage: f64,
    /// Units this cloud has already damaged. A unit never takes damage
    /// twice from the same cloud.
    pub hit_units: HashSet<UnitId>,
}

/// One seed traveling along a supply link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupplySeed {
    pub kind: ResourceKind,
    /// Progress offset relative to the run's base progress; staggers seeds
    /// along the link.
    pub offset: f32,
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
    pub sway_phase: f32,
    pub position: Vec2,
}

/// A batch of seeds in flight between two towers. Invalidated (despawned
/// with its remaining seeds) if either endpoint stops resolving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyRun {
    pub id: u64,
    pub source: EmitterId,
    pub dest: EmitterId,
    /// Base progress along the link, 0..1+stagger.
    pub progress: f32,
    pub seeds: Vec<SupplySeed>,
}
