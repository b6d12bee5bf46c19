//! Events emitted by the simulation for the host's gameplay and audio/UI
//! layers, plus the intra-tick impact signal.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::ResourceKind;
use crate::types::{EmitterId, UnitId};

/// Events drained into each frame snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EffectEvent {
    /// A slow from `source` was cleared from `unit`; the source tower must
    /// detach any per-unit timer it still holds for this slow.
    SlowDetached { unit: UnitId, source: EmitterId },
    /// A swarm cloud formed.
    CloudSpawned {
        position: Vec2,
        radius: f32,
        owner: EmitterId,
    },
    /// A supply seed arrived and became a particle at `emitter`.
    SeedArrived {
        emitter: EmitterId,
        kind: ResourceKind,
    },
    /// A lingering shield finally dropped.
    ShieldFaded { unit: UnitId },
}

/// Signal emitted when a particle's launch completes, consumed by the
/// swarm-cloud pass later in the same tick. Never leaves the engine.
#[derive(Debug, Clone, Copy)]
pub struct Impact {
    pub position: Vec2,
    pub kind: ResourceKind,
    pub owner: EmitterId,
}
