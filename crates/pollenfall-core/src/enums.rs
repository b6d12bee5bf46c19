//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::constants::{NECTAR_CLOUD_STUN_SECS, POLLEN_CLOUD_STUN_SECS};

/// The two resource kinds towers hold and launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Common resource: cheap, short cloud stun.
    #[default]
    Pollen,
    /// Refined resource: rarer, longer cloud stun.
    Nectar,
}

impl ResourceKind {
    /// Both kinds, in roster-reconciliation order.
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Pollen, ResourceKind::Nectar];

    /// Instant stun contribution (seconds) of one shot of this kind when a
    /// swarm cloud forms.
    pub fn cloud_stun_secs(self) -> f64 {
        match self {
            ResourceKind::Pollen => POLLEN_CLOUD_STUN_SECS,
            ResourceKind::Nectar => NECTAR_CLOUD_STUN_SECS,
        }
    }
}

/// Particle lifecycle phase. `Done` is implicit: a finished particle is
/// despawned rather than stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticlePhase {
    /// Easing from a start point to its orbit anchor.
    #[default]
    Arrive,
    /// Steady-state orbit around the owning tower.
    Orbit,
    /// Easing toward a launch target (possibly chasing a tracked unit).
    Launch,
    /// Orbiting the impact center, then fading radially outward.
    Swarm,
}

impl ParticlePhase {
    /// Whether the particle counts against the tower's desired roster.
    pub fn is_active(self) -> bool {
        matches!(self, ParticlePhase::Arrive | ParticlePhase::Orbit)
    }
}

/// Shield mitigation mode granted by a shielder unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldMode {
    /// Common shielder: incoming damage is halved.
    Halve,
    /// Elite shielder: incoming damage is reduced to its square root.
    Sqrt,
}

impl ShieldMode {
    /// Apply this shield's mitigation to a raw damage amount.
    pub fn mitigate(self, damage: f64) -> f64 {
        if !damage.is_finite() || damage <= 0.0 {
            return 0.0;
        }
        match self {
            ShieldMode::Halve => damage * 0.5,
            ShieldMode::Sqrt => damage.sqrt(),
        }
    }
}
