//! Host collaborator traits.
//!
//! The engine never stores live references into the host's world; every
//! cross-entity reference is an id resolved through these traits at call
//! time. A failed lookup skips the dependent step for one tick and the
//! next tick recomputes from current state, so nothing dangles.

use glam::Vec2;

use pollenfall_core::enums::ResourceKind;
use pollenfall_core::types::{EmitterId, UnitId, UnitVisualMetrics};

/// A unit currently projecting shield coverage onto its neighbors.
#[derive(Debug, Clone, Copy)]
pub struct Shielder {
    pub id: UnitId,
    /// Elite shielders grant square-root mitigation instead of halving.
    pub elite: bool,
}

/// Tower definition resolved per call from the host.
#[derive(Debug, Clone, Copy)]
pub struct EmitterSpec {
    pub position: Vec2,
    /// Desired roster size per resource kind.
    pub desired_pollen: usize,
    pub desired_nectar: usize,
    /// Current attack damage; swarm clouds snapshot a fraction of this.
    pub attack_damage: f64,
}

impl EmitterSpec {
    pub fn desired(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Pollen => self.desired_pollen,
            ResourceKind::Nectar => self.desired_nectar,
        }
    }
}

/// Position and geometry lookups into the host's entity world.
pub trait BattlefieldView {
    /// Ids of all live hostile units, in a host-stable order.
    fn live_units(&self) -> Vec<UnitId>;

    fn unit_position(&self, unit: UnitId) -> Option<Vec2>;

    fn unit_visual_metrics(&self, unit: UnitId) -> Option<UnitVisualMetrics>;

    /// Effective hit radius for area-overlap tests. Defaults to the
    /// visual-metrics derivation; hosts with bespoke hitboxes override.
    fn unit_hit_radius(&self, unit: UnitId) -> f32 {
        self.unit_visual_metrics(unit)
            .map(|metrics| metrics.hit_radius())
            .unwrap_or(0.0)
    }

    /// Units currently acting as shielders.
    fn shielders(&self) -> Vec<Shielder>;

    /// Ids of all live towers, in a host-stable order.
    fn emitters(&self) -> Vec<EmitterId>;

    fn emitter(&self, id: EmitterId) -> Option<EmitterSpec>;
}

/// Resolution-independent distance conversion. Gameplay radii are
/// authored in meters and converted through the current render scale.
pub trait RenderMetrics {
    fn meters_to_pixels(&self, meters: f32) -> f32;
}

/// Damage application primitive owned by the host's combat pipeline.
pub trait DamageSink {
    fn apply_damage(&mut self, unit: UnitId, amount: f64, source: EmitterId);
}
