//! Fundamental identifier, geometry, and timing types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier of a hostile mobile unit. Units live in the host's world;
/// the simulation only ever holds their ids and resolves them per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Identifier of a tower (emitter). Towers are defined by the host; the
/// simulation keys particle rosters, launch queues, and effect sources by
/// this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmitterId(pub u32);

/// Simulation time tracking. Advanced once per tick by the host-supplied
/// frame delta; `elapsed_secs` is the monotonic clock every effect expiry
/// is compared against.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Visual geometry of a unit, supplied by the host renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitVisualMetrics {
    /// Radius of the unit's focal body (pixels).
    pub focus_radius: f32,
    /// Radius of the unit's outer ring decoration (pixels).
    pub ring_radius: f32,
}

impl UnitVisualMetrics {
    /// Effective hit radius used for area-effect overlap tests.
    pub fn hit_radius(&self) -> f32 {
        self.focus_radius.max(self.ring_radius * 0.35)
    }
}

/// Unit vector at `angle` radians scaled by `radius`.
pub fn polar(angle: f32, radius: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Cubic ease-out: fast start, gentle settle. Used for arrive glides.
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Cubic ease-in: gentle start, accelerating finish. Used for launches.
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

/// Smoothstep ease-in-out. Used for supply seed travel.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
