//! Combat-effects engine for Pollenfall.
//!
//! Owns the hecs ECS world holding particles, swarm clouds, and supply
//! runs, runs the per-tick system passes in fixed order, and produces
//! FrameSnapshots for the rendering host.

pub mod engine;
pub mod host;
pub mod systems;

pub use engine::EffectsEngine;
pub use pollenfall_core as core;

#[cfg(test)]
mod tests;
