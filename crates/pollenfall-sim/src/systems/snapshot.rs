//! Snapshot system: builds the per-tick FrameSnapshot for the renderer.
//!
//! This pass is read-only — it never modifies the world. Views are sorted
//! by spawn sequence or id so same-seed runs serialize identically.

use std::collections::HashMap;

use hecs::World;

use pollenfall_core::components::{Particle, SupplyRun, SwarmCloud};
use pollenfall_core::effects::ShieldState;
use pollenfall_core::events::EffectEvent;
use pollenfall_core::state::{CloudView, FrameSnapshot, ParticleView, SeedView, ShieldView};
use pollenfall_core::types::{SimTime, UnitId};

/// Build a complete FrameSnapshot from the current world state.
pub fn build(
    world: &World,
    time: &SimTime,
    shields: &HashMap<UnitId, ShieldState>,
    events: Vec<EffectEvent>,
) -> FrameSnapshot {
    FrameSnapshot {
        time: *time,
        particles: build_particles(world),
        clouds: build_clouds(world),
        seeds: build_seeds(world),
        shields: build_shields(shields),
        events,
    }
}

fn build_particles(world: &World) -> Vec<ParticleView> {
    let mut particles: Vec<ParticleView> = world
        .query::<&Particle>()
        .iter()
        .map(|(_, p)| ParticleView {
            id: p.seq,
            position: p.position,
            kind: p.kind,
            phase: p.phase,
            opacity: p.opacity,
            pulse_phase: p.pulse_phase,
        })
        .collect();
    particles.sort_by_key(|view| view.id);
    particles
}

fn build_clouds(world: &World) -> Vec<CloudView> {
    let mut clouds: Vec<CloudView> = world
        .query::<&SwarmCloud>()
        .iter()
        .map(|(_, cloud)| CloudView {
            id: cloud.id,
            position: cloud.position,
            radius: cloud.radius,
            remaining_secs: (cloud.duration_secs - cloud.elapsed_secs).max(0.0),
        })
        .collect();
    clouds.sort_by_key(|view| view.id);
    clouds
}

fn build_seeds(world: &World) -> Vec<SeedView> {
    let mut seeds: Vec<SeedView> = world
        .query::<&SupplyRun>()
        .iter()
        .flat_map(|(_, run)| {
            run.seeds.iter().map(|seed| SeedView {
                run_id: run.id,
                position: seed.position,
                kind: seed.kind,
            })
        })
        .collect();
    // Stable sort keeps each run's seeds in batch order.
    seeds.sort_by_key(|view| view.run_id);
    seeds
}

fn build_shields(shields: &HashMap<UnitId, ShieldState>) -> Vec<ShieldView> {
    let mut views: Vec<ShieldView> = shields
        .iter()
        .map(|(unit, state)| ShieldView {
            unit: *unit,
            mode: state.mode,
            source: state.source,
        })
        .collect();
    views.sort_by_key(|view| view.unit);
    views
}
