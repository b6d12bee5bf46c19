//! Supply transfer system: advances seed batches along tower-to-tower
//! links and converts surviving arrivals into newly arriving particles.

use glam::Vec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use pollenfall_core::components::{Particle, SupplyRun};
use pollenfall_core::constants::SEED_TRAVEL_SECS;
use pollenfall_core::enums::ResourceKind;
use pollenfall_core::events::EffectEvent;
use pollenfall_core::types::{smoothstep, EmitterId};

use crate::host::BattlefieldView;
use crate::systems::particles::{flush_despawns, spawn_arriving};

struct Arrival {
    dest: EmitterId,
    kind: ResourceKind,
    position: Vec2,
}

/// Advance every supply run one tick.
pub fn run<H: BattlefieldView>(
    world: &mut World,
    host: &H,
    rng: &mut ChaCha8Rng,
    next_seq: &mut u64,
    dt: f64,
    events: &mut Vec<EffectEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    let mut arrivals: Vec<Arrival> = Vec::new();

    for (entity, supply_run) in world.query_mut::<&mut SupplyRun>() {
        let (Some(source), Some(dest)) = (
            host.emitter(supply_run.source),
            host.emitter(supply_run.dest),
        ) else {
            // Either endpoint vanished: the transfer is invalidated and its
            // remaining seeds go with it.
            despawn_buffer.push(entity);
            continue;
        };

        supply_run.progress += (dt / SEED_TRAVEL_SECS) as f32;
        let base_progress = supply_run.progress;
        let dest_id = supply_run.dest;

        let link = dest.position - source.position;
        let perp = if link.length_squared() > f32::EPSILON {
            link.normalize().perp()
        } else {
            Vec2::ZERO
        };

        supply_run.seeds.retain_mut(|seed| {
            let progress = (base_progress + seed.offset).clamp(0.0, 1.0);
            let along = source.position.lerp(dest.position, smoothstep(progress));
            // Sway envelope pins seeds to the link at both endpoints.
            let envelope = 4.0 * progress * (1.0 - progress);
            let sway = (progress * seed.sway_frequency + seed.sway_phase).sin()
                * seed.sway_amplitude
                * envelope;
            seed.position = along + perp * sway;

            if progress >= 1.0 {
                arrivals.push(Arrival {
                    dest: dest_id,
                    kind: seed.kind,
                    position: seed.position,
                });
                false
            } else {
                true
            }
        });

        if supply_run.seeds.is_empty() {
            despawn_buffer.push(entity);
        }
    }
    flush_despawns(world, despawn_buffer);

    // Convert arrivals into Arrive-state particles, but only while the
    // destination still has roster capacity; excess seeds are dropped
    // silently rather than queued.
    for arrival in arrivals {
        let Some(spec) = host.emitter(arrival.dest) else {
            continue;
        };
        let active = count_active(world, arrival.dest, arrival.kind);
        if active < spec.desired(arrival.kind) {
            spawn_arriving(
                world,
                rng,
                next_seq,
                arrival.dest,
                arrival.kind,
                arrival.position,
                spec.position,
            );
            events.push(EffectEvent::SeedArrived {
                emitter: arrival.dest,
                kind: arrival.kind,
            });
        }
    }
}

fn count_active(world: &World, emitter: EmitterId, kind: ResourceKind) -> usize {
    world
        .query::<&Particle>()
        .iter()
        .filter(|(_, p)| p.owner == emitter && p.kind == kind && p.phase.is_active())
        .count()
}
