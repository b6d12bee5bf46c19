//! Particle lifecycle: roster reconciliation and per-tick motion.
//!
//! Each tower's roster of active (Arrive/Orbit) particles is reconciled
//! against its desired counts, then every particle advances one tick of
//! its state machine. Launch completions emit impact signals consumed by
//! the swarm-cloud pass later in the same tick. All removal is
//! mark-then-compact through the shared despawn buffer.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use pollenfall_core::components::{Glide, Particle, SwarmMotion};
use pollenfall_core::constants::*;
use pollenfall_core::enums::{ParticlePhase, ResourceKind};
use pollenfall_core::events::Impact;
use pollenfall_core::types::{ease_in_cubic, ease_out_cubic, polar, EmitterId};

use crate::host::BattlefieldView;

/// Structural changes deferred until iteration ends.
enum Transition {
    ToOrbit,
    ToSwarm(Vec2),
}

/// Run reconciliation and advancement for one tick.
pub fn run<H: BattlefieldView>(
    world: &mut World,
    host: &H,
    rng: &mut ChaCha8Rng,
    next_seq: &mut u64,
    dt: f64,
    impacts: &mut Vec<Impact>,
    despawn_buffer: &mut Vec<Entity>,
) {
    reconcile(world, host, rng, next_seq, despawn_buffer);
    advance(world, host, dt, impacts, despawn_buffer);
    flush_despawns(world, despawn_buffer);
}

/// Bring each tower's active particle count toward its desired count:
/// trim newest-first when over, spawn arriving particles when under.
/// The full surplus is trimmed in one pass so active never exceeds
/// desired after reconciliation; only spawning is batched per tick.
fn reconcile<H: BattlefieldView>(
    world: &mut World,
    host: &H,
    rng: &mut ChaCha8Rng,
    next_seq: &mut u64,
    despawn_buffer: &mut Vec<Entity>,
) {
    // Active particles anchored to a tower that no longer exists have
    // nothing to orbit; drop them before counting.
    for (entity, particle) in world.query_mut::<&Particle>() {
        if particle.phase.is_active() && host.emitter(particle.owner).is_none() {
            despawn_buffer.push(entity);
        }
    }
    flush_despawns(world, despawn_buffer);

    for emitter_id in host.emitters() {
        let Some(spec) = host.emitter(emitter_id) else {
            continue;
        };
        for kind in ResourceKind::ALL {
            let mut active: Vec<(Entity, u64)> = world
                .query::<&Particle>()
                .iter()
                .filter(|(_, p)| p.owner == emitter_id && p.kind == kind && p.phase.is_active())
                .map(|(entity, p)| (entity, p.seq))
                .collect();
            let desired = spec.desired(kind);

            if active.len() > desired {
                // Trim the most recently created first; older orbiters keep
                // their visual continuity.
                active.sort_by_key(|&(_, seq)| std::cmp::Reverse(seq));
                let excess = active.len() - desired;
                for &(entity, _) in active.iter().take(excess) {
                    despawn_buffer.push(entity);
                }
            } else if active.len() < desired {
                let deficit = (desired - active.len()).min(PARTICLE_SPAWN_BATCH_CAP);
                for _ in 0..deficit {
                    spawn_arriving(world, rng, next_seq, emitter_id, kind, spec.position, spec.position);
                }
            }
        }
    }
    flush_despawns(world, despawn_buffer);
}

/// Spawn a new particle in Arrive state gliding from `start` toward an
/// orbit anchor around `center`. Also used when supply seeds arrive.
pub fn spawn_arriving(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    next_seq: &mut u64,
    owner: EmitterId,
    kind: ResourceKind,
    start: Vec2,
    center: Vec2,
) -> Entity {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let orbit_radius = rng.gen_range(ORBIT_RADIUS_MIN_PX..ORBIT_RADIUS_MAX_PX);
    let angular_speed = rng.gen_range(ORBIT_ANGULAR_SPEED_MIN..ORBIT_ANGULAR_SPEED_MAX);
    let duration_secs = rng.gen_range(ARRIVE_DURATION_MIN_SECS..ARRIVE_DURATION_MAX_SECS);
    let seq = *next_seq;
    *next_seq += 1;

    world.spawn((
        Particle {
            kind,
            owner,
            seq,
            phase: ParticlePhase::Arrive,
            angle,
            angular_speed,
            orbit_radius,
            pulse_phase: 0.0,
            position: start,
            opacity: 1.0,
        },
        Glide {
            start,
            target: center + polar(angle, orbit_radius),
            tracked_unit: None,
            elapsed_secs: 0.0,
            duration_secs,
        },
    ))
}

/// Advance every particle one tick.
fn advance<H: BattlefieldView>(
    world: &mut World,
    host: &H,
    dt: f64,
    impacts: &mut Vec<Impact>,
    despawn_buffer: &mut Vec<Entity>,
) {
    let dt_f32 = dt as f32;
    let mut transitions: Vec<(Entity, Transition)> = Vec::new();

    for (entity, (particle, glide, swarm)) in
        world.query_mut::<(&mut Particle, Option<&mut Glide>, Option<&mut SwarmMotion>)>()
    {
        match particle.phase {
            ParticlePhase::Arrive => {
                let Some(glide) = glide else { continue };
                // The anchor follows the live tower; a missing tower skips
                // re-anchoring for this tick only.
                if let Some(spec) = host.emitter(particle.owner) {
                    glide.target = spec.position + polar(particle.angle, particle.orbit_radius);
                }
                glide.elapsed_secs += dt;
                let t = glide_fraction(glide);
                particle.position = glide.start.lerp(glide.target, ease_out_cubic(t));
                particle.pulse_phase += ORBIT_PULSE_RATE * dt_f32;
                if t >= 1.0 {
                    particle.phase = ParticlePhase::Orbit;
                    transitions.push((entity, Transition::ToOrbit));
                }
            }
            ParticlePhase::Orbit => {
                particle.angle += particle.angular_speed * dt_f32;
                particle.pulse_phase += ORBIT_PULSE_RATE * dt_f32;
                if let Some(spec) = host.emitter(particle.owner) {
                    particle.position =
                        spec.position + polar(particle.angle, particle.orbit_radius);
                }
            }
            ParticlePhase::Launch => {
                let Some(glide) = glide else { continue };
                if let Some(unit) = glide.tracked_unit {
                    // Chase: re-resolve the tracked unit every tick, keeping
                    // the last known target if the unit is gone.
                    if let Some(position) = host.unit_position(unit) {
                        glide.target = position;
                    }
                }
                glide.elapsed_secs += dt;
                let t = glide_fraction(glide);
                particle.position = glide.start.lerp(glide.target, ease_in_cubic(t));
                if t >= 1.0 {
                    particle.position = glide.target;
                    impacts.push(Impact {
                        position: glide.target,
                        kind: particle.kind,
                        owner: particle.owner,
                    });
                    particle.phase = ParticlePhase::Swarm;
                    transitions.push((entity, Transition::ToSwarm(glide.target)));
                }
            }
            ParticlePhase::Swarm => {
                let Some(swarm) = swarm else { continue };
                swarm.elapsed_secs += dt;
                if swarm.elapsed_secs < SWARM_DURATION_SECS {
                    particle.angle += SWARM_SPIN_RATE * dt_f32;
                    particle.position = swarm.center + polar(particle.angle, SWARM_ORBIT_RADIUS_PX);
                } else if swarm.elapsed_secs < SWARM_DURATION_SECS + SWARM_FADE_SECS {
                    let fade = ((swarm.elapsed_secs - SWARM_DURATION_SECS) / SWARM_FADE_SECS) as f32;
                    particle.position = swarm.center
                        + polar(
                            particle.angle,
                            SWARM_ORBIT_RADIUS_PX + fade * SWARM_FADE_SPREAD_PX,
                        );
                    particle.opacity = 1.0 - fade;
                } else {
                    despawn_buffer.push(entity);
                }
            }
        }
    }

    for (entity, transition) in transitions {
        match transition {
            Transition::ToOrbit => {
                let _ = world.remove_one::<Glide>(entity);
            }
            Transition::ToSwarm(center) => {
                let _ = world.remove_one::<Glide>(entity);
                let _ = world.insert_one(
                    entity,
                    SwarmMotion {
                        center,
                        elapsed_secs: 0.0,
                    },
                );
            }
        }
    }
}

fn glide_fraction(glide: &Glide) -> f32 {
    if glide.duration_secs > 0.0 {
        (glide.elapsed_secs / glide.duration_secs).min(1.0) as f32
    } else {
        1.0
    }
}

/// Despawn everything collected during iteration.
pub fn flush_despawns(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
