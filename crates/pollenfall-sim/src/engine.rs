//! The effects engine — owns all transient combat-effect state.
//!
//! `EffectsEngine` owns the hecs world (particles, swarm clouds, supply
//! runs), the status-effect registry, shield coverage, and per-tower
//! launch queues. The host's render/update loop calls `tick` once per
//! frame; gameplay code calls the query/mutator methods between ticks.
//! Completely headless: no rendering, no timers, no threads.

use std::collections::HashMap;

use hecs::World;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use pollenfall_core::commands::{LaunchRequest, LaunchTarget};
use pollenfall_core::components::{Glide, Particle, SupplyRun, SupplySeed};
use pollenfall_core::constants::*;
use pollenfall_core::effects::{ShieldState, StatusEffectRegistry};
use pollenfall_core::enums::{ParticlePhase, ResourceKind, ShieldMode};
use pollenfall_core::events::{EffectEvent, Impact};
use pollenfall_core::state::FrameSnapshot;
use pollenfall_core::types::{EmitterId, SimTime, UnitId};

use crate::host::{BattlefieldView, DamageSink, RenderMetrics};
use crate::systems;

/// Configuration for starting a new engine.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed + same host script = same run.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// The combat-effects engine. One instance per simulation; tests can run
/// several side by side since no state is process-global.
pub struct EffectsEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    effects: StatusEffectRegistry,
    shields: HashMap<UnitId, ShieldState>,
    launch_queues: HashMap<EmitterId, Vec<LaunchRequest>>,
    impact_buffer: Vec<Impact>,
    events: Vec<EffectEvent>,
    despawn_buffer: Vec<hecs::Entity>,
    next_seq: u64,
}

impl EffectsEngine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            effects: StatusEffectRegistry::new(),
            shields: HashMap::new(),
            launch_queues: HashMap::new(),
            impact_buffer: Vec::new(),
            events: Vec::new(),
            despawn_buffer: Vec::new(),
            next_seq: 0,
        }
    }

    /// Advance the simulation by one frame of `dt` seconds and return the
    /// resulting snapshot. Passes run in fixed order; the swarm-cloud pass
    /// consumes impact signals the particle pass emitted this same tick.
    pub fn tick<H>(&mut self, host: &mut H, dt: f64) -> FrameSnapshot
    where
        H: BattlefieldView + RenderMetrics + DamageSink,
    {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.time.advance(dt);
        let now = self.time.elapsed_secs;

        // 1. Status effect decay
        self.effects.decay(now);
        // 2. Shield coverage
        systems::shield::run(&mut self.shields, &*host, now, &mut self.events);
        // 3. Particle lifecycle (may emit impacts)
        systems::particles::run(
            &mut self.world,
            &*host,
            &mut self.rng,
            &mut self.next_seq,
            dt,
            &mut self.impact_buffer,
            &mut self.despawn_buffer,
        );
        // 4. Swarm clouds (consumes this tick's impacts)
        systems::swarm_cloud::run(
            &mut self.world,
            &mut self.effects,
            host,
            &mut self.impact_buffer,
            now,
            dt,
            &mut self.next_seq,
            &mut self.events,
            &mut self.despawn_buffer,
        );
        // 5. Supply runs (may convert arrivals into particles)
        systems::supply::run(
            &mut self.world,
            &*host,
            &mut self.rng,
            &mut self.next_seq,
            dt,
            &mut self.events,
            &mut self.despawn_buffer,
        );

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build(&self.world, &self.time, &self.shields, events)
    }

    // ---- On-demand queries (callable outside the tick) ----

    /// Effective speed multiplier for a unit: min of its live slows, 1 if
    /// none.
    pub fn slow_multiplier(&mut self, unit: UnitId) -> f64 {
        self.effects.slow_multiplier(unit, self.time.elapsed_secs)
    }

    /// Whether the unit currently has any live stun.
    pub fn is_stunned(&mut self, unit: UnitId) -> bool {
        self.effects.is_stunned(unit, self.time.elapsed_secs)
    }

    /// Effective damage multiplier from live amplifiers, 1 if none.
    pub fn damage_multiplier(&mut self, unit: UnitId) -> f64 {
        self.effects.damage_multiplier(unit, self.time.elapsed_secs)
    }

    /// Current shield mitigation mode on a unit, if covered (or lingering).
    pub fn shield_mode(&self, unit: UnitId) -> Option<ShieldMode> {
        self.shields.get(&unit).map(|state| state.mode)
    }

    // ---- Mutators ----

    pub fn apply_slow(&mut self, unit: UnitId, source: EmitterId, multiplier: f64, duration_secs: f64) {
        self.effects
            .apply_slow(unit, source, multiplier, duration_secs, self.time.elapsed_secs);
    }

    pub fn apply_stun(&mut self, unit: UnitId, duration_secs: f64, source: EmitterId) {
        self.effects
            .apply_stun(unit, duration_secs, source, self.time.elapsed_secs);
    }

    pub fn apply_damage_amp(
        &mut self,
        unit: UnitId,
        source: EmitterId,
        multiplier: f64,
        duration_secs: f64,
    ) {
        self.effects
            .apply_damage_amp(unit, source, multiplier, duration_secs, self.time.elapsed_secs);
    }

    /// Remove all slows on a unit, emitting a `SlowDetached` event per
    /// owning source so each tower can detach any per-unit timer it holds.
    pub fn clear_slow_effects(&mut self, unit: UnitId) {
        for source in self.effects.clear_slows(unit) {
            self.events.push(EffectEvent::SlowDetached { unit, source });
        }
    }

    pub fn clear_stun_effects(&mut self, unit: UnitId) {
        self.effects.clear_stuns(unit);
    }

    pub fn clear_damage_amplifiers(&mut self, unit: UnitId) {
        self.effects.clear_damage_amps(unit);
    }

    /// Bulk teardown for a dying, breaching, or despawning unit. The one
    /// place that proactively detaches cross-referenced timers.
    pub fn clear_all_effects(&mut self, unit: UnitId) {
        for source in self.effects.clear_all(unit) {
            self.events.push(EffectEvent::SlowDetached { unit, source });
        }
        self.shields.remove(&unit);
    }

    /// Wave reset: drop every particle, cloud, run, queue, and effect.
    /// The monotonic clock keeps running.
    pub fn reset(&mut self) {
        self.world.clear();
        self.effects.reset();
        self.shields.clear();
        self.launch_queues.clear();
        self.impact_buffer.clear();
        self.events.clear();
        self.despawn_buffer.clear();
    }

    // ---- Launch queueing ----

    /// Queue a request to launch `count` particles of `kind` from a tower.
    pub fn enqueue_launch(&mut self, emitter: EmitterId, kind: ResourceKind, count: u32) {
        if count == 0 {
            return;
        }
        self.launch_queues
            .entry(emitter)
            .or_default()
            .push(LaunchRequest { kind, count });
    }

    /// Trigger a tower's queued launch requests at a target. Converts up to
    /// the requested counts of eligible (Arrive/Orbit) particles into
    /// Launch state, each starting from its current rendered position. If
    /// the target cannot be resolved the queued requests are discarded —
    /// no retry, no backlog.
    pub fn trigger_launch<H: BattlefieldView>(
        &mut self,
        emitter: EmitterId,
        target: LaunchTarget,
        host: &H,
    ) {
        let Some(requests) = self.launch_queues.remove(&emitter) else {
            return;
        };
        let aim = target
            .position
            .or_else(|| target.unit.and_then(|unit| host.unit_position(unit)));
        let Some(aim) = aim else {
            return; // unresolvable target: requests discarded
        };
        let tracked = target.unit.filter(|&unit| host.unit_position(unit).is_some());

        for request in requests {
            let mut eligible: Vec<(hecs::Entity, u64)> = self
                .world
                .query::<&Particle>()
                .iter()
                .filter(|(_, p)| {
                    p.owner == emitter && p.kind == request.kind && p.phase.is_active()
                })
                .map(|(entity, p)| (entity, p.seq))
                .collect();
            // Oldest first: long-settled orbiters launch before fresh arrivals.
            eligible.sort_by_key(|&(_, seq)| seq);

            for &(entity, _) in eligible.iter().take(request.count as usize) {
                let duration_secs = self
                    .rng
                    .gen_range(LAUNCH_DURATION_MIN_SECS..LAUNCH_DURATION_MAX_SECS);
                let Ok(particle) = self.world.query_one_mut::<&mut Particle>(entity) else {
                    continue;
                };
                particle.phase = ParticlePhase::Launch;
                let start = particle.position;
                let _ = self.world.remove_one::<Glide>(entity);
                let _ = self.world.insert_one(
                    entity,
                    Glide {
                        start,
                        target: aim,
                        tracked_unit: tracked,
                        elapsed_secs: 0.0,
                        duration_secs,
                    },
                );
            }
        }
    }

    // ---- Supply transfers ----

    /// Begin a seed transfer along a tower-to-tower link. The batch holds
    /// one seed of the declared kind plus up to `SEED_CARRY_CAP` forwarded
    /// lower-tier (pollen) seeds the payload is carrying.
    pub fn begin_transfer(
        &mut self,
        source: EmitterId,
        dest: EmitterId,
        kind: ResourceKind,
        carried_pollen: usize,
    ) {
        if source == dest {
            return;
        }
        let count = 1 + carried_pollen.min(SEED_CARRY_CAP);
        let mut seeds = Vec::with_capacity(count);
        for index in 0..count {
            seeds.push(SupplySeed {
                kind: if index == 0 { kind } else { ResourceKind::Pollen },
                // Later seeds trail the batch leader along the link.
                offset: -(index as f32) * SEED_PROGRESS_STAGGER,
                sway_amplitude: self
                    .rng
                    .gen_range(SEED_SWAY_AMPLITUDE_MIN_PX..SEED_SWAY_AMPLITUDE_MAX_PX),
                sway_frequency: self
                    .rng
                    .gen_range(SEED_SWAY_FREQUENCY_MIN..SEED_SWAY_FREQUENCY_MAX),
                sway_phase: self.rng.gen_range(0.0..std::f32::consts::TAU),
                position: glam::Vec2::ZERO,
            });
        }
        let id = self.next_seq;
        self.next_seq += 1;
        self.world.spawn((SupplyRun {
            id,
            source,
            dest,
            progress: 0.0,
            seeds,
        },));
    }

    // ---- Accessors ----

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Read-only access to the engine's ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }
}
