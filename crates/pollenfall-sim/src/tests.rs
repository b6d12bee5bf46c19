//! Tests for the effects engine: shields, particle lifecycle, swarm
//! clouds, and supply transfers, driven through a scripted stub host.

use std::collections::HashMap;

use glam::Vec2;

use pollenfall_core::commands::LaunchTarget;
use pollenfall_core::components::{Glide, Particle, SupplyRun, SwarmCloud};
use pollenfall_core::enums::{ParticlePhase, ResourceKind, ShieldMode};
use pollenfall_core::events::EffectEvent;
use pollenfall_core::types::{EmitterId, UnitId, UnitVisualMetrics};

use crate::engine::{EffectsEngine, SimConfig};
use crate::host::{BattlefieldView, DamageSink, EmitterSpec, RenderMetrics, Shielder};

const PIXELS_PER_METER: f32 = 40.0;

/// Scripted host: a hand-edited battlefield the engine resolves ids
/// against, plus a damage log.
#[derive(Default)]
struct StubHost {
    units: Vec<UnitId>,
    positions: HashMap<UnitId, Vec2>,
    metrics: HashMap<UnitId, UnitVisualMetrics>,
    shielders: Vec<Shielder>,
    emitters: Vec<EmitterId>,
    specs: HashMap<EmitterId, EmitterSpec>,
    damage_log: Vec<(UnitId, f64, EmitterId)>,
}

impl StubHost {
    fn new() -> Self {
        Self::default()
    }

    fn add_unit(&mut self, id: u32, x: f32, y: f32) -> UnitId {
        let unit = UnitId(id);
        self.units.push(unit);
        self.positions.insert(unit, Vec2::new(x, y));
        self.metrics.insert(
            unit,
            UnitVisualMetrics {
                focus_radius: 6.0,
                ring_radius: 12.0,
            },
        );
        unit
    }

    fn move_unit(&mut self, unit: UnitId, x: f32, y: f32) {
        self.positions.insert(unit, Vec2::new(x, y));
    }

    fn remove_unit(&mut self, unit: UnitId) {
        self.units.retain(|&u| u != unit);
        self.positions.remove(&unit);
        self.shielders.retain(|s| s.id != unit);
    }

    fn add_emitter(
        &mut self,
        id: u32,
        x: f32,
        y: f32,
        desired_pollen: usize,
        desired_nectar: usize,
        attack_damage: f64,
    ) -> EmitterId {
        let emitter = EmitterId(id);
        self.emitters.push(emitter);
        self.specs.insert(
            emitter,
            EmitterSpec {
                position: Vec2::new(x, y),
                desired_pollen,
                desired_nectar,
                attack_damage,
            },
        );
        emitter
    }

    fn set_desired(&mut self, emitter: EmitterId, pollen: usize, nectar: usize) {
        if let Some(spec) = self.specs.get_mut(&emitter) {
            spec.desired_pollen = pollen;
            spec.desired_nectar = nectar;
        }
    }

    fn remove_emitter(&mut self, emitter: EmitterId) {
        self.emitters.retain(|&e| e != emitter);
        self.specs.remove(&emitter);
    }
}

impl BattlefieldView for StubHost {
    fn live_units(&self) -> Vec<UnitId> {
        self.units.clone()
    }

    fn unit_position(&self, unit: UnitId) -> Option<Vec2> {
        self.positions.get(&unit).copied()
    }

    fn unit_visual_metrics(&self, unit: UnitId) -> Option<UnitVisualMetrics> {
        self.metrics.get(&unit).copied()
    }

    fn shielders(&self) -> Vec<Shielder> {
        self.shielders.clone()
    }

    fn emitters(&self) -> Vec<EmitterId> {
        self.emitters.clone()
    }

    fn emitter(&self, id: EmitterId) -> Option<EmitterSpec> {
        self.specs.get(&id).copied()
    }
}

impl RenderMetrics for StubHost {
    fn meters_to_pixels(&self, meters: f32) -> f32 {
        meters * PIXELS_PER_METER
    }
}

impl DamageSink for StubHost {
    fn apply_damage(&mut self, unit: UnitId, amount: f64, source: EmitterId) {
        self.damage_log.push((unit, amount, source));
    }
}

fn count_phase(engine: &EffectsEngine, emitter: EmitterId, phase: ParticlePhase) -> usize {
    engine
        .world()
        .query::<&Particle>()
        .iter()
        .filter(|(_, p)| p.owner == emitter && p.phase == phase)
        .count()
}

fn count_active(engine: &EffectsEngine, emitter: EmitterId, kind: ResourceKind) -> usize {
    engine
        .world()
        .query::<&Particle>()
        .iter()
        .filter(|(_, p)| p.owner == emitter && p.kind == kind && p.phase.is_active())
        .count()
}

fn cloud_count(engine: &EffectsEngine) -> usize {
    engine.world().query::<&SwarmCloud>().iter().count()
}

/// Run enough short ticks for rosters to fill and arrivals to settle
/// into orbit.
fn settle(engine: &mut EffectsEngine, host: &mut StubHost) {
    for _ in 0..12 {
        engine.tick(host, 0.1);
    }
}

// ---- Particle roster reconciliation ----

#[test]
fn test_roster_fills_to_desired_with_bounded_batches() {
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 5, 2, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());

    engine.tick(&mut host, 0.1);
    // First tick spawns at most one batch per kind.
    assert_eq!(count_active(&engine, tower, ResourceKind::Pollen), 3);
    assert_eq!(count_active(&engine, tower, ResourceKind::Nectar), 2);

    engine.tick(&mut host, 0.1);
    assert_eq!(count_active(&engine, tower, ResourceKind::Pollen), 5);

    // Once filled, the roster holds steady and never exceeds desired.
    for _ in 0..10 {
        engine.tick(&mut host, 0.1);
        assert!(count_active(&engine, tower, ResourceKind::Pollen) <= 5);
        assert!(count_active(&engine, tower, ResourceKind::Nectar) <= 2);
    }
    assert_eq!(count_active(&engine, tower, ResourceKind::Pollen), 5);
}

#[test]
fn test_roster_trims_newest_first_when_desired_drops() {
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 5, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);

    let oldest_seqs: Vec<u64> = {
        let mut seqs: Vec<u64> = engine
            .world()
            .query::<&Particle>()
            .iter()
            .map(|(_, p)| p.seq)
            .collect();
        seqs.sort();
        seqs.into_iter().take(2).collect()
    };

    host.set_desired(tower, 2, 0);
    engine.tick(&mut host, 0.1);

    assert_eq!(count_active(&engine, tower, ResourceKind::Pollen), 2);
    // The survivors are the two oldest particles.
    let mut surviving: Vec<u64> = engine
        .world()
        .query::<&Particle>()
        .iter()
        .map(|(_, p)| p.seq)
        .collect();
    surviving.sort();
    assert_eq!(surviving, oldest_seqs);
}

#[test]
fn test_large_desired_drop_trims_fully_in_one_tick() {
    // The whole surplus goes in one reconciliation pass; active never
    // exceeds desired once the tick completes, however far desired fell.
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 8, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);
    assert_eq!(count_active(&engine, tower, ResourceKind::Pollen), 8);

    host.set_desired(tower, 0, 0);
    engine.tick(&mut host, 0.1);
    assert_eq!(count_active(&engine, tower, ResourceKind::Pollen), 0);

    host.set_desired(tower, 8, 0);
    settle(&mut engine, &mut host);
    host.set_desired(tower, 1, 0);
    engine.tick(&mut host, 0.1);
    assert_eq!(count_active(&engine, tower, ResourceKind::Pollen), 1);
}

#[test]
fn test_arrivals_settle_into_orbit_and_drop_glide() {
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 3, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);

    assert_eq!(count_phase(&engine, tower, ParticlePhase::Orbit), 3);
    assert_eq!(count_phase(&engine, tower, ParticlePhase::Arrive), 0);
    let glides = engine.world().query::<&Glide>().iter().count();
    assert_eq!(glides, 0, "orbiters must drop their interpolation state");
}

#[test]
fn test_active_particles_removed_when_tower_dies() {
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 4, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);
    assert_eq!(count_active(&engine, tower, ResourceKind::Pollen), 4);

    host.remove_emitter(tower);
    engine.tick(&mut host, 0.1);
    assert_eq!(engine.world().query::<&Particle>().iter().count(), 0);
}

// ---- Launch queueing ----

#[test]
fn test_launch_converts_requested_count_at_position() {
    // Scenario: 5 orbiting pollen, launch request (pollen, 3) at (100,100).
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 5, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);

    engine.enqueue_launch(tower, ResourceKind::Pollen, 3);
    engine.trigger_launch(tower, LaunchTarget::at(Vec2::new(100.0, 100.0)), &host);

    assert_eq!(count_phase(&engine, tower, ParticlePhase::Launch), 3);
    assert_eq!(count_phase(&engine, tower, ParticlePhase::Orbit), 2);

    for (_, glide) in engine.world().query::<&Glide>().iter() {
        assert_eq!(glide.target, Vec2::new(100.0, 100.0));
        assert!(glide.tracked_unit.is_none());
    }
}

#[test]
fn test_launch_without_resolvable_target_is_discarded() {
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 3, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);

    engine.enqueue_launch(tower, ResourceKind::Pollen, 2);
    // Neither a position nor a live unit: the request must be dropped.
    engine.trigger_launch(tower, LaunchTarget::default(), &host);
    assert_eq!(count_phase(&engine, tower, ParticlePhase::Launch), 0);

    // A later trigger with a valid target finds no backlog.
    engine.trigger_launch(tower, LaunchTarget::at(Vec2::new(50.0, 50.0)), &host);
    assert_eq!(count_phase(&engine, tower, ParticlePhase::Launch), 0);
}

#[test]
fn test_launch_tracks_moving_unit() {
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 1, 0, 100.0);
    let runner = host.add_unit(50, 200.0, 0.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);

    engine.enqueue_launch(tower, ResourceKind::Pollen, 1);
    engine.trigger_launch(tower, LaunchTarget::tracking(runner), &host);

    // The unit keeps moving while the particle is in flight.
    for step in 1..=3 {
        host.move_unit(runner, 200.0 + step as f32 * 20.0, 30.0);
        engine.tick(&mut host, 0.1);
    }
    host.move_unit(runner, 300.0, 60.0);

    // Run until the launch completes and a cloud forms.
    for _ in 0..8 {
        engine.tick(&mut host, 0.1);
        if cloud_count(&engine) > 0 {
            break;
        }
    }
    assert_eq!(cloud_count(&engine), 1);
    let (_, cloud) = {
        let mut query = engine.world().query::<&SwarmCloud>();
        let (entity, cloud) = query.iter().next().expect("cloud should exist");
        (entity, cloud.clone())
    };
    // Impact landed on the unit's final position, not its launch-time one.
    assert!((cloud.position - Vec2::new(300.0, 60.0)).length() < 1e-3);
}

// ---- Swarm clouds ----

#[test]
fn test_simultaneous_impacts_bin_into_one_cloud() {
    // 2 pollen + 1 nectar arriving in the same tick at the same point:
    // one cloud, duration 1.0 + 3*0.02 = 1.06, instant stun 0.14s.
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 2, 1, 100.0);
    let victim = host.add_unit(10, 60.0, 60.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);

    engine.enqueue_launch(tower, ResourceKind::Pollen, 2);
    engine.enqueue_launch(tower, ResourceKind::Nectar, 1);
    engine.trigger_launch(tower, LaunchTarget::at(Vec2::new(60.0, 60.0)), &host);

    // One long tick completes every glide simultaneously.
    engine.tick(&mut host, 1.0);

    assert_eq!(cloud_count(&engine), 1);
    let (duration, pollen, nectar) = {
        let mut query = engine.world().query::<&SwarmCloud>();
        let (_, cloud) = query.iter().next().expect("cloud should exist");
        (cloud.duration_secs, cloud.pollen_shots, cloud.nectar_shots)
    };
    assert_eq!(pollen, 2);
    assert_eq!(nectar, 1);
    assert!((duration - 1.06).abs() < 1e-9);

    // Instant stun: 2*0.02 + 1*0.10 = 0.14s from cloud spawn.
    assert!(engine.is_stunned(victim));
    engine.tick(&mut host, 0.1);
    assert!(engine.is_stunned(victim));
    engine.tick(&mut host, 0.1);
    assert!(!engine.is_stunned(victim));
}

#[test]
fn test_cloud_damages_each_unit_at_most_once() {
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 1, 0, 100.0);
    let near = host.add_unit(10, 60.0, 60.0);
    let far = host.add_unit(11, 500.0, 500.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);

    engine.enqueue_launch(tower, ResourceKind::Pollen, 1);
    engine.trigger_launch(tower, LaunchTarget::at(Vec2::new(60.0, 60.0)), &host);

    // Short ticks until the cloud spawns; `near` sits inside the radius.
    for _ in 0..8 {
        engine.tick(&mut host, 0.2);
        if cloud_count(&engine) > 0 {
            break;
        }
    }
    assert_eq!(cloud_count(&engine), 1);
    let hits_on_near = |log: &[(UnitId, f64, EmitterId)]| {
        log.iter().filter(|(unit, _, _)| *unit == near).count()
    };
    // Damage starts the tick after the cloud forms.
    assert_eq!(hits_on_near(&host.damage_log), 0);
    engine.tick(&mut host, 0.1);
    assert_eq!(hits_on_near(&host.damage_log), 1);
    let (_, amount, source) = host.damage_log[0];
    assert!((amount - 35.0).abs() < 1e-9, "damage = attack * fraction");
    assert_eq!(source, tower);

    // Leave and re-enter the radius while the cloud lives: no second hit.
    host.move_unit(near, 500.0, 0.0);
    engine.tick(&mut host, 0.1);
    host.move_unit(near, 60.0, 60.0);
    engine.tick(&mut host, 0.1);
    assert_eq!(hits_on_near(&host.damage_log), 1);

    // A unit entering late is damaged once on entry.
    host.move_unit(far, 60.0, 60.0);
    engine.tick(&mut host, 0.1);
    let far_hits = host
        .damage_log
        .iter()
        .filter(|(unit, _, _)| *unit == far)
        .count();
    assert_eq!(far_hits, 1);
}

#[test]
fn test_cloud_expires_and_swarm_particles_fade_out() {
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 1, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);

    engine.enqueue_launch(tower, ResourceKind::Pollen, 1);
    engine.trigger_launch(tower, LaunchTarget::at(Vec2::new(80.0, 0.0)), &host);
    engine.tick(&mut host, 1.0);
    assert_eq!(cloud_count(&engine), 1);
    assert_eq!(count_phase(&engine, tower, ParticlePhase::Swarm), 1);

    // Cloud lifetime is 1.02s; swarm+fade is 1.35s. Run both out.
    for _ in 0..20 {
        engine.tick(&mut host, 0.1);
    }
    assert_eq!(cloud_count(&engine), 0);
    assert_eq!(count_phase(&engine, tower, ParticlePhase::Swarm), 0);
}

// ---- Shield coverage ----

#[test]
fn test_shield_linger_window() {
    // Shielder stops covering; the shield survives within the 160ms linger
    // window and drops strictly after.
    let mut host = StubHost::new();
    let shielder = host.add_unit(1, 0.0, 0.0);
    let covered = host.add_unit(2, 20.0, 0.0);
    host.shielders.push(Shielder {
        id: shielder,
        elite: false,
    });
    let mut engine = EffectsEngine::new(SimConfig::default());

    engine.tick(&mut host, 0.1);
    assert_eq!(engine.shield_mode(covered), Some(ShieldMode::Halve));

    // Move out of coverage (radius floor is 48px).
    host.move_unit(covered, 500.0, 0.0);
    engine.tick(&mut host, 0.1); // 100ms since refresh: lingering
    assert_eq!(engine.shield_mode(covered), Some(ShieldMode::Halve));

    let snapshot = engine.tick(&mut host, 0.1); // 200ms: dropped
    assert_eq!(engine.shield_mode(covered), None);
    assert!(snapshot
        .events
        .iter()
        .any(|event| matches!(event, EffectEvent::ShieldFaded { unit } if *unit == covered)));
}

#[test]
fn test_shield_reentry_within_linger_shows_no_gap() {
    let mut host = StubHost::new();
    let shielder = host.add_unit(1, 0.0, 0.0);
    let covered = host.add_unit(2, 20.0, 0.0);
    host.shielders.push(Shielder {
        id: shielder,
        elite: false,
    });
    let mut engine = EffectsEngine::new(SimConfig::default());
    engine.tick(&mut host, 0.1);

    host.move_unit(covered, 500.0, 0.0);
    engine.tick(&mut host, 0.1);
    assert_eq!(engine.shield_mode(covered), Some(ShieldMode::Halve));

    host.move_unit(covered, 20.0, 0.0);
    for _ in 0..5 {
        engine.tick(&mut host, 0.1);
        assert_eq!(engine.shield_mode(covered), Some(ShieldMode::Halve));
    }
}

#[test]
fn test_no_shielders_clears_shields_outright() {
    let mut host = StubHost::new();
    let shielder = host.add_unit(1, 0.0, 0.0);
    let covered = host.add_unit(2, 20.0, 0.0);
    host.shielders.push(Shielder {
        id: shielder,
        elite: false,
    });
    let mut engine = EffectsEngine::new(SimConfig::default());
    engine.tick(&mut host, 0.1);
    assert!(engine.shield_mode(covered).is_some());

    // All shielders gone: no linger, immediate clear.
    host.shielders.clear();
    engine.tick(&mut host, 0.01);
    assert_eq!(engine.shield_mode(covered), None);
}

#[test]
fn test_last_shielder_processed_wins() {
    let mut host = StubHost::new();
    let elite = host.add_unit(1, -10.0, 0.0);
    let common = host.add_unit(2, 10.0, 0.0);
    let covered = host.add_unit(3, 0.0, 0.0);
    host.shielders.push(Shielder {
        id: elite,
        elite: true,
    });
    host.shielders.push(Shielder {
        id: common,
        elite: false,
    });
    let mut engine = EffectsEngine::new(SimConfig::default());
    engine.tick(&mut host, 0.1);

    // Both cover the unit; the later-processed common shielder overwrote
    // the elite grant.
    assert_eq!(engine.shield_mode(covered), Some(ShieldMode::Halve));

    host.shielders.reverse();
    engine.tick(&mut host, 0.1);
    assert_eq!(engine.shield_mode(covered), Some(ShieldMode::Sqrt));
}

// ---- Supply transfers ----

#[test]
fn test_seed_arrivals_respect_destination_capacity() {
    let mut host = StubHost::new();
    let source = host.add_emitter(1, 0.0, 0.0, 0, 0, 100.0);
    let dest = host.add_emitter(2, 80.0, 0.0, 4, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());

    // Nectar payload forwarding two carried pollen: 1 nectar + 2 pollen.
    engine.begin_transfer(source, dest, ResourceKind::Nectar, 2);

    // One long tick: reconciliation spawns its batch of 3 first, then all
    // three seeds arrive; only one fits under desired=4.
    let snapshot = engine.tick(&mut host, 1.0);
    let arrivals = snapshot
        .events
        .iter()
        .filter(|event| matches!(event, EffectEvent::SeedArrived { .. }))
        .count();
    assert_eq!(arrivals, 1);
    assert_eq!(count_active(&engine, dest, ResourceKind::Pollen), 4);
    // The run is spent.
    assert_eq!(engine.world().query::<&SupplyRun>().iter().count(), 0);
}

#[test]
fn test_seeds_travel_along_link_then_convert() {
    let mut host = StubHost::new();
    let source = host.add_emitter(1, 0.0, 0.0, 0, 0, 100.0);
    // Desired counts start at zero so reconciliation spawns nothing while
    // the seed is in flight.
    let dest = host.add_emitter(2, 80.0, 0.0, 0, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());

    engine.begin_transfer(source, dest, ResourceKind::Nectar, 0);

    let snapshot = engine.tick(&mut host, 0.1);
    assert_eq!(snapshot.seeds.len(), 1);
    let seed = &snapshot.seeds[0];
    assert_eq!(seed.kind, ResourceKind::Nectar);
    assert!(seed.position.x >= 0.0 && seed.position.x <= 80.0);

    // Travel time is 0.8s. Just before arrival, raise desired well above
    // the spawn batch cap so the arriving seed finds roster capacity left
    // over after reconciliation's bounded batch.
    for _ in 0..6 {
        engine.tick(&mut host, 0.1);
    }
    host.set_desired(dest, 0, 10);

    let mut arrived = false;
    for _ in 0..4 {
        let before = count_active(&engine, dest, ResourceKind::Nectar);
        let snapshot = engine.tick(&mut host, 0.1);
        if snapshot
            .events
            .iter()
            .any(|event| matches!(event, EffectEvent::SeedArrived { emitter, kind }
                if *emitter == dest && *kind == ResourceKind::Nectar))
        {
            arrived = true;
            // Reconciliation contributed its batch of 3 this tick; the
            // seed arrived on top of it.
            assert_eq!(
                count_active(&engine, dest, ResourceKind::Nectar),
                before + 3 + 1
            );
            break;
        }
    }
    assert!(arrived, "seed should arrive and convert into a particle");
    assert_eq!(engine.world().query::<&SupplyRun>().iter().count(), 0);
}

#[test]
fn test_transfer_invalidated_when_endpoint_dies() {
    let mut host = StubHost::new();
    let source = host.add_emitter(1, 0.0, 0.0, 0, 0, 100.0);
    let dest = host.add_emitter(2, 80.0, 0.0, 0, 5, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());

    engine.begin_transfer(source, dest, ResourceKind::Pollen, 2);
    engine.tick(&mut host, 0.1);
    assert_eq!(engine.world().query::<&SupplyRun>().iter().count(), 1);

    host.remove_emitter(dest);
    let snapshot = engine.tick(&mut host, 0.1);
    assert_eq!(engine.world().query::<&SupplyRun>().iter().count(), 0);
    assert!(snapshot.seeds.is_empty());
    // Nothing ever arrived.
    assert!(!snapshot
        .events
        .iter()
        .any(|event| matches!(event, EffectEvent::SeedArrived { .. })));
}

// ---- Engine-level effect mutators ----

#[test]
fn test_slow_queries_through_engine_clock() {
    let mut host = StubHost::new();
    host.add_emitter(1, 0.0, 0.0, 0, 0, 0.0);
    let unit = host.add_unit(10, 0.0, 0.0);
    let mut engine = EffectsEngine::new(SimConfig::default());

    engine.apply_slow(unit, EmitterId(1), 0.5, 1.0);
    engine.apply_slow(unit, EmitterId(2), 0.3, 0.4);
    assert_eq!(engine.slow_multiplier(unit), 0.3);

    for _ in 0..5 {
        engine.tick(&mut host, 0.1);
    }
    // 0.5s in: the 0.3 slow expired, the 0.5 slow remains.
    assert_eq!(engine.slow_multiplier(unit), 0.5);

    for _ in 0..6 {
        engine.tick(&mut host, 0.1);
    }
    assert_eq!(engine.slow_multiplier(unit), 1.0);
}

#[test]
fn test_clear_all_effects_emits_timer_detach_events() {
    let mut host = StubHost::new();
    let unit = host.add_unit(10, 0.0, 0.0);
    let mut engine = EffectsEngine::new(SimConfig::default());

    engine.apply_slow(unit, EmitterId(3), 0.5, 10.0);
    engine.apply_slow(unit, EmitterId(1), 0.6, 10.0);
    engine.apply_stun(unit, 10.0, EmitterId(1));
    engine.clear_all_effects(unit);

    assert_eq!(engine.slow_multiplier(unit), 1.0);
    assert!(!engine.is_stunned(unit));

    let snapshot = engine.tick(&mut host, 0.1);
    let detached: Vec<EmitterId> = snapshot
        .events
        .iter()
        .filter_map(|event| match event {
            EffectEvent::SlowDetached { source, .. } => Some(*source),
            _ => None,
        })
        .collect();
    assert_eq!(detached, vec![EmitterId(1), EmitterId(3)]);
}

#[test]
fn test_reset_drops_all_transient_state() {
    let mut host = StubHost::new();
    let tower = host.add_emitter(1, 0.0, 0.0, 3, 0, 100.0);
    let unit = host.add_unit(10, 20.0, 0.0);
    let mut engine = EffectsEngine::new(SimConfig::default());
    settle(&mut engine, &mut host);
    engine.apply_stun(unit, 10.0, tower);
    engine.enqueue_launch(tower, ResourceKind::Pollen, 1);

    engine.reset();
    assert_eq!(engine.world().query::<&Particle>().iter().count(), 0);
    assert!(!engine.is_stunned(unit));

    // The queue was dropped with everything else.
    engine.trigger_launch(tower, LaunchTarget::at(Vec2::new(10.0, 10.0)), &host);
    assert_eq!(count_phase(&engine, tower, ParticlePhase::Launch), 0);
}

#[test]
fn test_bad_dt_is_neutralized() {
    let mut host = StubHost::new();
    host.add_emitter(1, 0.0, 0.0, 2, 0, 100.0);
    let mut engine = EffectsEngine::new(SimConfig::default());

    engine.tick(&mut host, f64::NAN);
    engine.tick(&mut host, -1.0);
    let elapsed = engine.time().elapsed_secs;
    assert_eq!(elapsed, 0.0);
    assert_eq!(engine.time().tick, 2);
}

// ---- Determinism ----

fn scripted_host() -> StubHost {
    let mut host = StubHost::new();
    host.add_emitter(1, 0.0, 0.0, 4, 2, 120.0);
    host.add_emitter(2, 160.0, 0.0, 3, 1, 80.0);
    let shielder = host.add_unit(20, 40.0, 40.0);
    host.add_unit(21, 55.0, 40.0);
    host.add_unit(22, 300.0, 300.0);
    host.shielders.push(Shielder {
        id: shielder,
        elite: true,
    });
    host
}

fn scripted_step(engine: &mut EffectsEngine, host: &mut StubHost, tick: u64) {
    if tick == 5 {
        engine.enqueue_launch(EmitterId(1), ResourceKind::Pollen, 2);
        engine.trigger_launch(EmitterId(1), LaunchTarget::at(Vec2::new(55.0, 40.0)), host);
    }
    if tick == 8 {
        engine.begin_transfer(EmitterId(1), EmitterId(2), ResourceKind::Nectar, 1);
    }
    if tick == 12 {
        host.move_unit(UnitId(21), 70.0, 45.0);
    }
}

#[test]
fn test_determinism_same_seed() {
    let mut host_a = scripted_host();
    let mut host_b = scripted_host();
    let mut engine_a = EffectsEngine::new(SimConfig { seed: 12345 });
    let mut engine_b = EffectsEngine::new(SimConfig { seed: 12345 });

    for tick in 0..60 {
        scripted_step(&mut engine_a, &mut host_a, tick);
        scripted_step(&mut engine_b, &mut host_b, tick);
        let snap_a = engine_a.tick(&mut host_a, 0.05);
        let snap_b = engine_b.tick(&mut host_b, 0.05);

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "snapshots diverged at tick {tick}");
    }
    assert_eq!(host_a.damage_log, host_b.damage_log);
}

#[test]
fn test_determinism_different_seeds_diverge() {
    let mut host_a = scripted_host();
    let mut host_b = scripted_host();
    let mut engine_a = EffectsEngine::new(SimConfig { seed: 111 });
    let mut engine_b = EffectsEngine::new(SimConfig { seed: 222 });

    // Orbit parameters are rolled from the seed, so particle positions
    // diverge as soon as rosters fill.
    let mut diverged = false;
    for tick in 0..20 {
        scripted_step(&mut engine_a, &mut host_a, tick);
        scripted_step(&mut engine_b, &mut host_b, tick);
        let json_a = serde_json::to_string(&engine_a.tick(&mut host_a, 0.05)).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick(&mut host_b, 0.05)).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "different seeds should produce divergent output");
}
