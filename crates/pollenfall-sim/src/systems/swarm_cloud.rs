//! Swarm cloud system: spawns area damage-over-time clouds from impact
//! signals and advances live clouds.
//!
//! Impacts landing on the same rounded coordinate within one tick are
//! binned into a single cloud so simultaneous multi-particle hits do not
//! stack duplicate clouds. Damage is idempotent per unit per cloud.

use glam::Vec2;
use hecs::{Entity, World};

use pollenfall_core::components::SwarmCloud;
use pollenfall_core::constants::*;
use pollenfall_core::effects::StatusEffectRegistry;
use pollenfall_core::enums::ResourceKind;
use pollenfall_core::events::{EffectEvent, Impact};
use pollenfall_core::types::EmitterId;

use crate::host::{BattlefieldView, DamageSink, RenderMetrics};
use crate::systems::particles::flush_despawns;

/// One impact group accumulated during binning.
struct ImpactBin {
    key: (i32, i32),
    position: Vec2,
    owner: EmitterId,
    pollen: u32,
    nectar: u32,
}

/// Advance every live cloud, then spawn clouds from this tick's impacts.
/// A cloud born this tick only applies its instant stun; aging and damage
/// start on the next tick.
pub fn run<H>(
    world: &mut World,
    effects: &mut StatusEffectRegistry,
    host: &mut H,
    impacts: &mut Vec<Impact>,
    now: f64,
    dt: f64,
    next_seq: &mut u64,
    events: &mut Vec<EffectEvent>,
    despawn_buffer: &mut Vec<Entity>,
) where
    H: BattlefieldView + RenderMetrics + DamageSink,
{
    advance(world, host, dt, despawn_buffer);
    flush_despawns(world, despawn_buffer);
    spawn_from_impacts(world, effects, host, impacts, now, next_seq, events);
}

/// Bin impacts by rounded coordinate and spawn one cloud per group.
fn spawn_from_impacts<H>(
    world: &mut World,
    effects: &mut StatusEffectRegistry,
    host: &H,
    impacts: &mut Vec<Impact>,
    now: f64,
    next_seq: &mut u64,
    events: &mut Vec<EffectEvent>,
) where
    H: BattlefieldView + RenderMetrics,
{
    if impacts.is_empty() {
        return;
    }

    // Linear-scan binning keeps group order identical to impact order.
    let mut bins: Vec<ImpactBin> = Vec::new();
    for impact in impacts.drain(..) {
        let key = (
            impact.position.x.round() as i32,
            impact.position.y.round() as i32,
        );
        match bins.iter_mut().find(|bin| bin.key == key) {
            Some(bin) => match impact.kind {
                ResourceKind::Pollen => bin.pollen += 1,
                ResourceKind::Nectar => bin.nectar += 1,
            },
            None => {
                let (pollen, nectar) = match impact.kind {
                    ResourceKind::Pollen => (1, 0),
                    ResourceKind::Nectar => (0, 1),
                };
                bins.push(ImpactBin {
                    key,
                    position: impact.position,
                    owner: impact.owner,
                    pollen,
                    nectar,
                });
            }
        }
    }

    let units = host.live_units();
    for bin in bins {
        let radius = host.meters_to_pixels(CLOUD_RADIUS_M);
        // Snapshot the owning tower's damage at spawn; a vanished tower
        // degrades to a harmless cloud rather than an error.
        let damage = host
            .emitter(bin.owner)
            .map(|spec| spec.attack_damage * CLOUD_DAMAGE_FRACTION)
            .unwrap_or(0.0);
        let total_shots = bin.pollen + bin.nectar;
        let duration_secs =
            CLOUD_BASE_DURATION_SECS + total_shots as f64 * CLOUD_PER_SHOT_DURATION_SECS;
        let stun_secs = bin.pollen as f64 * ResourceKind::Pollen.cloud_stun_secs()
            + bin.nectar as f64 * ResourceKind::Nectar.cloud_stun_secs();

        // One-time instant stun for units already inside the radius.
        if stun_secs > 0.0 {
            for &unit in &units {
                let Some(position) = host.unit_position(unit) else {
                    continue;
                };
                if position.distance(bin.position) <= radius {
                    effects.apply_stun(unit, stun_secs, bin.owner, now);
                }
            }
        }

        let id = *next_seq;
        *next_seq += 1;
        world.spawn((SwarmCloud {
            id,
            position: bin.position,
            radius,
            pollen_shots: bin.pollen,
            nectar_shots: bin.nectar,
            duration_secs,
            elapsed_secs: 0.0,
            owner: bin.owner,
            damage,
            hit_units: Default::default(),
        },));
        events.push(EffectEvent::CloudSpawned {
            position: bin.position,
            radius,
            owner: bin.owner,
        });
    }
}

/// Age clouds, damage newly covered units once each, expire finished clouds.
fn advance<H>(world: &mut World, host: &mut H, dt: f64, despawn_buffer: &mut Vec<Entity>)
where
    H: BattlefieldView + DamageSink,
{
    let units = host.live_units();

    for (entity, cloud) in world.query_mut::<&mut SwarmCloud>() {
        cloud.elapsed_secs += dt;
        if cloud.elapsed_secs >= cloud.duration_secs {
            despawn_buffer.push(entity);
            continue;
        }
        if cloud.damage <= 0.0 {
            continue;
        }
        for &unit in &units {
            if cloud.hit_units.contains(&unit) {
                continue;
            }
            let Some(position) = host.unit_position(unit) else {
                continue;
            };
            let reach = cloud.radius + host.unit_hit_radius(unit);
            if position.distance(cloud.position) <= reach {
                cloud.hit_units.insert(unit);
                host.apply_damage(unit, cloud.damage, cloud.owner);
            }
        }
    }
}
