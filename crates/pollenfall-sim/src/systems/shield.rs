//! Shield coverage resolver.
//!
//! Each shielder grants a mitigation shield to every unit inside its
//! coverage radius. Coverage is refreshed per tick; a unit that falls out
//! of every shielder's radius keeps its shield for a short linger window
//! before it drops, so brief coverage gaps never flicker on screen.

use std::collections::{HashMap, HashSet};

use pollenfall_core::constants::{SHIELD_LINGER_SECS, SHIELD_MIN_RADIUS_PX, SHIELD_RADIUS_SCALE};
use pollenfall_core::effects::ShieldState;
use pollenfall_core::enums::ShieldMode;
use pollenfall_core::events::EffectEvent;
use pollenfall_core::types::UnitId;

use crate::host::BattlefieldView;

/// Run the shield coverage scan for one tick.
pub fn run<H: BattlefieldView>(
    shields: &mut HashMap<UnitId, ShieldState>,
    host: &H,
    now: f64,
    events: &mut Vec<EffectEvent>,
) {
    let shielders = host.shielders();

    if shielders.is_empty() {
        if !shields.is_empty() {
            let mut faded: Vec<UnitId> = shields.keys().copied().collect();
            faded.sort();
            for unit in faded {
                events.push(EffectEvent::ShieldFaded { unit });
            }
            shields.clear();
        }
        return;
    }

    let units = host.live_units();
    let live: HashSet<UnitId> = units.iter().copied().collect();
    let mut refreshed: HashSet<UnitId> = HashSet::new();

    // Shielders are processed in host order and each unconditionally
    // overwrites mode and source: last shielder processed wins.
    for shielder in &shielders {
        let Some(center) = host.unit_position(shielder.id) else {
            continue;
        };
        let ring_radius = host
            .unit_visual_metrics(shielder.id)
            .map(|metrics| metrics.ring_radius)
            .unwrap_or(0.0);
        let radius = SHIELD_MIN_RADIUS_PX.max(ring_radius * SHIELD_RADIUS_SCALE);
        let mode = if shielder.elite {
            ShieldMode::Sqrt
        } else {
            ShieldMode::Halve
        };

        for &unit in &units {
            if unit == shielder.id {
                continue;
            }
            let Some(position) = host.unit_position(unit) else {
                continue;
            };
            if position.distance(center) <= radius {
                shields.insert(
                    unit,
                    ShieldState {
                        mode,
                        source: shielder.id,
                        last_seen: now,
                    },
                );
                refreshed.insert(unit);
            }
        }
    }

    // Drop shields on dead units and shields whose linger window has
    // passed. A shield refreshed within the window survives the gap.
    let mut faded: Vec<UnitId> = Vec::new();
    shields.retain(|unit, state| {
        if !live.contains(unit) {
            return false;
        }
        if refreshed.contains(unit) || now - state.last_seen <= SHIELD_LINGER_SECS {
            return true;
        }
        faded.push(*unit);
        false
    });
    faded.sort();
    for unit in faded {
        events.push(EffectEvent::ShieldFaded { unit });
    }
}
