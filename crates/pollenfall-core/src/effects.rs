//! Per-unit status effect storage: slows, stuns, and damage amplifiers.
//!
//! All maps are keyed by unit, then by the source tower that applied the
//! effect. Expiry is a plain timestamp comparison against the monotonic
//! clock passed into each call; stale entries are pruned lazily on the
//! next access, never by a background sweep. Bad inputs (non-finite
//! multipliers or durations) degrade to a no-op.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::enums::ShieldMode;
use crate::types::{EmitterId, UnitId};

/// A movement slow from one source tower.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Speed multiplier in [0, 1]; lower is slower.
    pub multiplier: f64,
    pub expires_at: f64,
}

/// A damage amplifier from one source tower.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DamageAmp {
    /// Damage multiplier, >= 1.
    pub multiplier: f64,
    pub expires_at: f64,
}

/// Proximity-granted shield coverage on one unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShieldState {
    pub mode: ShieldMode,
    /// The shielder unit that last refreshed this coverage.
    pub source: UnitId,
    /// Monotonic time of the last refresh; coverage lingers for a grace
    /// window past this before dropping.
    pub last_seen: f64,
}

/// Registry of transient status effects on hostile units.
#[derive(Debug, Clone, Default)]
pub struct StatusEffectRegistry {
    slows: HashMap<UnitId, HashMap<EmitterId, SlowEffect>>,
    stuns: HashMap<UnitId, HashMap<EmitterId, f64>>,
    amps: HashMap<UnitId, HashMap<EmitterId, DamageAmp>>,
}

impl StatusEffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply or replace a slow from `source`. Non-finite or non-positive
    /// durations and non-finite multipliers are ignored.
    pub fn apply_slow(
        &mut self,
        unit: UnitId,
        source: EmitterId,
        multiplier: f64,
        duration_secs: f64,
        now: f64,
    ) {
        if !multiplier.is_finite() || !duration_secs.is_finite() || duration_secs <= 0.0 {
            return;
        }
        self.slows.entry(unit).or_default().insert(
            source,
            SlowEffect {
                multiplier: multiplier.clamp(0.0, 1.0),
                expires_at: now + duration_secs,
            },
        );
    }

    /// Resolve the unit's effective speed multiplier: the minimum among all
    /// non-expired slows (most restrictive wins), or 1 if none remain.
    /// Purges expired entries and drops the unit's map once empty.
    pub fn slow_multiplier(&mut self, unit: UnitId, now: f64) -> f64 {
        let Some(map) = self.slows.get_mut(&unit) else {
            return 1.0;
        };
        map.retain(|_, slow| slow.expires_at > now && slow.multiplier.is_finite());
        let result = map
            .values()
            .map(|slow| slow.multiplier)
            .fold(1.0_f64, f64::min)
            .clamp(0.0, 1.0);
        if map.is_empty() {
            self.slows.remove(&unit);
        }
        result
    }

    /// Remove all slows on a unit. Returns the owning sources, sorted, so
    /// the caller can notify each owner to detach any per-unit timer it
    /// still holds.
    pub fn clear_slows(&mut self, unit: UnitId) -> Vec<EmitterId> {
        let mut sources: Vec<EmitterId> = self
            .slows
            .remove(&unit)
            .map(|map| map.into_keys().collect())
            .unwrap_or_default();
        sources.sort();
        sources
    }

    /// Apply a stun from `source`. A repeat application from the same
    /// source extends the expiry to max(existing, now + duration); it never
    /// sums durations. Non-positive or non-finite durations are a no-op.
    pub fn apply_stun(&mut self, unit: UnitId, duration_secs: f64, source: EmitterId, now: f64) {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return;
        }
        let expires_at = now + duration_secs;
        let entry = self.stuns.entry(unit).or_default().entry(source).or_insert(expires_at);
        if *entry < expires_at {
            *entry = expires_at;
        }
    }

    /// Whether the unit has any non-expired stun. Purges expired entries.
    pub fn is_stunned(&mut self, unit: UnitId, now: f64) -> bool {
        let Some(map) = self.stuns.get_mut(&unit) else {
            return false;
        };
        map.retain(|_, expires_at| *expires_at > now);
        if map.is_empty() {
            self.stuns.remove(&unit);
            return false;
        }
        true
    }

    /// Remove all stuns on a unit.
    pub fn clear_stuns(&mut self, unit: UnitId) {
        self.stuns.remove(&unit);
    }

    /// Apply or replace a damage amplifier from `source`.
    pub fn apply_damage_amp(
        &mut self,
        unit: UnitId,
        source: EmitterId,
        multiplier: f64,
        duration_secs: f64,
        now: f64,
    ) {
        if !multiplier.is_finite() || !duration_secs.is_finite() || duration_secs <= 0.0 {
            return;
        }
        self.amps.entry(unit).or_default().insert(
            source,
            DamageAmp {
                multiplier: multiplier.max(1.0),
                expires_at: now + duration_secs,
            },
        );
    }

    /// Resolve the unit's effective damage multiplier: the product of all
    /// non-expired amplifiers, or 1 if none remain.
    pub fn damage_multiplier(&mut self, unit: UnitId, now: f64) -> f64 {
        let Some(map) = self.amps.get_mut(&unit) else {
            return 1.0;
        };
        map.retain(|_, amp| amp.expires_at > now && amp.multiplier.is_finite());
        let result = map.values().map(|amp| amp.multiplier).product::<f64>();
        if map.is_empty() {
            self.amps.remove(&unit);
        }
        result
    }

    /// Remove all damage amplifiers on a unit.
    pub fn clear_damage_amps(&mut self, unit: UnitId) {
        self.amps.remove(&unit);
    }

    /// Bulk-clear every effect on a unit (death, breach, wave reset).
    /// Returns the slow sources so the caller can detach their timers.
    pub fn clear_all(&mut self, unit: UnitId) -> Vec<EmitterId> {
        let sources = self.clear_slows(unit);
        self.clear_stuns(unit);
        self.clear_damage_amps(unit);
        sources
    }

    /// Tick-start decay pass: purge every expired entry and drop empty
    /// per-unit maps.
    pub fn decay(&mut self, now: f64) {
        self.slows.retain(|_, map| {
            map.retain(|_, slow| slow.expires_at > now && slow.multiplier.is_finite());
            !map.is_empty()
        });
        self.stuns.retain(|_, map| {
            map.retain(|_, expires_at| *expires_at > now);
            !map.is_empty()
        });
        self.amps.retain(|_, map| {
            map.retain(|_, amp| amp.expires_at > now && amp.multiplier.is_finite());
            !map.is_empty()
        });
    }

    /// Drop all stored effects (full simulation reset).
    pub fn reset(&mut self) {
        self.slows.clear();
        self.stuns.clear();
        self.amps.clear();
    }
}
