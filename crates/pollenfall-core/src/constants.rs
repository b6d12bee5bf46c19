//! Simulation constants and tuning parameters.
//!
//! All distances are in screen pixels unless the name says meters; meter
//! values are converted per-frame through the host's render scale so
//! balance stays resolution-independent.

// --- Shield coverage ---

/// Floor on a shielder's coverage radius (pixels).
pub const SHIELD_MIN_RADIUS_PX: f32 = 48.0;

/// Coverage radius multiplier applied to the shielder's ring radius.
pub const SHIELD_RADIUS_SCALE: f32 = 2.6;

/// Grace window after losing coverage before the shield actually drops
/// (seconds). Prevents visible flicker across brief coverage gaps.
pub const SHIELD_LINGER_SECS: f64 = 0.16;

// --- Particle roster ---

/// Maximum particles spawned per tower/kind in a single reconciliation.
/// Trimming carries no such cap: the whole surplus goes in one pass.
pub const PARTICLE_SPAWN_BATCH_CAP: usize = 3;

/// Arrive glide duration range (seconds).
pub const ARRIVE_DURATION_MIN_SECS: f64 = 0.35;
pub const ARRIVE_DURATION_MAX_SECS: f64 = 0.65;

/// Launch glide duration range (seconds).
pub const LAUNCH_DURATION_MIN_SECS: f64 = 0.45;
pub const LAUNCH_DURATION_MAX_SECS: f64 = 0.75;

/// Orbit radius range around the owning tower (pixels).
pub const ORBIT_RADIUS_MIN_PX: f32 = 14.0;
pub const ORBIT_RADIUS_MAX_PX: f32 = 26.0;

/// Orbit angular speed range (radians per second).
pub const ORBIT_ANGULAR_SPEED_MIN: f32 = 0.9;
pub const ORBIT_ANGULAR_SPEED_MAX: f32 = 1.8;

/// Decorative pulse accumulation rate (radians per second).
pub const ORBIT_PULSE_RATE: f32 = 4.0;

// --- Swarm (post-impact) motion ---

/// Spin rate around the impact center (radians per second).
pub const SWARM_SPIN_RATE: f32 = 6.0;

/// Orbit radius around the impact center (pixels).
pub const SWARM_ORBIT_RADIUS_PX: f32 = 10.0;

/// Time spent swarming the impact center before the fade begins (seconds).
pub const SWARM_DURATION_SECS: f64 = 0.9;

/// Fade-out duration after the swarm phase (seconds).
pub const SWARM_FADE_SECS: f64 = 0.45;

/// Radial spread distance accumulated over the fade (pixels).
pub const SWARM_FADE_SPREAD_PX: f32 = 22.0;

// --- Swarm clouds ---

/// Base cloud lifetime (seconds).
pub const CLOUD_BASE_DURATION_SECS: f64 = 1.0;

/// Additional lifetime per contributing shot (seconds).
pub const CLOUD_PER_SHOT_DURATION_SECS: f64 = 0.02;

/// Cloud radius in meters, converted to pixels at spawn.
pub const CLOUD_RADIUS_M: f32 = 0.9;

/// Fraction of the owning tower's attack damage each cloud hit deals.
pub const CLOUD_DAMAGE_FRACTION: f64 = 0.35;

/// Instant stun per pollen shot when a cloud forms (seconds).
pub const POLLEN_CLOUD_STUN_SECS: f64 = 0.02;

/// Instant stun per nectar shot when a cloud forms (seconds).
pub const NECTAR_CLOUD_STUN_SECS: f64 = 0.10;

// --- Supply transfers ---

/// Cap on lower-tier seeds a payload may forward along with itself.
pub const SEED_CARRY_CAP: usize = 3;

/// Progress stagger between consecutive seeds of one transfer.
pub const SEED_PROGRESS_STAGGER: f32 = 0.08;

/// Base travel time along the tower link (seconds).
pub const SEED_TRAVEL_SECS: f64 = 0.8;

/// Lateral sway amplitude range (pixels).
pub const SEED_SWAY_AMPLITUDE_MIN_PX: f32 = 4.0;
pub const SEED_SWAY_AMPLITUDE_MAX_PX: f32 = 10.0;

/// Lateral sway frequency range (radians over the full link).
pub const SEED_SWAY_FREQUENCY_MIN: f32 = 6.0;
pub const SEED_SWAY_FREQUENCY_MAX: f32 = 11.0;
