//! Per-tick system passes, called by the engine in fixed order:
//! status-effect decay → shield coverage → particle lifecycle →
//! swarm clouds → supply runs → snapshot.

pub mod particles;
pub mod shield;
pub mod snapshot;
pub mod supply;
pub mod swarm_cloud;
