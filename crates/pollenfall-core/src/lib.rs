//! Core types and definitions for the Pollenfall combat-effects simulation.
//!
//! This crate defines the vocabulary shared across the engine and the host:
//! components, effect storage, commands, snapshot views, events, and
//! constants. It has no dependency on any rendering or runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod effects;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;
