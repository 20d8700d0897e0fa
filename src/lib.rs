//! Region physics server: a rapier world whose objects can be driven by the
//! scripted vehicle actuator in [`vehicle`].

pub mod config;
pub mod error;
pub mod net;
pub mod physics;
pub mod schedule;
pub mod state;
pub mod terrain;
pub mod vehicle;
