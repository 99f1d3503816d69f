//! Application core — pure domain logic, zero I/O.
//!
//! The [`agent`] composes the sensing pipeline, heartbeat scheduler,
//! connectivity supervisor and reporter into one cooperative loop.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod agent;
pub mod events;
pub mod ports;
