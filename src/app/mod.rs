//! Application core: the monitor's domain logic behind port traits.
//!
//! [`session::LinkSession`] wires the telegram pipeline to the safety
//! evaluator and owns the link lifecycle.  All interaction with the serial
//! hardware, logging and configuration storage goes through the traits in
//! [`ports`], keeping this layer testable without a real sensor.

pub mod commands;
pub mod events;
pub mod ports;
pub mod session;
