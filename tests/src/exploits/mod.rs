//! # Attack Simulations
//!
//! Forged, tampered and replayed init data. Every case must end in a
//! rejection with a specific reason, never a panic.

pub mod forgery;
