//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that hosts call
//! - **Outbound (Driven)**: Dependencies this crate needs (the clock)

pub mod inbound;
pub mod outbound;
