//! Junction Signal Simulation Library
//!
//! A discrete-event traffic-signal simulator for a four-way junction that can
//! be driven from a CLI, a dashboard, or tests.

pub mod simulation;
