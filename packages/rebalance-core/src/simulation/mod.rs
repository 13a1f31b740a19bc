//! Day-by-day rebalancing simulation.
//!
//! Walks every instrument in lockstep, valuing holdings at each close,
//! recording value and return, and resetting holdings to the target
//! allocation whenever the schedule is due.

mod engine;

pub use engine::{Simulation, SimulationState};
