//! SUMO grid experiments
//!
//! Generates grid road networks and traffic demand for the SUMO traffic
//! simulator, steps simulations to completion over TraCI and extracts the
//! aggregate emission and trip statistics an experiment design needs.

pub mod demand;
pub mod experiment;
pub mod network;
pub mod simulation;
pub mod tools;
pub mod traci;
pub mod xml;
