//! Traffic demand: vehicle types and the random trips that use them

mod trips;
mod vehicle;

pub use trips::{RandomTrips, TripFiles};
pub use vehicle::{additional_xml, write_additional, VehicleType};
