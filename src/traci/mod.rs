//! Minimal client for SUMO's TraCI remote control protocol.
//! See <https://sumo.dlr.de/docs/TraCI/Protocol.html>
//!
//! Only the commands needed to step a simulation to completion are
//! implemented.

mod connection;
mod error;
mod storage;

pub use connection::Connection;
pub use error::TraciError;
pub use storage::{Storage, StorageReader};

/// Command and type identifiers used on the wire
pub mod constants {
    pub const CMD_GETVERSION: u8 = 0x00;
    pub const CMD_SIMSTEP: u8 = 0x02;
    pub const CMD_CLOSE: u8 = 0x7F;
    pub const CMD_GET_SIM_VARIABLE: u8 = 0xAB;
    /// Get-variable responses use the command id plus this offset
    pub const RESPONSE_OFFSET: u8 = 0x10;

    pub const VAR_MIN_EXPECTED_VEHICLES: u8 = 0x7D;

    pub const TYPE_INTEGER: u8 = 0x09;

    pub const RTYPE_OK: u8 = 0x00;
    pub const RTYPE_NOTIMPLEMENTED: u8 = 0x01;
    pub const RTYPE_ERR: u8 = 0xFF;
}
