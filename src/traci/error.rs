use std::io;
use thiserror::Error;

/// Errors raised while talking to the simulator over TraCI
#[derive(Debug, Error)]
pub enum TraciError {
    #[error("I/O error talking to the simulator")]
    Io(#[from] io::Error),

    #[error("could not connect to the simulator on port {port} after {attempts} attempts")]
    ConnectFailed {
        port: u16,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    #[error("command 0x{command:02x} failed: {description}")]
    CommandFailed { command: u8, description: String },

    #[error("command 0x{command:02x} is not implemented by the simulator")]
    NotImplemented { command: u8 },

    #[error("malformed response: {0}")]
    Protocol(String),
}
