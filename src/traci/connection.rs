//! Blocking TraCI client

use log::{debug, info};
use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use super::constants::*;
use super::error::TraciError;
use super::storage::{Storage, StorageReader};

/// A connection to a running simulator. Every call sends one command and
/// blocks until the simulator has answered it.
pub struct Connection<S: Read + Write> {
    stream: S,
}

impl Connection<TcpStream> {
    /// Connects to a simulator listening on the loopback interface.
    ///
    /// The simulator was usually just spawned and may not be listening yet,
    /// so a refused connection is retried up to `attempts` times.
    pub fn connect(port: u16, attempts: u32, wait: Duration) -> Result<Self, TraciError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let mut attempt = 0;
        loop {
            attempt += 1;
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    info!("Connected to simulator on port {}", port);
                    return Ok(Self::new(stream));
                }
                Err(source) if attempt >= attempts => {
                    return Err(TraciError::ConnectFailed {
                        port,
                        attempts,
                        source,
                    });
                }
                Err(e) => {
                    debug!("Connection attempt {} to port {} failed: {}", attempt, port, e);
                    thread::sleep(wait);
                }
            }
        }
    }
}

impl<S: Read + Write> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Sends a single command and returns the response, positioned just
    /// after the status block
    fn send_command(&mut self, id: u8, content: &[u8]) -> Result<StorageReader, TraciError> {
        let mut storage = Storage::new();
        storage.write_command(id, content);
        self.stream.write_all(&storage.into_message())?;
        self.stream.flush()?;

        let mut response = self.receive()?;
        check_status(&mut response, id)?;
        Ok(response)
    }

    fn receive(&mut self) -> Result<StorageReader, TraciError> {
        let mut header = [0; 4];
        self.stream.read_exact(&mut header)?;
        let total = i32::from_be_bytes(header);
        if total < 4 {
            return Err(TraciError::Protocol(format!("message length {}", total)));
        }
        let mut body = vec![0; total as usize - 4];
        self.stream.read_exact(&mut body)?;
        Ok(StorageReader::new(body))
    }

    /// Returns the API version and the simulator's version string
    pub fn get_version(&mut self) -> Result<(i32, String), TraciError> {
        let mut response = self.send_command(CMD_GETVERSION, &[])?;
        let (_, id) = response.read_command_header()?;
        expect_id(CMD_GETVERSION, id)?;
        let api_version = response.read_i32()?;
        let version = response.read_string()?;
        Ok((api_version, version))
    }

    /// Advances the simulation. A target time of 0 performs exactly one step.
    pub fn simulation_step(&mut self, target_time: f64) -> Result<(), TraciError> {
        let mut content = Storage::new();
        content.write_f64(target_time);
        let mut response = self.send_command(CMD_SIMSTEP, content.as_bytes())?;
        // No subscriptions are ever made, so the count is all that follows
        let subscriptions = response.read_i32()?;
        if subscriptions != 0 {
            debug!("Ignoring {} subscription results", subscriptions);
        }
        Ok(())
    }

    /// Number of vehicles in the network plus those still waiting to depart
    pub fn min_expected_number(&mut self) -> Result<i32, TraciError> {
        let mut response = self.get_variable(
            CMD_GET_SIM_VARIABLE,
            VAR_MIN_EXPECTED_VEHICLES,
            "",
        )?;
        match response.read_u8()? {
            TYPE_INTEGER => response.read_i32(),
            other => Err(TraciError::Protocol(format!(
                "expected integer value, got type 0x{:02x}",
                other
            ))),
        }
    }

    /// Issues a get-variable command and returns the reader positioned at
    /// the value's type byte
    fn get_variable(
        &mut self,
        command: u8,
        variable: u8,
        object_id: &str,
    ) -> Result<StorageReader, TraciError> {
        let mut content = Storage::new();
        content.write_u8(variable).write_string(object_id);
        let mut response = self.send_command(command, content.as_bytes())?;

        let (_, id) = response.read_command_header()?;
        expect_id(command + RESPONSE_OFFSET, id)?;
        let returned_variable = response.read_u8()?;
        if returned_variable != variable {
            return Err(TraciError::Protocol(format!(
                "asked for variable 0x{:02x}, got 0x{:02x}",
                variable, returned_variable
            )));
        }
        response.read_string()?;
        Ok(response)
    }

    /// Tells the simulator to shut down and drops the connection
    pub fn close(mut self) -> Result<(), TraciError> {
        self.send_command(CMD_CLOSE, &[])?;
        Ok(())
    }
}

fn expect_id(expected: u8, actual: u8) -> Result<(), TraciError> {
    if expected != actual {
        return Err(TraciError::Protocol(format!(
            "expected response 0x{:02x}, got 0x{:02x}",
            expected, actual
        )));
    }
    Ok(())
}

/// Consumes the status block every response starts with
fn check_status(response: &mut StorageReader, command: u8) -> Result<(), TraciError> {
    let (_, id) = response.read_command_header()?;
    expect_id(command, id)?;
    let result = response.read_u8()?;
    let description = response.read_string()?;
    match result {
        RTYPE_OK => Ok(()),
        RTYPE_NOTIMPLEMENTED => Err(TraciError::NotImplemented { command }),
        _ => Err(TraciError::CommandFailed {
            command,
            description,
        }),
    }
}
