//! Byte-level encoding of TraCI messages (all integers big-endian)

use super::error::TraciError;

/// Append-only buffer for building command content
#[derive(Debug, Default, Clone)]
pub struct Storage {
    bytes: Vec<u8>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_f64(&mut self, value: f64) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Length-prefixed string
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.write_i32(value.len() as i32);
        self.bytes.extend_from_slice(value.as_bytes());
        self
    }

    /// Appends a whole command: header (short or long form), id and content
    pub fn write_command(&mut self, id: u8, content: &[u8]) -> &mut Self {
        let short_len = 1 + 1 + content.len();
        if short_len <= u8::MAX as usize {
            self.write_u8(short_len as u8);
        } else {
            self.write_u8(0);
            self.write_i32((1 + 4 + 1 + content.len()) as i32);
        }
        self.write_u8(id);
        self.bytes.extend_from_slice(content);
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Wraps the buffer into a message, prefixed with its total length
    pub fn into_message(self) -> Vec<u8> {
        let total = (4 + self.bytes.len()) as i32;
        let mut message = Vec::with_capacity(total as usize);
        message.extend_from_slice(&total.to_be_bytes());
        message.extend_from_slice(&self.bytes);
        message
    }
}

/// Cursor over a received message body
#[derive(Debug)]
pub struct StorageReader {
    bytes: Vec<u8>,
    position: usize,
}

impl StorageReader {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn take(&mut self, count: usize) -> Result<&[u8], TraciError> {
        if self.remaining() < count {
            return Err(TraciError::Protocol(format!(
                "needed {} more bytes at offset {}, only {} left",
                count,
                self.position,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], TraciError> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8, TraciError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32, TraciError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, TraciError> {
        Ok(f64::from_be_bytes(self.take_array()?))
    }

    pub fn read_string(&mut self) -> Result<String, TraciError> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(TraciError::Protocol(format!("negative string length {}", len)));
        }
        let bytes = self.take(len as usize)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Reads a command header, returning (content length, command id)
    pub fn read_command_header(&mut self) -> Result<(usize, u8), TraciError> {
        let short_len = self.read_u8()?;
        let (len, header) = if short_len == 0 {
            (self.read_i32()? as usize, 1 + 4 + 1)
        } else {
            (short_len as usize, 1 + 1)
        };
        let id = self.read_u8()?;
        if len < header {
            return Err(TraciError::Protocol(format!(
                "command 0x{:02x} declares length {}",
                id, len
            )));
        }
        Ok((len - header, id))
    }
}
