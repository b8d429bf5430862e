pub mod constants;

use thiserror::Error;

// Since the «constants» module provides the specifications that are needed to implement this memory, everything from there is imported without an alias
use constants::*;

/// Byte store behind the processor's address space
///
/// Addresses are 16 bits wide so every address the bus can present is in range. Multi-byte
/// accesses that run past the top of memory wrap around to address 0.
pub struct MemoryArray {
    contents: Vec<u8>,
}

impl MemoryArray {
    pub fn new() -> Self {
        Self {
            contents: vec![0; MEMORY_SIZE],
        }
    }

    pub fn size(&self) -> usize {
        self.contents.len()
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn read(&self, address: u16) -> u8 {
        self.contents[address as usize]
    }

    pub fn write(&mut self, address: u16, value: u8) {
        self.contents[address as usize] = value;
    }

    /// Fills `buffer` starting at `start`, wrapping at the top of memory
    pub fn read_block(&self, start: u16, buffer: &mut [u8]) {
        let mut address = start;
        for byte in buffer.iter_mut() {
            *byte = self.read(address);
            address = address.wrapping_add(1);
        }
    }

    /// Copies `data` into memory starting at `start`, wrapping at the top of memory
    pub fn write_block(&mut self, start: u16, data: &[u8]) {
        let mut address = start;
        for &byte in data {
            self.write(address, byte);
            address = address.wrapping_add(1);
        }
    }

    /// Copies an image verbatim to `base`
    ///
    /// Unlike [`MemoryArray::write_block`] this refuses to wrap: an image that doesn't fit is an error.
    pub fn load(&mut self, base: u16, image: &[u8]) -> Result<(), MemoryError> {
        let start = base as usize;
        let end = start + image.len();
        if end > self.size() {
            return Err(MemoryError::ImageTooLarge {
                base,
                len: image.len(),
            });
        }
        self.contents[start..end].copy_from_slice(image);
        Ok(())
    }
}

impl Default for MemoryArray {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("image of {len} bytes does not fit in memory at {base:#06x}")]
    ImageTooLarge { base: u16, len: usize },
}
