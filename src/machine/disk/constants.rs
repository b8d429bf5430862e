//! This module defines the port contract between the firmware's disk driver and the virtual disk controller

pub const COMMAND_PORT: u8 = 0x10;
pub const STATUS_PORT: u8 = 0x11;
pub const DATA_PORT: u8 = 0x12;
pub const FILENAME_PORT: u8 = 0x13;
pub const SEEK_LOW_PORT: u8 = 0x14;
pub const SEEK_MID_PORT: u8 = 0x15;
pub const SEEK_HIGH_PORT: u8 = 0x16;
pub const DMA_LOW_PORT: u8 = 0x17;
pub const DMA_HIGH_PORT: u8 = 0x18;
pub const BLOCK_PORT: u8 = 0x19;

// Command codes, written to COMMAND_PORT
pub const CMD_OPEN_READ: u8 = 0x01;
pub const CMD_CREATE: u8 = 0x02;
pub const CMD_OPEN_APPEND: u8 = 0x03;
pub const CMD_SEEK_TO_START: u8 = 0x04;
pub const CMD_CLOSE: u8 = 0x05;
pub const CMD_LIST_DIRECTORY: u8 = 0x06;
pub const CMD_OPEN_READWRITE: u8 = 0x07;
pub const CMD_SEEK: u8 = 0x08;

// Status bits, read from STATUS_PORT
pub const STATUS_READY: u8 = 0b0000_0001;
pub const STATUS_ERROR: u8 = 0b0000_0010;
pub const STATUS_DATA_AVAILABLE: u8 = 0b0000_0100;

// Block operations, written to BLOCK_PORT
pub const BLOCK_READ: u8 = 0;
pub const BLOCK_WRITE: u8 = 1;

// Block results, read back from BLOCK_PORT
pub const BLOCK_OK: u8 = 0;
pub const BLOCK_PROTOCOL_FAILURE: u8 = 1;
pub const BLOCK_STORAGE_FAILURE: u8 = 2;

/// Size of one block transfer, one CP/M sector
pub const QUANTUM: usize = 128;

/// Appended to every name produced by a directory listing
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Seek positions are assembled from three bytes
pub const SEEK_MASK: u32 = 0x00ff_ffff;
