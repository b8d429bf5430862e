//! This module defines the register contract of the MC6850 ACIA the firmware's console driver talks to

/// Control register on write, status register on read
pub const CONTROL_STATUS_PORT: u8 = 0x80;
pub const DATA_PORT: u8 = 0x81;

// Control register
pub const CONTROL_DIVIDE_MASK: u8 = 0b0000_0011;
/// Both counter-divide bits set is the master reset request
pub const CONTROL_MASTER_RESET: u8 = 0b0000_0011;
pub const CONTROL_WORD_SELECT_MASK: u8 = 0b0001_1100;
pub const CONTROL_WORD_SELECT_SHIFT: u8 = 2;
pub const CONTROL_TRANSMIT_MASK: u8 = 0b0110_0000;
pub const CONTROL_TRANSMIT_SHIFT: u8 = 5;
pub const CONTROL_RX_INTERRUPT_ENABLE: u8 = 0b1000_0000;

// Status register
pub const STATUS_RX_FULL: u8 = 0b0000_0001;
pub const STATUS_TX_EMPTY: u8 = 0b0000_0010;
/// Carrier lost, never reported
pub const STATUS_DCD: u8 = 0b0000_0100;
/// Clear-to-send negated, never reported
pub const STATUS_CTS: u8 = 0b0000_1000;
pub const STATUS_IRQ: u8 = 0b1000_0000;
