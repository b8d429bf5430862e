//! This module defines constants of the Z80 bus protocol as seen from the bridge

/// I/O instructions put the port number on the low half of the address bus
pub const PORT_MASK: u16 = 0x00ff;

/// Value seen by the processor when nothing drives the data bus (pull-ups)
pub const FLOATING_BUS: u8 = 0xff;

/// Answer to an interrupt acknowledge cycle: RST 38h, which is also where mode 1 vectors
pub const INTERRUPT_ACK_OPCODE: u8 = 0xff;
