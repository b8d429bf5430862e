pub const MEMORY_SIZE: usize = 64 * (1 << 10); // 64 KiB, the whole 16-bit address space

/// The address the firmware image is loaded at, which is also where the processor starts fetching after reset
pub const LOAD_BASE: u16 = 0x0000;
