pub mod constants;
pub mod trace;

use self::constants::*;
pub use self::trace::TracePins;

/// Processor control lines, decoded from their active-low pin levels to "asserted"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlLines {
    pub mreq: bool,
    pub iorq: bool,
    pub rd: bool,
    pub wr: bool,
    pub m1: bool,
}

impl ControlLines {
    fn io_read(self) -> bool {
        self.iorq && !self.m1 && self.rd
    }

    fn io_write(self) -> bool {
        self.iorq && !self.m1 && self.wr
    }

    fn interrupt_ack(self) -> bool {
        self.iorq && self.m1
    }
}

/// Everything read off the processor's pins in one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusSample {
    pub control: ControlLines,
    pub address: u16,
    pub data: u8,
}

impl BusSample {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn memory_read(address: u16) -> Self {
        Self {
            control: ControlLines {
                mreq: true,
                rd: true,
                ..Default::default()
            },
            address,
            data: 0,
        }
    }

    pub fn memory_write(address: u16, data: u8) -> Self {
        Self {
            control: ControlLines {
                mreq: true,
                wr: true,
                ..Default::default()
            },
            address,
            data,
        }
    }

    pub fn io_read(port: u8) -> Self {
        Self {
            control: ControlLines {
                iorq: true,
                rd: true,
                ..Default::default()
            },
            address: port as u16,
            data: 0,
        }
    }

    pub fn io_write(port: u8, data: u8) -> Self {
        Self {
            control: ControlLines {
                iorq: true,
                wr: true,
                ..Default::default()
            },
            address: port as u16,
            data,
        }
    }

    pub fn interrupt_ack() -> Self {
        Self {
            control: ControlLines {
                iorq: true,
                m1: true,
                ..Default::default()
            },
            address: 0,
            data: 0,
        }
    }

    pub fn port(&self) -> u8 {
        (self.address & PORT_MASK) as u8
    }
}

/// The pins the bridge is wired to
///
/// This is the hardware seam: an implementation owns the actual GPIO (or a simulation of it). Every
/// method must return promptly, the processor's clock is held while a tick runs.
pub trait Pins {
    fn set_clock(&mut self, high: bool);
    fn set_interrupt(&mut self, asserted: bool);
    fn set_reset(&mut self, asserted: bool);
    fn sample(&mut self) -> BusSample;
    fn drive_data(&mut self, value: u8);
    fn release_data(&mut self);

    /// Whether there is nothing left to clock, only simulated backends ever run out
    fn exhausted(&self) -> bool {
        false
    }
}

/// One classified bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusCycle {
    MemoryRead { address: u16 },
    MemoryWrite { address: u16, data: u8 },
    IoRead { port: u8 },
    IoWrite { port: u8, data: u8 },
    Idle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub ticks: u64,
    pub memory_reads: u64,
    pub memory_writes: u64,
    pub io_reads: u64,
    pub io_writes: u64,
    pub idle: u64,
}

impl CycleStats {
    fn record(&mut self, cycle: &BusCycle) {
        self.ticks += 1;
        match cycle {
            BusCycle::MemoryRead { .. } => self.memory_reads += 1,
            BusCycle::MemoryWrite { .. } => self.memory_writes += 1,
            BusCycle::IoRead { .. } => self.io_reads += 1,
            BusCycle::IoWrite { .. } => self.io_writes += 1,
            BusCycle::Idle => self.idle += 1,
        }
    }
}

/// Per-tick bus classification state
///
/// I/O requests stay asserted for several clocks, so the control lines of the previous tick are
/// kept to service each request only on the tick it first appears.
#[derive(Debug, Default)]
pub struct BusDriver {
    previous: ControlLines,
    /// Byte answered to the I/O read currently on the bus
    io_latch: u8,
    stats: CycleStats,
}

impl BusDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn classify(&mut self, sample: &BusSample) -> BusCycle {
        let now = sample.control;
        let previous = std::mem::replace(&mut self.previous, now);
        let cycle = if now.mreq && now.rd {
            BusCycle::MemoryRead {
                address: sample.address,
            }
        } else if now.mreq && now.wr {
            BusCycle::MemoryWrite {
                address: sample.address,
                data: sample.data,
            }
        } else if now.io_read() && !previous.io_read() {
            BusCycle::IoRead {
                port: sample.port(),
            }
        } else if now.io_write() && !previous.io_write() {
            BusCycle::IoWrite {
                port: sample.port(),
                data: sample.data,
            }
        } else {
            BusCycle::Idle
        };
        self.stats.record(&cycle);
        cycle
    }

    pub fn latch(&mut self, value: u8) {
        self.io_latch = value;
    }

    /// The byte to keep driving on an idle tick, if the bus still expects one
    ///
    /// Only meaningful right after [`BusDriver::classify`] returned [`BusCycle::Idle`] for the same sample.
    pub fn held_drive(&self) -> Option<u8> {
        if self.previous.io_read() {
            Some(self.io_latch)
        } else if self.previous.interrupt_ack() {
            Some(INTERRUPT_ACK_OPCODE)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cycles_are_serviced_every_tick() {
        let mut bus = BusDriver::new();
        let sample = BusSample::memory_read(0x1234);
        for _ in 0..3 {
            assert_eq!(
                bus.classify(&sample),
                BusCycle::MemoryRead { address: 0x1234 }
            );
        }
        assert_eq!(
            bus.classify(&BusSample::memory_write(0x8000, 0x3E)),
            BusCycle::MemoryWrite {
                address: 0x8000,
                data: 0x3E
            }
        );
    }

    #[test]
    fn held_io_requests_are_serviced_once() {
        let mut bus = BusDriver::new();
        let read = BusSample::io_read(0x81);
        assert_eq!(bus.classify(&read), BusCycle::IoRead { port: 0x81 });
        bus.latch(0x55);
        assert_eq!(bus.classify(&read), BusCycle::Idle);
        assert_eq!(bus.held_drive(), Some(0x55));
        assert_eq!(bus.classify(&read), BusCycle::Idle);

        assert_eq!(bus.classify(&BusSample::idle()), BusCycle::Idle);
        assert_eq!(bus.held_drive(), None);
        assert_eq!(bus.classify(&read), BusCycle::IoRead { port: 0x81 });

        let write = BusSample::io_write(0x10, 0x05);
        assert_eq!(
            bus.classify(&write),
            BusCycle::IoWrite {
                port: 0x10,
                data: 0x05
            }
        );
        assert_eq!(bus.classify(&write), BusCycle::Idle);
    }

    #[test]
    fn port_comes_from_the_low_address_byte() {
        let mut bus = BusDriver::new();
        let mut sample = BusSample::io_read(0x11);
        // IN A,(n) puts A on the high half of the address bus
        sample.address = 0x7F11;
        assert_eq!(bus.classify(&sample), BusCycle::IoRead { port: 0x11 });
    }

    #[test]
    fn interrupt_acknowledge_is_idle_but_answered() {
        let mut bus = BusDriver::new();
        assert_eq!(bus.classify(&BusSample::interrupt_ack()), BusCycle::Idle);
        assert_eq!(bus.held_drive(), Some(INTERRUPT_ACK_OPCODE));
    }

    #[test]
    fn stats_count_every_tick() {
        let mut bus = BusDriver::new();
        bus.classify(&BusSample::memory_read(0));
        bus.classify(&BusSample::io_write(0x81, b'A'));
        bus.classify(&BusSample::io_write(0x81, b'A'));
        bus.classify(&BusSample::idle());
        let stats = bus.stats();
        assert_eq!(stats.ticks, 4);
        assert_eq!(stats.memory_reads, 1);
        assert_eq!(stats.io_writes, 1);
        assert_eq!(stats.idle, 2);
    }
}
