use log::{debug, trace};
use thiserror::Error;

use self::{
    boot::BootError,
    bus::{constants::FLOATING_BUS, BusCycle, BusDriver, CycleStats, Pins},
    console::{Acia, ConsoleIo},
    disk::{DiskController, Volume},
    memory::MemoryArray,
};
use crate::config::BridgeConfig;

pub mod boot;
pub mod bus;
pub mod console;
pub mod disk;
pub mod memory;

/// The bridge: emulated memory and peripherals behind a physical processor's bus
///
/// Owns every piece of state the tick loop touches, so separate instances never share anything.
pub struct Machine<C> {
    pub memory: MemoryArray,
    pub console: Acia<C>,
    pub disk: DiskController,
    bus: BusDriver,
    firmware: String,
}

#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Boot(#[from] BootError),
}

impl<C: ConsoleIo> Machine<C> {
    pub fn new(volume: Volume, console: C, firmware: impl Into<String>) -> Self {
        Self {
            memory: MemoryArray::new(),
            console: Acia::new(console),
            disk: DiskController::new(volume),
            bus: BusDriver::new(),
            firmware: firmware.into(),
        }
    }

    /// Opens the configured volume; failing to do so is a fatal boot error
    pub fn from_config(config: &BridgeConfig, console: C) -> Result<Self, MachineError> {
        let volume = Volume::open(&config.root).map_err(BootError::Storage)?;
        Ok(Self::new(volume, console, config.firmware.clone()))
    }

    pub fn firmware(&self) -> &str {
        &self.firmware
    }

    pub fn stats(&self) -> CycleStats {
        self.bus.stats()
    }

    /// Loads the firmware and releases the processor from reset
    pub fn boot<P: Pins>(&mut self, pins: &mut P) -> Result<usize, MachineError> {
        Ok(boot::load_firmware(
            &mut self.memory,
            self.disk.volume(),
            &self.firmware,
            pins,
        )?)
    }

    /// Runs one bus cycle: the processor advances by exactly one clock
    pub fn tick<P: Pins>(&mut self, pins: &mut P) -> BusCycle {
        // Refreshed every tick, the line follows the live condition
        let interrupt = self.console.interrupt_pending();
        pins.set_interrupt(interrupt);

        pins.set_clock(true);
        let sample = pins.sample();
        let cycle = self.bus.classify(&sample);
        match cycle {
            BusCycle::MemoryRead { address } => pins.drive_data(self.memory.read(address)),
            BusCycle::MemoryWrite { address, data } => self.memory.write(address, data),
            BusCycle::IoRead { port } => {
                let value = self.io_read(port);
                self.bus.latch(value);
                pins.drive_data(value);
            }
            BusCycle::IoWrite { port, data } => self.io_write(port, data),
            BusCycle::Idle => {
                if let Some(value) = self.bus.held_drive() {
                    pins.drive_data(value);
                }
            }
        }

        pins.set_clock(false);
        pins.release_data();
        cycle
    }

    /// Ticks until `max_ticks` have run or the pins have nothing more to present
    pub fn run<P: Pins>(&mut self, pins: &mut P, max_ticks: Option<u64>) -> CycleStats {
        let mut ticks = 0;
        while !pins.exhausted() && max_ticks.map_or(true, |max| ticks < max) {
            self.tick(pins);
            ticks += 1;
        }
        debug!("Stopped after {ticks} ticks");
        self.stats()
    }

    fn io_read(&mut self, port: u8) -> u8 {
        let value = self
            .console
            .read_port(port)
            .or_else(|| self.disk.read_port(port));
        match value {
            Some(value) => {
                trace!("IN  {port:#04x} -> {value:#04x}");
                value
            }
            None => {
                debug!("Read from unmapped port {port:#04x}");
                FLOATING_BUS
            }
        }
    }

    fn io_write(&mut self, port: u8, data: u8) {
        trace!("OUT {port:#04x} <- {data:#04x}");
        let handled = self.console.write_port(port, data)
            || self.disk.write_port(port, data, &mut self.memory);
        if !handled {
            debug!("Write to unmapped port {port:#04x}");
        }
    }
}
