#![allow(dead_code)]

use busbridge::{
    bus::{BusSample, Pins, TracePins},
    console::BufferedConsole,
    disk::{constants::*, Volume},
    machine::Machine,
};
use tempfile::TempDir;

/// A bridge on a scratch volume, driven one I/O instruction at a time
pub struct Harness {
    pub dir: TempDir,
    pub machine: Machine<BufferedConsole>,
    pub pins: TracePins,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_console(BufferedConsole::new())
    }

    pub fn with_console(console: BufferedConsole) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let volume = Volume::open(dir.path()).unwrap();
        Self {
            dir,
            machine: Machine::new(volume, console, "boot.bin"),
            pins: TracePins::new(),
        }
    }

    pub fn write_file(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.dir.path().join(name), contents).unwrap();
    }

    pub fn read_file(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.dir.path().join(name)).unwrap()
    }

    fn run_queued(&mut self) {
        while !self.pins.exhausted() {
            self.machine.tick(&mut self.pins);
        }
    }

    /// OUT (port), value: the request is held for two clocks, like a real I/O cycle
    pub fn out(&mut self, port: u8, value: u8) {
        self.pins
            .push_held(BusSample::io_write(port, value), 2)
            .push(BusSample::idle());
        self.run_queued();
    }

    /// IN value, (port)
    pub fn inp(&mut self, port: u8) -> u8 {
        self.pins
            .push_held(BusSample::io_read(port), 2)
            .push(BusSample::idle());
        let first = self.pins.records().len();
        self.run_queued();
        let records = &self.pins.records()[first..];
        let value = records[0].driven.expect("I/O read was not answered");
        assert_eq!(records[1].driven, Some(value), "held read must re-drive the same byte");
        value
    }

    pub fn filename(&mut self, name: &str) {
        for byte in name.bytes() {
            self.out(FILENAME_PORT, byte);
        }
        self.out(FILENAME_PORT, 0);
    }

    pub fn command(&mut self, command: u8) {
        self.out(COMMAND_PORT, command);
    }

    pub fn open(&mut self, command: u8, name: &str) {
        self.filename(name);
        self.command(command);
    }

    pub fn status(&mut self) -> u8 {
        self.inp(STATUS_PORT)
    }

    pub fn set_dma(&mut self, address: u16) {
        self.out(DMA_LOW_PORT, address as u8);
        self.out(DMA_HIGH_PORT, (address >> 8) as u8);
    }

    pub fn set_seek(&mut self, position: u32) {
        self.out(SEEK_LOW_PORT, position as u8);
        self.out(SEEK_MID_PORT, (position >> 8) as u8);
        self.out(SEEK_HIGH_PORT, (position >> 16) as u8);
    }

    /// Triggers a block operation and returns its result byte
    pub fn block(&mut self, operation: u8) -> u8 {
        self.out(BLOCK_PORT, operation);
        self.inp(BLOCK_PORT)
    }

    pub fn memory(&self, start: u16, len: usize) -> Vec<u8> {
        let mut buffer = vec![0; len];
        self.machine.memory.read_block(start, &mut buffer);
        buffer
    }

    pub fn fill_memory(&mut self, start: u16, data: &[u8]) {
        self.machine.memory.write_block(start, data);
    }
}
