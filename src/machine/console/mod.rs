pub mod constants;
pub mod stdio;

use std::collections::VecDeque;

use log::trace;

use self::constants::*;
pub use self::stdio::StdioConsole;

/// The outside end of the console: a byte-oriented duplex text stream
///
/// None of these methods may block, they're called from inside a bus cycle.
pub trait ConsoleIo {
    /// Transmits a byte, or queues it for transmission before returning
    fn send(&mut self, byte: u8);
    fn input_available(&mut self) -> bool;
    fn receive(&mut self) -> Option<u8>;
}

/// Console collaborator backed by in-memory queues
#[derive(Debug, Default)]
pub struct BufferedConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

impl ConsoleIo for BufferedConsole {
    fn send(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn input_available(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn receive(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterDivide {
    #[default]
    DivideBy1,
    DivideBy16,
    DivideBy64,
    MasterReset,
}

/// Transmitter control, bits 5 and 6 of the control register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransmitControl {
    #[default]
    RtsLowInterruptDisabled,
    RtsLowInterruptEnabled,
    RtsHighInterruptDisabled,
    RtsLowBreak,
}

impl TransmitControl {
    /// Whether request-to-send is asserted (the pin is active low)
    pub fn request_to_send(self) -> bool {
        !matches!(self, Self::RtsHighInterruptDisabled)
    }

    pub fn interrupt_enabled(self) -> bool {
        matches!(self, Self::RtsLowInterruptEnabled)
    }
}

/// Decoded control register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Control {
    pub divide: CounterDivide,
    /// Word length, parity and stop bits; stored but meaningless for a virtual line
    pub word_select: u8,
    pub transmit: TransmitControl,
    pub rx_interrupt_enabled: bool,
}

impl From<u8> for Control {
    fn from(value: u8) -> Self {
        let divide = match value & CONTROL_DIVIDE_MASK {
            0b00 => CounterDivide::DivideBy1,
            0b01 => CounterDivide::DivideBy16,
            0b10 => CounterDivide::DivideBy64,
            _ => CounterDivide::MasterReset,
        };
        let transmit = match (value & CONTROL_TRANSMIT_MASK) >> CONTROL_TRANSMIT_SHIFT {
            0b00 => TransmitControl::RtsLowInterruptDisabled,
            0b01 => TransmitControl::RtsLowInterruptEnabled,
            0b10 => TransmitControl::RtsHighInterruptDisabled,
            _ => TransmitControl::RtsLowBreak,
        };
        Self {
            divide,
            word_select: (value & CONTROL_WORD_SELECT_MASK) >> CONTROL_WORD_SELECT_SHIFT,
            transmit,
            rx_interrupt_enabled: value & CONTROL_RX_INTERRUPT_ENABLE != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    pub rx_full: bool,
    pub tx_empty: bool,
    pub irq: bool,
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        let mut value = 0;
        if status.rx_full {
            value |= STATUS_RX_FULL;
        }
        if status.tx_empty {
            value |= STATUS_TX_EMPTY;
        }
        if status.irq {
            value |= STATUS_IRQ;
        }
        // DCD and CTS stay clear: the virtual line always has carrier and is always clear to send
        value
    }
}

/// Register-level emulation of the serial interface chip in front of the console
pub struct Acia<C> {
    io: C,
    control: Control,
    tx_empty: bool,
    last_received: u8,
    last_transmitted: u8,
}

impl<C: ConsoleIo> Acia<C> {
    pub fn new(io: C) -> Self {
        Self {
            io,
            control: Control::default(),
            tx_empty: true,
            last_received: 0,
            last_transmitted: 0,
        }
    }

    pub fn io(&self) -> &C {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut C {
        &mut self.io
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn last_received(&self) -> u8 {
        self.last_received
    }

    pub fn last_transmitted(&self) -> u8 {
        self.last_transmitted
    }

    /// The receive interrupt condition, evaluated live against the collaborator
    pub fn interrupt_pending(&mut self) -> bool {
        self.control.rx_interrupt_enabled && self.io.input_available()
    }

    pub fn write_control(&mut self, value: u8) {
        let control = Control::from(value);
        if control.divide == CounterDivide::MasterReset {
            trace!("Console master reset");
            self.control = Control {
                divide: CounterDivide::MasterReset,
                ..Control::default()
            };
            self.tx_empty = true;
            return;
        }
        trace!("Console control {:#04x}: {:?}", value, control);
        self.control = control;
    }

    pub fn status(&mut self) -> Status {
        let rx_full = self.io.input_available();
        Status {
            rx_full,
            tx_empty: self.tx_empty,
            irq: rx_full && self.control.rx_interrupt_enabled,
        }
    }

    pub fn read_status(&mut self) -> u8 {
        self.status().into()
    }

    /// Returns the next received byte, or the last one again if nothing new has arrived
    pub fn read_data(&mut self) -> u8 {
        if let Some(byte) = self.io.receive() {
            self.last_received = byte;
        }
        self.last_received
    }

    pub fn write_data(&mut self, value: u8) {
        self.io.send(value);
        self.last_transmitted = value;
        // The collaborator has already taken the byte, so the transmit register is free again
        self.tx_empty = true;
    }

    pub fn read_port(&mut self, port: u8) -> Option<u8> {
        match port {
            CONTROL_STATUS_PORT => Some(self.read_status()),
            DATA_PORT => Some(self.read_data()),
            _ => None,
        }
    }

    pub fn write_port(&mut self, port: u8, value: u8) -> bool {
        match port {
            CONTROL_STATUS_PORT => self.write_control(value),
            DATA_PORT => self.write_data(value),
            _ => return false,
        }
        true
    }
}
