mod common;

use busbridge::{
    bus::BusSample,
    console::{
        constants::{
            CONTROL_RX_INTERRUPT_ENABLE, CONTROL_STATUS_PORT, DATA_PORT, STATUS_RX_FULL,
            STATUS_TX_EMPTY,
        },
        BufferedConsole,
    },
};
use common::Harness;

#[test]
fn data_write_transmits_exactly_one_byte() {
    let mut h = Harness::new();
    h.out(DATA_PORT, b'X');
    assert_eq!(h.machine.console.io().output(), b"X");
    assert_ne!(h.inp(CONTROL_STATUS_PORT) & STATUS_TX_EMPTY, 0);

    h.out(DATA_PORT, b'Y');
    assert_eq!(h.machine.console.io().output(), b"XY");
}

#[test]
fn reads_without_input_do_not_block() {
    let mut h = Harness::new();
    assert_eq!(h.inp(CONTROL_STATUS_PORT) & STATUS_RX_FULL, 0);
    // Nothing was ever received, the register still reads back
    assert_eq!(h.inp(DATA_PORT), 0);
    assert_eq!(h.inp(CONTROL_STATUS_PORT) & STATUS_RX_FULL, 0);
}

#[test]
fn received_bytes_are_consumed_once_per_read() {
    let mut h = Harness::with_console(BufferedConsole::with_input(b"ok"));
    assert_ne!(h.inp(CONTROL_STATUS_PORT) & STATUS_RX_FULL, 0);
    // Each IN holds the request for two clocks, only one byte may be taken
    assert_eq!(h.inp(DATA_PORT), b'o');
    assert_eq!(h.inp(DATA_PORT), b'k');
    assert_eq!(h.inp(CONTROL_STATUS_PORT) & STATUS_RX_FULL, 0);
    assert_eq!(h.inp(DATA_PORT), b'k');
}

/// Runs one idle tick and reports the interrupt line level driven on it
fn tick(h: &mut Harness) -> bool {
    h.pins.push(BusSample::idle());
    h.machine.tick(&mut h.pins);
    h.pins.last_record().unwrap().interrupt
}

#[test]
fn interrupt_follows_the_live_condition() {
    let mut h = Harness::new();

    // Input without the enable bit
    h.machine.console.io_mut().push_input(b"a");
    assert!(!tick(&mut h));

    h.out(CONTROL_STATUS_PORT, CONTROL_RX_INTERRUPT_ENABLE);
    assert!(tick(&mut h));
    assert!(tick(&mut h));

    // Consuming the byte drops the line on the very next tick
    assert_eq!(h.inp(DATA_PORT), b'a');
    assert!(!tick(&mut h));
    assert!(!tick(&mut h));

    h.machine.console.io_mut().push_input(b"b");
    assert!(tick(&mut h));

    h.out(CONTROL_STATUS_PORT, 0x00);
    assert!(!tick(&mut h));
}
