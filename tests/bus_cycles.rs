mod common;

use busbridge::bus::{constants::FLOATING_BUS, BusCycle, BusSample, Pins, TracePins};
use common::Harness;

#[test]
fn memory_cycles_hit_the_array() {
    let mut h = Harness::new();
    h.pins
        .push(BusSample::memory_write(0x9000, 0xC9))
        .push(BusSample::memory_read(0x9000))
        .push(BusSample::memory_read(0x9001));
    assert_eq!(
        h.machine.tick(&mut h.pins),
        BusCycle::MemoryWrite {
            address: 0x9000,
            data: 0xC9
        }
    );
    assert_eq!(h.pins.last_record().unwrap().driven, None);
    h.machine.tick(&mut h.pins);
    assert_eq!(h.pins.last_record().unwrap().driven, Some(0xC9));
    h.machine.tick(&mut h.pins);
    assert_eq!(h.pins.last_record().unwrap().driven, Some(0x00));
}

#[test]
fn every_tick_ends_with_clock_low_and_bus_released() {
    let mut h = Harness::new();
    h.pins.push(BusSample::memory_read(0));
    h.machine.tick(&mut h.pins);
    assert!(!h.pins.clock());
    assert_eq!(h.pins.driving(), None);
}

#[test]
fn unmapped_ports_float() {
    let mut h = Harness::new();
    assert_eq!(h.inp(0x42), FLOATING_BUS);
    // Writes are dropped without disturbing anything
    h.out(0x42, 0x01);
    assert!(h.machine.disk.session().is_idle());
    assert!(h.machine.console.io().output().is_empty());
}

#[test]
fn write_only_disk_ports_float_on_read() {
    let mut h = Harness::new();
    assert_eq!(
        h.inp(busbridge::disk::constants::COMMAND_PORT),
        FLOATING_BUS
    );
}

#[test]
fn held_io_write_is_serviced_once() {
    let mut h = Harness::new();
    h.pins
        .push_held(BusSample::io_write(0x81, b'!'), 4)
        .push(BusSample::idle())
        .push(BusSample::io_write(0x81, b'!'));
    let stats = h.machine.run(&mut h.pins, None);
    assert_eq!(h.machine.console.io().output(), b"!!");
    assert_eq!(stats.io_writes, 2);
    assert_eq!(stats.ticks, 6);
}

#[test]
fn interrupt_acknowledge_gets_rst_38() {
    let mut h = Harness::new();
    h.pins.push(BusSample::interrupt_ack());
    assert_eq!(h.machine.tick(&mut h.pins), BusCycle::Idle);
    assert_eq!(h.pins.last_record().unwrap().driven, Some(0xFF));
}

#[test]
fn run_honours_the_tick_limit() {
    let mut h = Harness::new();
    h.pins.push_held(BusSample::idle(), 10);
    let stats = h.machine.run(&mut h.pins, Some(4));
    assert_eq!(stats.ticks, 4);
    assert_eq!(h.pins.remaining(), 6);
}

#[test]
fn replayed_trace_drives_a_console_program() {
    // Firmware fragment: LD A,'H' / OUT (81h),A / IN A,(80h), as the bus sees it
    let trace = "\
        MR 0000 *2\n\
        MR 0001 *2\n\
        MR 0002 *2\n\
        MR 0003 *2\n\
        IW 81 48 *3\n\
        MR 0004 *2\n\
        MR 0005 *2\n\
        IR 80 *3\n\
        --\n";
    let mut pins: TracePins = trace.parse().unwrap();
    let mut h = Harness::new();
    h.fill_memory(0x0000, &[0x3E, 0x48, 0xD3, 0x81, 0xDB, 0x80]);
    pins.set_reset(false);
    h.machine.run(&mut pins, None);

    assert_eq!(h.machine.console.io().output(), b"H");
    let driven: Vec<u8> = pins.driven().collect();
    assert_eq!(
        driven,
        [0x3E, 0x3E, 0x48, 0x48, 0xD3, 0xD3, 0x81, 0x81, 0xDB, 0xDB, 0x80, 0x80, 0x02, 0x02, 0x02]
    );
}
