use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use busbridge::{
    boot::DEFAULT_FIRMWARE,
    bus::TracePins,
    console::StdioConsole,
    create_bridge, BridgeConfig,
};
use clap::Parser;
use log::{error, info};

/// Bridges a Z80's bus to emulated memory, a console and a virtual disk controller.
///
/// Without real pins attached the bus is driven from a recorded trace.
#[derive(Parser)]
#[command(name = "busbridge", version)]
struct Cli {
    /// Directory backing the virtual disk controller
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Firmware image inside the root, loaded at address 0
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_FIRMWARE)]
    firmware: String,

    /// Bus trace to replay, one cycle per line
    #[arg(short, long, value_name = "FILE")]
    trace: PathBuf,

    /// Stop after this many ticks
    #[arg(long, value_name = "TICKS")]
    max_ticks: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = BridgeConfig::new(cli.root).with_firmware(cli.firmware);
    let mut pins = match load_trace(&cli.trace) {
        Ok(pins) => pins,
        Err(error) => {
            error!("Couldn't load bus trace {}: {error}", cli.trace.display());
            return ExitCode::FAILURE;
        }
    };

    let mut machine = match create_bridge(&config, StdioConsole::new()) {
        Ok(machine) => machine,
        Err(error) => {
            error!("Halting: {error}");
            return ExitCode::FAILURE;
        }
    };
    // No program means nothing for the processor to run, so this is where the bridge stops
    if let Err(error) = machine.boot(&mut pins) {
        error!("Halting, couldn't boot {}: {error}", machine.firmware());
        return ExitCode::FAILURE;
    }

    let stats = machine.run(&mut pins, cli.max_ticks);
    info!(
        "{} ticks: {} memory reads, {} memory writes, {} I/O reads, {} I/O writes, {} idle",
        stats.ticks,
        stats.memory_reads,
        stats.memory_writes,
        stats.io_reads,
        stats.io_writes,
        stats.idle
    );
    ExitCode::SUCCESS
}

fn load_trace(path: &Path) -> Result<TracePins, Box<dyn Error>> {
    Ok(fs::read_to_string(path)?.parse()?)
}
