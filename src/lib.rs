pub use machine::*;
use machine::console::ConsoleIo;

pub mod config;
pub mod machine;

pub use config::BridgeConfig;

pub fn create_bridge<C: ConsoleIo>(
    config: &BridgeConfig,
    console: C,
) -> Result<machine::Machine<C>, machine::MachineError> {
    machine::Machine::from_config(config, console)
}
