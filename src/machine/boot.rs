use log::{error, info};
use thiserror::Error;

use super::{
    bus::Pins,
    disk::{DiskError, Volume},
    memory::{constants::LOAD_BASE, MemoryArray, MemoryError},
};

/// Name of the firmware image on the volume when nothing else is configured
pub const DEFAULT_FIRMWARE: &str = "boot.bin";

/// Startup failures; every one of them leaves the processor in reset for good
#[derive(Debug, Error)]
pub enum BootError {
    #[error("backing store failed to initialize: {0}")]
    Storage(#[source] DiskError),
    #[error("firmware image {name:?} could not be read: {source}")]
    MissingImage {
        name: String,
        #[source]
        source: DiskError,
    },
    #[error("firmware image {name:?} is empty")]
    EmptyImage { name: String },
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Holds the processor in reset, copies the firmware image to [`LOAD_BASE`], then releases it
///
/// Returns the number of bytes loaded. On error reset is never released.
pub fn load_firmware<P: Pins>(
    memory: &mut MemoryArray,
    volume: &Volume,
    name: &str,
    pins: &mut P,
) -> Result<usize, BootError> {
    pins.set_reset(true);
    let result = copy_image(memory, volume, name);
    match &result {
        Ok(len) => {
            info!("Loaded {name} ({len} bytes) at {LOAD_BASE:#06x}, releasing reset");
            pins.set_reset(false);
        }
        Err(error) => error!("Boot failed: {error}"),
    }
    result
}

fn copy_image(memory: &mut MemoryArray, volume: &Volume, name: &str) -> Result<usize, BootError> {
    let image = volume
        .read(name)
        .map_err(|source| BootError::MissingImage {
            name: name.to_owned(),
            source,
        })?;
    if image.is_empty() {
        return Err(BootError::EmptyImage {
            name: name.to_owned(),
        });
    }
    memory.load(LOAD_BASE, &image)?;
    Ok(image.len())
}
