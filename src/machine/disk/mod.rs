//! Register-mapped virtual disk controller
//!
//! The firmware drives this controller through a handful of I/O ports (see [`constants`]): it spells
//! a filename one byte at a time, issues a command, sets up a seek position and a DMA address, then
//! triggers block transfers of [`QUANTUM`] bytes between the open file and memory.
//!
//! There is exactly one [`DiskSession`]: at most one open file and at most one directory cursor.
//! Nothing here ever reports an error back as a Rust error past the port boundary, failures only show
//! up in the status register and in the block result byte.

pub mod constants;
pub mod directory;
pub mod volume;

use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom, Write},
    path::PathBuf,
};

use log::{debug, trace, warn};
use thiserror::Error;

// Since the «constants» module provides the port contract this controller implements, everything from there is imported without an alias
use self::constants::*;
use self::directory::DirCursor;
pub use self::volume::Volume;
use super::memory::MemoryArray;

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("no file is open")]
    NoFile,
    #[error("no filename was supplied")]
    NoName,
    #[error("unknown command {0:#04x}")]
    UnknownCommand(u8),
    #[error("unknown block operation {0:#04x}")]
    UnknownBlockOp(u8),
    #[error("invalid filename {0:?}")]
    InvalidName(String),
    #[error("volume root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("volume root {} is unavailable: {source}", .root.display())]
    Unavailable {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("backing store failure: {0}")]
    Io(#[from] io::Error),
}

impl DiskError {
    /// Whether this is the firmware asking for something the current session state doesn't allow,
    /// as opposed to the backing store failing
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::NoFile | Self::NoName | Self::UnknownCommand(_) | Self::UnknownBlockOp(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    OpenRead,
    Create,
    OpenAppend,
    SeekToStart,
    Close,
    ListDirectory,
    OpenReadWrite,
    Seek,
}

impl TryFrom<u8> for Command {
    type Error = DiskError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            CMD_OPEN_READ => Self::OpenRead,
            CMD_CREATE => Self::Create,
            CMD_OPEN_APPEND => Self::OpenAppend,
            CMD_SEEK_TO_START => Self::SeekToStart,
            CMD_CLOSE => Self::Close,
            CMD_LIST_DIRECTORY => Self::ListDirectory,
            CMD_OPEN_READWRITE => Self::OpenReadWrite,
            CMD_SEEK => Self::Seek,
            other => return Err(DiskError::UnknownCommand(other)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Create,
    Append,
    ReadWrite,
}

impl OpenMode {
    fn writable(self) -> bool {
        !matches!(self, Self::Read)
    }
}

#[derive(Debug)]
struct OpenFile {
    file: File,
    name: String,
    mode: OpenMode,
}

impl OpenFile {
    fn has_remaining(&mut self) -> io::Result<bool> {
        let position = self.file.stream_position()?;
        Ok(position < self.file.metadata()?.len())
    }

    fn close(self) {
        if self.mode.writable() {
            if let Err(error) = self.file.sync_all() {
                warn!("Failed to flush {} on close: {error}", self.name);
            }
        }
        debug!("Closed {}", self.name);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskStatus {
    pub ready: bool,
    pub error: bool,
    pub data_available: bool,
}

impl From<DiskStatus> for u8 {
    fn from(status: DiskStatus) -> Self {
        let mut value = 0;
        if status.ready {
            value |= STATUS_READY;
        }
        if status.error {
            value |= STATUS_ERROR;
        }
        if status.data_available {
            value |= STATUS_DATA_AVAILABLE;
        }
        value
    }
}

/// Everything the controller remembers between port accesses
#[derive(Debug, Default)]
pub struct DiskSession {
    last_command: Option<Command>,
    filename: Vec<u8>,
    /// A zero byte has terminated `filename`
    name_committed: bool,
    file: Option<OpenFile>,
    directory: Option<DirCursor>,
    seek: [u8; 3],
    dma: u16,
    block_result: u8,
    error: bool,
}

impl DiskSession {
    pub fn last_command(&self) -> Option<Command> {
        self.last_command
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn open_file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|file| file.name.as_str())
    }

    pub fn has_directory(&self) -> bool {
        self.directory.is_some()
    }

    /// No file handle and no directory cursor
    pub fn is_idle(&self) -> bool {
        self.file.is_none() && self.directory.is_none()
    }

    pub fn pending_filename(&self) -> &[u8] {
        &self.filename
    }

    pub fn seek_position(&self) -> u32 {
        u32::from_le_bytes([self.seek[0], self.seek[1], self.seek[2], 0]) & SEEK_MASK
    }

    pub fn dma_address(&self) -> u16 {
        self.dma
    }

    pub fn block_result(&self) -> u8 {
        self.block_result
    }

    pub fn error(&self) -> bool {
        self.error
    }

    fn push_filename(&mut self, byte: u8) {
        if byte == 0 {
            self.name_committed = true;
            return;
        }
        if self.name_committed {
            // A new name started without the previous one being used
            self.filename.clear();
            self.name_committed = false;
        }
        self.filename.push(byte);
    }

    fn take_filename(&mut self) -> Vec<u8> {
        self.name_committed = false;
        std::mem::take(&mut self.filename)
    }
}

pub struct DiskController {
    volume: Volume,
    session: DiskSession,
}

impl DiskController {
    pub fn new(volume: Volume) -> Self {
        Self {
            volume,
            session: DiskSession::default(),
        }
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn session(&self) -> &DiskSession {
        &self.session
    }

    pub fn read_port(&mut self, port: u8) -> Option<u8> {
        match port {
            STATUS_PORT => Some(self.status().into()),
            DATA_PORT => Some(self.read_data()),
            BLOCK_PORT => Some(self.session.block_result),
            _ => None,
        }
    }

    pub fn write_port(&mut self, port: u8, value: u8, memory: &mut MemoryArray) -> bool {
        match port {
            COMMAND_PORT => self.command(value),
            DATA_PORT => self.write_data(value),
            FILENAME_PORT => self.session.push_filename(value),
            SEEK_LOW_PORT => self.session.seek[0] = value,
            SEEK_MID_PORT => self.session.seek[1] = value,
            SEEK_HIGH_PORT => self.session.seek[2] = value,
            DMA_LOW_PORT => self.session.dma = (self.session.dma & 0xff00) | value as u16,
            DMA_HIGH_PORT => self.session.dma = (self.session.dma & 0x00ff) | (value as u16) << 8,
            BLOCK_PORT => self.block(value, memory),
            _ => return false,
        }
        true
    }

    pub fn status(&mut self) -> DiskStatus {
        let data_available = match (&self.session.directory, self.session.file.as_mut()) {
            (Some(cursor), _) => !cursor.is_exhausted(),
            (None, Some(file)) => file.has_remaining().unwrap_or(false),
            (None, None) => false,
        };
        DiskStatus {
            ready: !self.session.error,
            error: self.session.error,
            data_available,
        }
    }

    pub fn command(&mut self, value: u8) {
        let result = Command::try_from(value).and_then(|command| {
            debug!("Disk command {:?}", command);
            self.execute(command)?;
            self.session.last_command = Some(command);
            Ok(())
        });
        self.finish(result);
    }

    fn execute(&mut self, command: Command) -> Result<(), DiskError> {
        match command {
            Command::OpenRead => self.open(OpenMode::Read),
            Command::Create => self.open(OpenMode::Create),
            Command::OpenAppend => self.open(OpenMode::Append),
            Command::OpenReadWrite => self.open(OpenMode::ReadWrite),
            Command::SeekToStart => self.seek_to(0),
            Command::Seek => self.seek_to(self.session.seek_position() as u64),
            Command::ListDirectory => self.list_directory(),
            Command::Close => {
                self.close();
                Ok(())
            }
        }
    }

    /// Records the outcome of an operation in the status register
    fn finish<T>(&mut self, result: Result<T, DiskError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.session.error = false;
                Some(value)
            }
            Err(error) => {
                debug!("Disk operation failed: {error}");
                self.session.error = true;
                None
            }
        }
    }

    fn open(&mut self, mode: OpenMode) -> Result<(), DiskError> {
        // The name is used up even if opening fails
        let name = self.session.take_filename();
        if name.is_empty() {
            return Err(DiskError::NoName);
        }
        let name = String::from_utf8_lossy(&name).into_owned();
        let file = match mode {
            OpenMode::Read => self.volume.open_read(&name)?,
            OpenMode::Create => self.volume.create(&name)?,
            OpenMode::Append => self.volume.open_append(&name)?,
            OpenMode::ReadWrite => self.volume.open_read_write(&name)?,
        };
        debug!("Opened {name} ({mode:?})");
        if let Some(previous) = self.session.file.replace(OpenFile { file, name, mode }) {
            previous.close();
        }
        Ok(())
    }

    fn seek_to(&mut self, position: u64) -> Result<(), DiskError> {
        let file = self.session.file.as_mut().ok_or(DiskError::NoFile)?;
        file.file.seek(SeekFrom::Start(position))?;
        trace!("Seeked {} to {position:#08x}", file.name);
        Ok(())
    }

    fn list_directory(&mut self) -> Result<(), DiskError> {
        let cursor = DirCursor::new(self.volume.list()?);
        self.session.directory = if cursor.is_exhausted() {
            debug!("Directory is empty");
            None
        } else {
            Some(cursor)
        };
        Ok(())
    }

    fn close(&mut self) {
        if let Some(file) = self.session.file.take() {
            file.close();
        }
        if self.session.directory.take().is_some() {
            debug!("Closed directory listing");
        }
    }

    fn read_data(&mut self) -> u8 {
        let result = self.next_data_byte();
        self.finish(result).unwrap_or(0)
    }

    fn next_data_byte(&mut self) -> Result<u8, DiskError> {
        if let Some(cursor) = self.session.directory.as_mut() {
            let byte = cursor.next_byte().unwrap_or(0);
            if cursor.is_exhausted() {
                debug!("Directory listing finished");
                self.session.directory = None;
            }
            return Ok(byte);
        }
        let file = self.session.file.as_mut().ok_or(DiskError::NoFile)?;
        let mut byte = [0u8; 1];
        loop {
            match file.file.read(&mut byte) {
                Ok(0) => return Ok(0),
                Ok(_) => return Ok(byte[0]),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            }
        }
    }

    fn write_data(&mut self, value: u8) {
        let result = match self.session.file.as_mut() {
            Some(file) => file.file.write_all(&[value]).map_err(DiskError::from),
            None => Err(DiskError::NoFile),
        };
        self.finish(result);
    }

    fn block(&mut self, operation: u8, memory: &mut MemoryArray) {
        let result = match operation {
            BLOCK_READ => self.block_read(memory),
            BLOCK_WRITE => self.block_write(memory),
            other => Err(DiskError::UnknownBlockOp(other)),
        };
        self.session.block_result = match &result {
            Ok(()) => BLOCK_OK,
            Err(error) if error.is_protocol() => BLOCK_PROTOCOL_FAILURE,
            Err(_) => BLOCK_STORAGE_FAILURE,
        };
        self.finish(result);
    }

    /// Moves one quantum from the file into memory at the DMA address, zero-padding past end of file
    fn block_read(&mut self, memory: &mut MemoryArray) -> Result<(), DiskError> {
        let dma = self.session.dma;
        let file = self.session.file.as_mut().ok_or(DiskError::NoFile)?;
        let start = file.file.stream_position()?;
        let mut buffer = [0u8; QUANTUM];
        if let Err(error) = read_quantum(&mut file.file, &mut buffer)
            .and_then(|_| file.file.seek(SeekFrom::Start(start + QUANTUM as u64)))
        {
            // Leave the position where it was before the transfer
            let _ = file.file.seek(SeekFrom::Start(start));
            return Err(error.into());
        }
        memory.write_block(dma, &buffer);
        trace!(
            "Block read {} @ {start:#08x} -> memory {dma:#06x}",
            file.name
        );
        Ok(())
    }

    /// Moves one quantum from memory at the DMA address into the file and flushes it to the backing store
    fn block_write(&mut self, memory: &MemoryArray) -> Result<(), DiskError> {
        let dma = self.session.dma;
        let file = self.session.file.as_mut().ok_or(DiskError::NoFile)?;
        let start = file.file.stream_position()?;
        let mut buffer = [0u8; QUANTUM];
        memory.read_block(dma, &mut buffer);
        if let Err(error) = file
            .file
            .write_all(&buffer)
            .and_then(|_| file.file.sync_data())
        {
            let _ = file.file.seek(SeekFrom::Start(start));
            return Err(error.into());
        }
        trace!(
            "Block write memory {dma:#06x} -> {} @ {start:#08x}",
            file.name
        );
        Ok(())
    }
}

/// Reads until `buffer` is full or the file ends, returning how many bytes came from the file
fn read_quantum(file: &mut File, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match file.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(count) => filled += count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
    Ok(filled)
}
