use std::{
    io::{self, Read, Write},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

use log::{debug, warn};

use super::ConsoleIo;

/// Console collaborator on the host's standard streams
///
/// Reading stdin blocks, so a helper thread owned by this collaborator does it and hands bytes
/// over a channel. The tick loop only ever polls that channel.
pub struct StdioConsole {
    input: Receiver<u8>,
    peeked: Option<u8>,
    stdout: io::Stdout,
}

impl StdioConsole {
    pub fn new() -> Self {
        let (sender, input) = mpsc::channel();
        thread::spawn(move || {
            for byte in io::stdin().lock().bytes() {
                match byte {
                    Ok(byte) => {
                        if sender.send(byte).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!("Console input failed: {error}");
                        break;
                    }
                }
            }
            debug!("Console input closed");
        });
        Self {
            input,
            peeked: None,
            stdout: io::stdout(),
        }
    }

    fn poll(&mut self) {
        if self.peeked.is_none() {
            match self.input.try_recv() {
                Ok(byte) => self.peeked = Some(byte),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
            }
        }
    }
}

impl Default for StdioConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleIo for StdioConsole {
    fn send(&mut self, byte: u8) {
        let mut out = self.stdout.lock();
        if let Err(error) = out.write_all(&[byte]).and_then(|_| out.flush()) {
            warn!("Console output failed: {error}");
        }
    }

    fn input_available(&mut self) -> bool {
        self.poll();
        self.peeked.is_some()
    }

    fn receive(&mut self) -> Option<u8> {
        self.poll();
        self.peeked.take()
    }
}
