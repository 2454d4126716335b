//! Operator console sources

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tracing::debug;
use vitalwatch_core::traits::CommandSource;

/// Bytes typed on standard input, read on a background thread
pub struct StdinConsole {
    rx: Receiver<u8>,
}

impl StdinConsole {
    /// Start the reader thread
    ///
    /// The thread ends when stdin closes or the console is dropped.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for byte in io::stdin().lock().bytes() {
                let Ok(byte) = byte else { break };
                if tx.send(byte).is_err() {
                    break;
                }
            }
            debug!("Console input closed");
        });
        Self { rx }
    }
}

impl CommandSource for StdinConsole {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.try_recv().ok()
    }
}

/// Console fed programmatically
#[derive(Debug, Default)]
pub struct QueuedConsole {
    pending: VecDeque<u8>,
}

impl QueuedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_bytes(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes);
    }
}

impl CommandSource for QueuedConsole {
    fn read_byte(&mut self) -> Option<u8> {
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_bytes_in_order() {
        let mut console = QueuedConsole::new();
        console.type_bytes(b"b\n");
        assert_eq!(console.read_byte(), Some(b'b'));
        assert_eq!(console.read_byte(), Some(b'\n'));
        assert_eq!(console.read_byte(), None);
    }
}
