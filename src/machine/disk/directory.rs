use std::collections::VecDeque;

use super::constants::LINE_TERMINATOR;

/// Byte-wise cursor over a directory listing
///
/// Every entry is presented as its name followed by [`LINE_TERMINATOR`]. Moving past the last byte
/// of an entry loads the next one, so the cursor is exhausted exactly when the whole listing has
/// been read.
#[derive(Debug)]
pub struct DirCursor {
    pending: VecDeque<String>,
    current: Vec<u8>,
    offset: usize,
}

impl DirCursor {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let mut cursor = Self {
            pending: names
                .into_iter()
                .filter(|name| name != "." && name != "..")
                .collect(),
            current: Vec::new(),
            offset: 0,
        };
        cursor.advance();
        cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.current.len()
    }

    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.current.get(self.offset)?;
        self.offset += 1;
        if self.offset == self.current.len() {
            self.advance();
        }
        Some(byte)
    }

    fn advance(&mut self) {
        self.current.clear();
        self.offset = 0;
        if let Some(name) = self.pending.pop_front() {
            self.current.extend_from_slice(name.as_bytes());
            self.current.extend_from_slice(LINE_TERMINATOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(cursor: &mut DirCursor) -> Vec<u8> {
        let mut bytes = Vec::new();
        while let Some(byte) = cursor.next_byte() {
            bytes.push(byte);
        }
        bytes
    }

    #[test]
    fn yields_each_name_with_a_terminator() {
        let mut cursor = DirCursor::new(["A.DSK".to_owned(), "B.DSK".to_owned()]);
        assert!(!cursor.is_exhausted());
        assert_eq!(drain(&mut cursor), b"A.DSK\r\nB.DSK\r\n");
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn skips_dot_entries() {
        let names = [".", "BOOT.BIN", ".."].map(str::to_owned);
        let mut cursor = DirCursor::new(names);
        assert_eq!(drain(&mut cursor), b"BOOT.BIN\r\n");
    }

    #[test]
    fn empty_listing_starts_exhausted() {
        let cursor = DirCursor::new(Vec::new());
        assert!(cursor.is_exhausted());
        let cursor = DirCursor::new([".".to_owned(), "..".to_owned()]);
        assert!(cursor.is_exhausted());
    }
}
