// Newline framing for inbound bytes with carry-over of unterminated fragments.

use std::collections::VecDeque;

/// Longest unterminated fragment a client may leave pending.
pub const MAX_PENDING_BYTES: usize = 64 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub struct LineTooLong {
    pub pending: usize,
}

/// Splits a byte stream into `\n`-terminated lines.
///
/// Each complete line is queued with its terminator; a trailing fragment stays buffered
/// until a later read completes it. Invalid UTF-8 is replaced rather than rejected.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
    ready: VecDeque<String>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Result<(), LineTooLong> {
        self.pending.extend_from_slice(bytes);

        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset + 1;
            self.ready
                .push_back(String::from_utf8_lossy(&self.pending[start..end]).into_owned());
            start = end;
        }
        self.pending.drain(..start);

        if self.pending.len() > MAX_PENDING_BYTES {
            return Err(LineTooLong {
                pending: self.pending.len(),
            });
        }
        Ok(())
    }

    /// Oldest complete line, terminator included.
    pub fn next_line(&mut self) -> Option<String> {
        self.ready.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
