//! Newline framing over arbitrary byte chunks.

/// Accumulates bytes and yields complete `\n`-terminated lines.
///
/// Chunk boundaries from the transport never line up with entries, so
/// partial lines are kept until their terminator arrives. Lines are raw
/// bytes; decoding them is the consumer's job.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete line, without its terminator.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buf.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
        line.pop();
        strip_cr(&mut line);
        Some(line)
    }

    /// Take whatever is left once the transport has closed.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.buf.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.buf);
        strip_cr(&mut line);
        Some(line)
    }

    /// Bytes buffered without a terminator yet.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

pub(crate) fn strip_cr(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
}
