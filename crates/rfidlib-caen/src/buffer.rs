//! Growable byte buffer with independent read and write cursors.
//!
//! One [`FrameBuffer`] backs each outgoing request and each incoming
//! reply. The write cursor marks how much of the buffer holds valid bytes;
//! the read cursor marks how far a decoder has consumed them.
//!
//! ```text
//! 0          read_pos        write_pos            size
//! |--consumed--|---unread------|-----unfilled------|
//! ```
//!
//! `0 <= read_pos <= write_pos <= size` holds after every operation.
//! Writes past `size` are contract violations and panic; growth that
//! would drop written bytes is rejected with an error.

use rfidlib_core::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    data: Vec<u8>,
    write_pos: usize,
    read_pos: usize,
}

impl FrameBuffer {
    /// An empty buffer with no capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero-filled buffer of `size` bytes with both cursors at 0.
    pub fn with_size(size: usize) -> Self {
        FrameBuffer {
            data: vec![0; size],
            write_pos: 0,
            read_pos: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    /// Bytes written but not yet consumed.
    pub fn remaining(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Bytes that can still be written before the buffer is full.
    pub fn spare(&self) -> usize {
        self.data.len() - self.write_pos
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.data[..self.write_pos]
    }

    /// Unread bytes, starting at the read cursor.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.read_pos..self.write_pos]
    }

    /// Reserve the next `len` bytes for writing and advance the write
    /// cursor past them.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `len` bytes are spare.
    pub fn claim(&mut self, len: usize) -> &mut [u8] {
        assert!(
            len <= self.spare(),
            "buffer overflow: {len} bytes requested, {} spare",
            self.spare()
        );
        let start = self.write_pos;
        self.write_pos += len;
        &mut self.data[start..self.write_pos]
    }

    /// Append `bytes` at the write cursor.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `bytes.len()` bytes are spare.
    pub fn append(&mut self, bytes: &[u8]) {
        self.claim(bytes.len()).copy_from_slice(bytes);
    }

    /// The unfilled region between the write cursor and the end.
    ///
    /// Pair with [`commit`](Self::commit) once bytes have been received
    /// into it.
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        let start = self.write_pos;
        &mut self.data[start..]
    }

    /// Mark `len` bytes of the unfilled region as written.
    pub fn commit(&mut self, len: usize) -> Result<()> {
        if len > self.spare() {
            return Err(Error::InvalidParameter(format!(
                "commit of {len} bytes exceeds {} spare",
                self.spare()
            )));
        }
        self.write_pos += len;
        Ok(())
    }

    /// Consume `len` unread bytes, or `None` if fewer are available.
    pub fn take(&mut self, len: usize) -> Option<&[u8]> {
        if len > self.remaining() {
            return None;
        }
        let start = self.read_pos;
        self.read_pos += len;
        Some(&self.data[start..self.read_pos])
    }

    /// Move the read cursor to an absolute position.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.write_pos {
            return Err(Error::InvalidParameter(format!(
                "read position {pos} beyond write position {}",
                self.write_pos
            )));
        }
        self.read_pos = pos;
        Ok(())
    }

    /// Grow the buffer to `new_size` bytes, keeping what has been written.
    ///
    /// Returns [`Error::OutOfMemory`] if the allocation fails.
    pub fn grow(&mut self, new_size: usize) -> Result<()> {
        if new_size < self.write_pos {
            return Err(Error::InvalidParameter(format!(
                "cannot shrink buffer to {new_size} bytes below {} written",
                self.write_pos
            )));
        }
        if new_size <= self.data.len() {
            return Ok(());
        }
        self.data
            .try_reserve_exact(new_size - self.data.len())
            .map_err(|_| Error::OutOfMemory)?;
        self.data.resize(new_size, 0);
        Ok(())
    }

    /// Free the storage and reset both cursors.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.write_pos = 0;
        self.read_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_take() {
        let mut buf = FrameBuffer::with_size(8);
        buf.append(&[1, 2, 3, 4]);
        assert_eq!(buf.write_pos(), 4);
        assert_eq!(buf.spare(), 4);

        assert_eq!(buf.take(3), Some(&[1u8, 2, 3][..]));
        assert_eq!(buf.remaining(), 1);
        assert_eq!(buf.take(2), None);
        assert_eq!(buf.read_pos(), 3);
    }

    #[test]
    #[should_panic(expected = "buffer overflow")]
    fn append_past_size_panics() {
        let mut buf = FrameBuffer::with_size(2);
        buf.append(&[1, 2, 3]);
    }

    #[test]
    fn grow_keeps_written_bytes() {
        let mut buf = FrameBuffer::with_size(4);
        buf.append(&[9, 8, 7, 6]);
        buf.grow(10).unwrap();
        assert_eq!(buf.size(), 10);
        assert_eq!(buf.written(), &[9, 8, 7, 6]);
        assert_eq!(buf.unfilled_mut().len(), 6);
    }

    #[test]
    fn grow_below_written_is_rejected() {
        let mut buf = FrameBuffer::with_size(6);
        buf.append(&[0; 6]);
        assert!(matches!(buf.grow(4), Err(Error::InvalidParameter(_))));
        assert_eq!(buf.size(), 6);
    }

    #[test]
    fn unsatisfiable_grow_is_out_of_memory() {
        let mut buf = FrameBuffer::with_size(4);
        buf.append(&[1, 2]);
        assert!(matches!(buf.grow(usize::MAX), Err(Error::OutOfMemory)));
        assert_eq!(buf.size(), 4);
        assert_eq!(buf.written(), &[1, 2]);
    }

    #[test]
    fn commit_past_size_is_rejected() {
        let mut buf = FrameBuffer::with_size(4);
        buf.unfilled_mut()[..2].copy_from_slice(&[0xAA, 0xBB]);
        buf.commit(2).unwrap();
        assert_eq!(buf.written(), &[0xAA, 0xBB]);
        assert!(buf.commit(3).is_err());
        assert_eq!(buf.write_pos(), 2);
    }

    #[test]
    fn seek_past_write_is_rejected() {
        let mut buf = FrameBuffer::with_size(4);
        buf.append(&[1, 2]);
        buf.seek(2).unwrap();
        assert!(buf.seek(3).is_err());
        assert_eq!(buf.read_pos(), 2);
    }

    #[test]
    fn release_resets_everything() {
        let mut buf = FrameBuffer::with_size(4);
        buf.append(&[1]);
        buf.release();
        assert_eq!(buf.size(), 0);
        assert_eq!(buf.write_pos(), 0);
        assert_eq!(buf.read_pos(), 0);
    }
}
