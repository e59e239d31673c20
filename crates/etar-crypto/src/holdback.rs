//! Tag holdback for streaming decryption
//!
//! The final [`TAG_SIZE`] bytes of a container are the GCM tag, but a reader
//! only learns where the stream ends after a read returns zero. Chunk
//! boundaries therefore fall anywhere relative to the tag, including inside it.
//!
//! [`HoldbackReader`] keeps the newest `TAG_SIZE` bytes withheld at all times.
//! Each read of up to `chunk_size` bytes releases exactly as many of the oldest
//! bytes as it brought in, so released bytes are always ciphertext. When the
//! inner reader is exhausted, what remains withheld is the tag.
//!
//! ```text
//! buf: [ held (TAG_SIZE) | incoming (n) ]
//!        └── release buf[..n] ──┘ └── new held = buf[n..n + TAG_SIZE]
//! ```

use std::io::{self, Read};

use crate::TAG_SIZE;

/// Read until `buf` is full or the reader is exhausted. Returns bytes read.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub struct HoldbackReader<R> {
    inner: R,
    buf: Vec<u8>,
    /// Bytes at the front of `buf` handed out by the last `next_chunk`,
    /// shifted out before the next read.
    released: usize,
    primed: usize,
    consumed: u64,
}

impl<R: Read> HoldbackReader<R> {
    /// Wrap `inner` and immediately withhold its first `TAG_SIZE` bytes.
    ///
    /// `chunk_size` must be at least 1. Check [`has_tag`](Self::has_tag)
    /// before pulling chunks: a stream shorter than a tag has no ciphertext
    /// and no valid tag.
    pub fn new(mut inner: R, chunk_size: usize) -> io::Result<Self> {
        debug_assert!(chunk_size > 0, "chunk_size must be non-zero");
        let mut buf = vec![0u8; TAG_SIZE + chunk_size];
        let primed = read_full(&mut inner, &mut buf[..TAG_SIZE])?;
        Ok(Self {
            inner,
            buf,
            released: 0,
            primed,
            consumed: primed as u64,
        })
    }

    /// True once a full tag's worth of bytes is withheld.
    pub fn has_tag(&self) -> bool {
        self.primed == TAG_SIZE
    }

    /// Total bytes pulled from the inner reader so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Read the next chunk and return the bytes it released from the front of
    /// the holdback. `None` means the inner reader is exhausted.
    ///
    /// The returned slice is mutable so callers can decrypt in place.
    pub fn next_chunk(&mut self) -> io::Result<Option<&mut [u8]>> {
        debug_assert!(self.has_tag(), "next_chunk on an unprimed holdback");
        self.settle();

        let n = read_full(&mut self.inner, &mut self.buf[TAG_SIZE..])?;
        if n == 0 {
            return Ok(None);
        }
        self.consumed += n as u64;
        self.released = n;
        Ok(Some(&mut self.buf[..n]))
    }

    /// Consume the reader and return the withheld bytes: the tag, once
    /// `next_chunk` has returned `None`.
    pub fn into_tag(mut self) -> [u8; TAG_SIZE] {
        self.settle();
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&self.buf[..TAG_SIZE]);
        tag
    }

    fn settle(&mut self) {
        if self.released > 0 {
            self.buf
                .copy_within(self.released..self.released + TAG_SIZE, 0);
            self.released = 0;
        }
    }
}
