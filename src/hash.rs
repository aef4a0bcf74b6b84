//! A write-through hashing sink: every byte written to the output file also
//! feeds a running SHA-1 digest, so the trailer can be finalized without a
//! second pass over the data.

use sha1::{Digest, Sha1};
use std::io::{self, Write};

pub const DIGEST_LEN: usize = 20;

pub struct HashingWriter<W> {
    inner: W,
    hasher: Sha1,
}

impl<W: Write> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        HashingWriter {
            inner,
            hasher: Sha1::new(),
        }
    }

    /// Consumes the sink, returning the wrapped writer and the finalized
    /// digest of everything written through it.
    pub fn into_inner_and_digest(self) -> (W, [u8; DIGEST_LEN]) {
        let digest = self.hasher.finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&digest);
        (self.inner, bytes)
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
