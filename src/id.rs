use bstr::ByteSlice;
use std::convert::TryFrom;
use std::fmt;

/// Length in bytes of an object identifier. The format supports exactly one
/// algorithm for now, matching `GRAPH_OID_VERSION_SHA1` in the original
/// implementation.
pub const ID_LEN: usize = 20;

/// A fixed-width, content-addressed object identifier.
///
/// Total order is lexicographic on the raw bytes, which is what the
/// commit-graph format's sortedness and fanout invariants are built on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id([u8; ID_LEN]);

impl Id {
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Id(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// The byte used to bucket this identifier in the 256-entry fanout table.
    pub fn first_byte(&self) -> u8 {
        self.0[0]
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = IdLengthError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != ID_LEN {
            return Err(IdLengthError {
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; ID_LEN];
        buf.copy_from_slice(bytes);
        Ok(Id(buf))
    }
}

#[derive(Debug)]
pub struct IdLengthError {
    actual: usize,
}

impl fmt::Display for IdLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {} bytes, got {}", ID_LEN, self.actual)
    }
}

impl std::error::Error for IdLengthError {}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_bstr())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
