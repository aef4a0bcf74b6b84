//! Chunk identifiers and fixed sizes: the four-byte tags and offsets that
//! make up the chunk directory, plus the edge sentinels used in the commit
//! data chunk. A reader parsing this format would match on the same
//! constants.

pub type ChunkId = [u8; 4];

pub const SIGNATURE: &[u8; 4] = b"CGPH";
pub const FORMAT_VERSION: u8 = 1;
pub const ID_ALGORITHM_VERSION: u8 = 1;

pub const OID_FAN_CHUNK_ID: ChunkId = *b"OIDF";
pub const OID_LOOKUP_CHUNK_ID: ChunkId = *b"OIDL";
pub const COMMIT_DATA_CHUNK_ID: ChunkId = *b"CDAT";
pub const EXTRA_EDGES_CHUNK_ID: ChunkId = *b"EDGE";
pub const SENTINEL_CHUNK_ID: ChunkId = [0u8; 4];

pub const HEADER_LEN: u64 = 8;
pub const CHUNK_LOOKUP_ENTRY_LEN: u64 = 12;
pub const FAN_LEN: usize = 256;
pub const FANOUT_CHUNK_SIZE: u64 = 4 * FAN_LEN as u64;
pub const COMMIT_DATA_ENTRY_SIZE: u64 = crate::id::ID_LEN as u64 + 16;

/// Edge sentinels used in the commit data chunk's two inline parent slots.
pub const NO_PARENT: u32 = 0x7000_0000;
pub const PARENT_MISSING: u32 = 0x7FFF_FFFF;
pub const OCTOPUS_EDGES_NEEDED: u32 = 0x8000_0000;
pub const LAST_EDGE: u32 = 0x8000_0000;

/// Commit counts at or above this reserve the sentinel range above.
pub const MAX_COMMITS: usize = 0x7000_0000;
