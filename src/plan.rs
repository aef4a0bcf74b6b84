//! Edge planner and layout planner. Both walk the resolved commit table once,
//! before a single byte is written, so the chunk directory and overflow
//! chunk's presence are known up front.

use crate::chunk::{
    self, ChunkId, COMMIT_DATA_CHUNK_ID, COMMIT_DATA_ENTRY_SIZE, EXTRA_EDGES_CHUNK_ID,
    FANOUT_CHUNK_SIZE, MAX_COMMITS, OID_FAN_CHUNK_ID, OID_LOOKUP_CHUNK_ID, SENTINEL_CHUNK_ID,
};
use crate::error::Error;
use crate::id::ID_LEN;
use crate::source::{CommitRecord, CommitSource};
use crate::table::CommitTable;

/// One entry of the chunk directory: an id and its absolute offset. The
/// final entry is always the sentinel (`id = 0`).
pub struct DirectoryEntry {
    pub id: ChunkId,
    pub offset: u64,
}

pub struct Plan {
    pub num_chunks: u8,
    pub overflow_count: u32,
    pub directory: Vec<DirectoryEntry>,
}

/// Resolves every commit in `table`, in table order. A single pass shared by
/// the edge planner and the chunk emitter, since `CommitSource::resolve_commit`
/// is allowed to do real I/O and its contract only promises idempotence, not
/// cheapness.
#[tracing::instrument(skip(source, table))]
pub fn resolve_all<C: CommitSource>(
    source: &C,
    table: &CommitTable,
) -> Result<Vec<CommitRecord>, Error> {
    table
        .ids()
        .iter()
        .map(|id| {
            source
                .resolve_commit(*id)
                .map_err(|err| Error::Collaborator(Box::new(err)))
        })
        .collect()
}

/// Walks `records` once to count octopus overflow slots and computes the
/// chunk directory.
pub fn plan(table: &CommitTable, records: &[CommitRecord]) -> Result<Plan, Error> {
    let n = table.len();
    if n >= MAX_COMMITS {
        return Err(Error::TooManyCommits(n));
    }

    let mut overflow_count: u32 = 0;
    for record in records {
        let p = record.parents.len();
        if p > 2 {
            overflow_count += (p - 1) as u32;
        }
    }

    let num_chunks: u8 = if overflow_count > 0 { 4 } else { 3 };
    tracing::debug!(
        commits = n,
        overflow_count,
        num_chunks,
        "planned commit-graph layout"
    );

    let header_and_directory = chunk::HEADER_LEN + (num_chunks as u64 + 1) * chunk::CHUNK_LOOKUP_ENTRY_LEN;
    let fanout_offset = header_and_directory;
    let oid_lookup_offset = fanout_offset + FANOUT_CHUNK_SIZE;
    let commit_data_offset = oid_lookup_offset + n as u64 * ID_LEN as u64;
    let extra_edges_offset = commit_data_offset + n as u64 * COMMIT_DATA_ENTRY_SIZE;
    let end_offset = extra_edges_offset + 4 * overflow_count as u64;

    let mut directory = vec![
        DirectoryEntry {
            id: OID_FAN_CHUNK_ID,
            offset: fanout_offset,
        },
        DirectoryEntry {
            id: OID_LOOKUP_CHUNK_ID,
            offset: oid_lookup_offset,
        },
        DirectoryEntry {
            id: COMMIT_DATA_CHUNK_ID,
            offset: commit_data_offset,
        },
    ];
    if overflow_count > 0 {
        directory.push(DirectoryEntry {
            id: EXTRA_EDGES_CHUNK_ID,
            offset: extra_edges_offset,
        });
    }
    directory.push(DirectoryEntry {
        id: SENTINEL_CHUNK_ID,
        offset: end_offset,
    });

    Ok(Plan {
        num_chunks,
        overflow_count,
        directory,
    })
}
