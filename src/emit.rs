//! Chunk emitter: a single forward pass writing header, chunk directory,
//! fanout, identifier table, commit data, and overflow edges through a
//! hashing sink, followed by the trailing digest.

use crate::chunk::{self, FAN_LEN, LAST_EDGE, NO_PARENT, OCTOPUS_EDGES_NEEDED, PARENT_MISSING};
use crate::hash::HashingWriter;
use crate::id::ID_LEN;
use crate::plan::Plan;
use crate::source::CommitRecord;
use crate::table::CommitTable;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};

/// Writes the whole file (everything but the caller's decision of where the
/// bytes land) through `out`, returning `out` with the trailing digest
/// already appended.
#[tracing::instrument(skip(out, table, records, plan))]
pub fn emit<W: Write>(
    out: W,
    table: &CommitTable,
    records: &[CommitRecord],
    plan: &Plan,
) -> io::Result<W> {
    let mut sink = HashingWriter::new(out);

    write_header(&mut sink, plan.num_chunks)?;
    write_directory(&mut sink, plan)?;

    let fan = table.fanout();
    write_fanout_chunk(&mut sink, &fan)?;
    write_oid_lookup_chunk(&mut sink, table)?;
    write_commit_data_chunk(&mut sink, table, records, &fan)?;
    if plan.overflow_count > 0 {
        write_extra_edges_chunk(&mut sink, records, table, &fan)?;
    }

    let (mut out, digest) = sink.into_inner_and_digest();
    out.write_all(&digest)?;
    tracing::debug!("wrote trailing digest");
    Ok(out)
}

fn write_header<W: Write>(out: &mut W, num_chunks: u8) -> io::Result<()> {
    out.write_all(chunk::SIGNATURE)?;
    out.write_u8(chunk::FORMAT_VERSION)?;
    out.write_u8(chunk::ID_ALGORITHM_VERSION)?;
    out.write_u8(num_chunks)?;
    out.write_u8(0)?; // reserved pad byte
    Ok(())
}

fn write_directory<W: Write>(out: &mut W, plan: &Plan) -> io::Result<()> {
    for entry in &plan.directory {
        out.write_all(&entry.id)?;
        out.write_u64::<BigEndian>(entry.offset)?;
    }
    Ok(())
}

fn write_fanout_chunk<W: Write>(out: &mut W, fan: &[u32; FAN_LEN]) -> io::Result<()> {
    for count in fan {
        out.write_u32::<BigEndian>(*count)?;
    }
    Ok(())
}

fn write_oid_lookup_chunk<W: Write>(out: &mut W, table: &CommitTable) -> io::Result<()> {
    for id in table.ids() {
        out.write_all(id.as_slice())?;
    }
    Ok(())
}

/// Computes the two inline edge values for one record, and advances
/// `overflow_cursor` past the extra edges this record contributes, if any.
/// Snapshot-then-increment, matching `commit-graph.c`'s `num_extra_edges`
/// local variable.
fn compute_edges(
    record: &CommitRecord,
    table: &CommitTable,
    fan: &[u32; FAN_LEN],
    overflow_cursor: &mut u32,
) -> (u32, u32) {
    let position = |id: crate::id::Id| match table.position_of(id, fan) {
        Some(pos) => pos,
        None => {
            tracing::warn!(parent = %id, "parent not found in commit table, encoding as dangling");
            PARENT_MISSING
        }
    };

    let edge1 = match record.parents.first() {
        None => return (NO_PARENT, NO_PARENT),
        Some(first) => position(*first),
    };

    let edge2 = match record.parents.len() {
        1 => NO_PARENT,
        2 => position(record.parents[1]),
        _ => {
            let start = *overflow_cursor;
            *overflow_cursor += (record.parents.len() - 1) as u32;
            OCTOPUS_EDGES_NEEDED | start
        }
    };

    (edge1, edge2)
}

fn write_commit_data_chunk<W: Write>(
    out: &mut W,
    table: &CommitTable,
    records: &[CommitRecord],
    fan: &[u32; FAN_LEN],
) -> io::Result<()> {
    let mut overflow_cursor = 0u32;
    for record in records {
        debug_assert_eq!(record.tree.as_slice().len(), ID_LEN);
        out.write_all(record.tree.as_slice())?;

        let (edge1, edge2) = compute_edges(record, table, fan, &mut overflow_cursor);
        out.write_u32::<BigEndian>(edge1)?;
        out.write_u32::<BigEndian>(edge2)?;

        let high = ((record.timestamp >> 32) & 0x3) as u32;
        let low = (record.timestamp & 0xFFFF_FFFF) as u32;
        out.write_u32::<BigEndian>(high)?;
        out.write_u32::<BigEndian>(low)?;
    }
    Ok(())
}

fn write_extra_edges_chunk<W: Write>(
    out: &mut W,
    records: &[CommitRecord],
    table: &CommitTable,
    fan: &[u32; FAN_LEN],
) -> io::Result<()> {
    let position = |id: crate::id::Id| match table.position_of(id, fan) {
        Some(pos) => pos,
        None => {
            tracing::warn!(parent = %id, "parent not found in commit table, encoding as dangling");
            PARENT_MISSING
        }
    };

    for record in records {
        if record.parents.len() <= 2 {
            continue;
        }
        let tail = &record.parents[1..];
        for (i, parent) in tail.iter().enumerate() {
            let mut edge = position(*parent);
            if i + 1 == tail.len() {
                edge |= LAST_EDGE;
            }
            out.write_u32::<BigEndian>(edge)?;
        }
    }
    Ok(())
}
