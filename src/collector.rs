//! Commit collector: filters the object-store adapter's stream down to
//! commit-typed identifiers and produces a sorted, deduplicated table.

use crate::error::Error;
use crate::source::{ObjectSource, ObjectType};
use crate::table::CommitTable;

/// Below this many objects, reserve at least this much capacity up front to
/// avoid churn on the first few appends.
const MIN_RESERVATION: usize = 1024;

#[tracing::instrument(skip(source))]
pub fn collect_commits<S: ObjectSource>(
    source: &S,
    estimated_object_count: usize,
) -> Result<CommitTable, Error> {
    let capacity = (estimated_object_count / 4).max(MIN_RESERVATION);
    let mut ids = Vec::with_capacity(capacity);

    source
        .enumerate(&mut |id, position| {
            match source.classify(position) {
                Ok(ObjectType::Commit) => ids.push(id),
                Ok(_) => {}
                Err(err) => return Err(err),
            }
            Ok(())
        })
        .map_err(|err| Error::Collaborator(Box::new(err)))?;

    tracing::debug!(raw = ids.len(), "collected candidate commit identifiers");

    ids.sort_unstable();
    ids.dedup();

    tracing::debug!(distinct = ids.len(), "deduplicated commit table");
    Ok(CommitTable::new(ids))
}
