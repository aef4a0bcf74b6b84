//! A writer for the git commit-graph file format: a content-addressed,
//! chunked binary artifact that accelerates commit history traversal by
//! mapping each commit to its tree, its parents (as positional edges into
//! a sorted commit table), and its committer timestamp.
//!
//! This crate only writes the file (`write_commit_graph`); reading it back
//! is out of scope. Enumerating pack files and parsing raw commit objects
//! are likewise out of scope — callers supply those via the
//! [`ObjectSource`] and [`CommitSource`] traits in [`source`].

mod chunk;
mod collector;
mod emit;
mod error;
mod hash;
mod id;
mod lock;
mod plan;
mod source;
mod table;

pub use error::Error;
pub use id::{Id, ID_LEN};
pub use source::{CommitRecord, CommitSource, ObjectSource, ObjectType};
pub use table::CommitTable;

use std::path::Path;

/// Writes (or atomically replaces) `<object_dir>/info/commit-graph`.
/// `estimated_object_count` is a sizing hint for the commit collector's
/// initial allocation; it has no effect on correctness, only on how much
/// churn the first few appends cause.
///
/// Enumerates every object via `source`, filters to commits, resolves each
/// one via `resolver`, and writes a single immutable file: either readers
/// see the complete previous generation or the complete new one, never a
/// partial file.
#[tracing::instrument(skip(source, resolver))]
pub fn write_commit_graph<O, C>(
    object_dir: impl AsRef<Path>,
    source: &O,
    resolver: &C,
    estimated_object_count: usize,
) -> Result<(), Error>
where
    O: ObjectSource,
    C: CommitSource,
{
    let object_dir = object_dir.as_ref();
    let target = object_dir.join("info").join("commit-graph");

    let table = collector::collect_commits(source, estimated_object_count)?;
    let records = plan::resolve_all(resolver, &table)?;
    let layout = plan::plan(&table, &records)?;

    let lock = lock::LockFile::acquire(&target)?;
    let lock = emit::emit(lock, &table, &records, &layout)
        .map_err(|err| Error::Io(err, target.clone()))?;
    lock.commit()?;

    tracing::info!(
        commits = table.len(),
        target = %target.display(),
        "wrote commit-graph"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::TryFrom;
    use std::fmt;

    #[derive(Debug)]
    struct Never;
    impl fmt::Display for Never {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "never")
        }
    }
    impl std::error::Error for Never {}

    fn id(byte: u8) -> Id {
        let mut buf = [0u8; ID_LEN];
        buf[0] = byte;
        Id::try_from(&buf[..]).unwrap()
    }

    struct InMemoryRepo {
        objects: Vec<(Id, ObjectType)>,
        commits: RefCell<HashMap<Id, CommitRecord>>,
    }

    impl ObjectSource for InMemoryRepo {
        type Error = Never;

        fn enumerate(
            &self,
            callback: &mut dyn FnMut(Id, u64) -> Result<(), Self::Error>,
        ) -> Result<(), Self::Error> {
            for (position, (object_id, _)) in self.objects.iter().enumerate() {
                callback(*object_id, position as u64)?;
            }
            Ok(())
        }

        fn classify(&self, position: u64) -> Result<ObjectType, Self::Error> {
            Ok(self.objects[position as usize].1)
        }
    }

    impl CommitSource for InMemoryRepo {
        type Error = Never;

        fn resolve_commit(&self, id: Id) -> Result<CommitRecord, Self::Error> {
            Ok(self.commits.borrow()[&id].clone())
        }
    }

    #[test]
    fn writes_and_publishes_a_linear_chain() {
        let dir = tempfile::tempdir().unwrap();
        let a = id(1);
        let b = id(2);
        let c = id(3);

        let mut commits = HashMap::new();
        commits.insert(
            a,
            CommitRecord {
                tree: id(0xa0),
                parents: vec![],
                timestamp: 1,
            },
        );
        commits.insert(
            b,
            CommitRecord {
                tree: id(0xb0),
                parents: vec![a],
                timestamp: 2,
            },
        );
        commits.insert(
            c,
            CommitRecord {
                tree: id(0xc0),
                parents: vec![b],
                timestamp: 3,
            },
        );

        let repo = InMemoryRepo {
            objects: vec![(a, ObjectType::Commit), (b, ObjectType::Commit), (c, ObjectType::Commit)],
            commits: RefCell::new(commits),
        };

        write_commit_graph(dir.path(), &repo, &repo, 0).unwrap();

        let target = dir.path().join("info").join("commit-graph");
        let bytes = std::fs::read(&target).unwrap();
        assert_eq!(&bytes[0..4], chunk_signature());
        assert_eq!(bytes[6], 3, "no octopus merges, so no EDGE chunk");
    }

    #[test]
    fn second_writer_fails_while_first_holds_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("info")).unwrap();
        let lock_path = dir.path().join("info").join("commit-graph.lock");
        std::fs::write(&lock_path, b"held by another writer").unwrap();

        let repo = InMemoryRepo {
            objects: vec![],
            commits: RefCell::new(HashMap::new()),
        };

        match write_commit_graph(dir.path(), &repo, &repo, 0) {
            Err(Error::LockHeld(_)) => {}
            other => panic!("expected LockHeld, got {:?}", other),
        }
    }

    #[test]
    fn running_twice_yields_byte_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = id(7);
        let mut commits = HashMap::new();
        commits.insert(
            a,
            CommitRecord {
                tree: id(0x70),
                parents: vec![],
                timestamp: 99,
            },
        );
        let repo = InMemoryRepo {
            objects: vec![(a, ObjectType::Commit)],
            commits: RefCell::new(commits),
        };

        write_commit_graph(dir.path(), &repo, &repo, 0).unwrap();
        let first = std::fs::read(dir.path().join("info").join("commit-graph")).unwrap();

        write_commit_graph(dir.path(), &repo, &repo, 0).unwrap();
        let second = std::fs::read(dir.path().join("info").join("commit-graph")).unwrap();

        assert_eq!(first, second);
    }

    fn chunk_signature() -> &'static [u8; 4] {
        b"CGPH"
    }
}
