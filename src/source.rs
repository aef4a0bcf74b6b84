//! Collaborator interfaces. Everything in this module is a trait:
//! enumerating pack files, classifying objects, and parsing commits are
//! explicitly out of scope for this crate. Callers supply implementations
//! backed by their own object store.

use crate::id::Id;
use std::error::Error as StdError;

/// An object's type, as far as this crate cares: only commit-typed objects
/// are collected into the commit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Commit,
    Tree,
    Blob,
    Tag,
}

/// Enumerates every object reachable in every pack, and classifies them.
///
/// `enumerate` is called exactly once per writer invocation; implementations
/// are free to interpret `position` however suits their storage layout (e.g.
/// a pack index position), as this crate only ever threads it back into
/// `classify`.
pub trait ObjectSource {
    type Error: StdError + Send + Sync + 'static;

    /// Invoke `callback` once per object across every pack, in unspecified
    /// order.
    fn enumerate(
        &self,
        callback: &mut dyn FnMut(Id, u64) -> Result<(), Self::Error>,
    ) -> Result<(), Self::Error>;

    /// Classify an object previously yielded by `enumerate`.
    fn classify(&self, position: u64) -> Result<ObjectType, Self::Error>;
}

/// A fully resolved commit: the fields the commit-data chunk needs and
/// nothing more.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub tree: Id,
    pub parents: Vec<Id>,
    /// Seconds since epoch. Only the low 34 bits may be set; the resolver
    /// must guarantee this.
    pub timestamp: u64,
}

/// Resolves a commit identifier (already known to be commit-typed) into its
/// tree, ordered parents, and committer timestamp.
///
/// Resolution may populate internal caches but must be idempotent per
/// identifier: calling `resolve_commit` twice with the same `Id` must
/// return equal records.
pub trait CommitSource {
    type Error: StdError + Send + Sync + 'static;

    fn resolve_commit(&self, id: Id) -> Result<CommitRecord, Self::Error>;
}
