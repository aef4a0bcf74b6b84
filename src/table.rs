//! The sorted, deduplicated commit table and its fanout-bracketed lookup,
//! used at emission time to translate parent identifiers into commit
//! indices without an auxiliary map.

use crate::chunk::FAN_LEN;
use crate::id::Id;

/// Sorted, deduplicated commit identifiers. Position in `ids` is the
/// "commit index" referenced throughout the format.
pub struct CommitTable {
    ids: Vec<Id>,
}

impl CommitTable {
    /// `ids` must already be sorted and free of duplicates; this is an
    /// invariant enforced by the collector, not re-checked here.
    pub fn new(ids: Vec<Id>) -> Self {
        debug_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        CommitTable { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    /// The 256-entry fanout table: `fanout[b]` is the count of identifiers
    /// whose first byte is `<= b`. Always computed, regardless of `len()`.
    pub fn fanout(&self) -> [u32; FAN_LEN] {
        let mut fan = [0u32; FAN_LEN];
        let mut count = 0u32;
        let mut it = self.ids.iter().peekable();
        for (b, slot) in fan.iter_mut().enumerate() {
            while let Some(id) = it.peek() {
                if id.first_byte() as usize != b {
                    break;
                }
                count += 1;
                it.next();
            }
            *slot = count;
        }
        fan
    }

    /// Binary search bracketed by the fanout table. Returns the commit
    /// index of `id`, or `None` if absent.
    pub fn position_of(&self, id: Id, fan: &[u32; FAN_LEN]) -> Option<u32> {
        let first_byte = id.first_byte() as usize;
        let mut lower = if first_byte == 0 { 0 } else { fan[first_byte - 1] } as usize;
        let mut upper = fan[first_byte] as usize;

        while lower < upper {
            let mid = lower + (upper - lower) / 2;
            match self.ids[mid].cmp(&id) {
                std::cmp::Ordering::Less => lower = mid + 1,
                std::cmp::Ordering::Greater => upper = mid,
                std::cmp::Ordering::Equal => return Some(mid as u32),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    fn id(bytes: &[u8]) -> Id {
        let mut buf = [0u8; crate::id::ID_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Id::try_from(&buf[..]).unwrap()
    }

    #[test]
    fn fanout_is_monotonic_and_matches_len() {
        let table = CommitTable::new(vec![id(&[0x01]), id(&[0x01, 0x02]), id(&[0x05]), id(&[0xff])]);
        let fan = table.fanout();
        assert_eq!(fan[255], table.len() as u32);
        for b in 1..256 {
            assert!(fan[b] >= fan[b - 1]);
        }
        assert_eq!(fan[0x00], 0);
        assert_eq!(fan[0x01], 2);
        assert_eq!(fan[0x04], 2);
        assert_eq!(fan[0x05], 3);
        assert_eq!(fan[0xff], 4);
    }

    #[test]
    fn position_of_finds_every_entry() {
        let ids = vec![id(&[0x01]), id(&[0x05]), id(&[0x05, 0x01]), id(&[0xaa])];
        let table = CommitTable::new(ids.clone());
        let fan = table.fanout();
        for (idx, entry) in ids.iter().enumerate() {
            assert_eq!(table.position_of(*entry, &fan), Some(idx as u32));
        }
    }

    #[test]
    fn position_of_returns_none_for_missing() {
        let table = CommitTable::new(vec![id(&[0x01]), id(&[0xaa])]);
        let fan = table.fanout();
        assert_eq!(table.position_of(id(&[0x50]), &fan), None);
    }

    #[test]
    fn empty_table_has_zero_fanout() {
        let table = CommitTable::new(vec![]);
        let fan = table.fanout();
        assert!(fan.iter().all(|&c| c == 0));
    }
}
