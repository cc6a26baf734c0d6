//! Key lookups over a [`RingState`].

use std::collections::HashSet;

use crate::error::RingError;
use crate::hasher::TokenHasher;
use crate::state::RingState;

impl<H: TokenHasher> RingState<H> {
    /// Index of the vnode owning `key`, or `None` on an empty ring.
    fn closest(&self, key: &[u8]) -> Option<usize> {
        self.store.closest(self.hasher.token(key))
    }

    /// The address owning `key`: the first vnode clockwise from the key's
    /// token.
    pub fn get(&self, key: &[u8]) -> Result<&str, RingError> {
        let index = self.closest(key).ok_or(RingError::NoMembers)?;
        let vn = self.store.get(index).ok_or(RingError::NoMembers)?;
        Ok(vn.address.as_str())
    }

    /// The two nearest distinct addresses for `key`.
    pub fn get2(&self, key: &[u8]) -> Result<(&str, &str), RingError> {
        let owners = self.get_n(key, 2)?;
        Ok((owners[0], owners[1]))
    }

    /// The `count` nearest distinct addresses for `key`, nearest first.
    ///
    /// Walks clockwise from the key's vnode, skipping vnodes whose address
    /// was already collected, wrapping past the end of the ring.
    pub fn get_n(&self, key: &[u8], count: usize) -> Result<Vec<&str>, RingError> {
        let available = self.members.len();
        if count > available {
            return Err(RingError::NotEnoughMembers {
                requested: count,
                available,
            });
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let start = self.closest(key).ok_or(RingError::NoMembers)?;
        let mut seen = HashSet::with_capacity(count);
        let mut owners = Vec::with_capacity(count);
        for vn in self.store.walk_from(start) {
            if seen.insert(vn.address.as_str()) {
                owners.push(vn.address.as_str());
                if owners.len() == count {
                    break;
                }
            }
        }
        Ok(owners)
    }
}
