/// RelationshipSet - duplicate-free engagement membership with toggle
///
/// Backs likes, bookmarks, followers, and following. Mutations go through a
/// compare-and-apply loop: snapshot the membership version, compute the next
/// state, and apply only if no conflicting write landed in between. A blind
/// overwrite of the whole set would silently drop concurrent toggles from
/// other users, so that path does not exist here.
use crate::error::{AppError, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Bounded retry budget before a toggle surfaces `Conflict`.
const MAX_TOGGLE_ATTEMPTS: u32 = 8;

#[derive(Debug, Default)]
pub struct RelationshipSet {
    members: RwLock<HashSet<Uuid>>,
    version: AtomicU64,
}

impl RelationshipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) membership query.
    pub fn contains(&self, member: Uuid) -> bool {
        self.read_members().contains(&member)
    }

    /// O(1) cardinality query.
    pub fn len(&self) -> usize {
        self.read_members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current membership, for listing endpoints. Order is unspecified.
    pub fn members(&self) -> Vec<Uuid> {
        self.read_members().iter().copied().collect()
    }

    /// Flip membership for `member`: returns `(now_member, new_size)`.
    ///
    /// Two toggles by the same member restore the original state. Concurrent
    /// toggles by different members are all observed; a conflicting write
    /// between snapshot and apply triggers a bounded retry.
    pub fn toggle(&self, member: Uuid) -> Result<(bool, usize)> {
        for _ in 0..MAX_TOGGLE_ATTEMPTS {
            let (present, seen) = {
                let members = self.read_members();
                (members.contains(&member), self.version.load(Ordering::Acquire))
            };

            let mut members = self.write_members();
            if self.version.load(Ordering::Acquire) != seen {
                continue;
            }

            let now_member = if present {
                members.remove(&member);
                false
            } else {
                members.insert(member);
                true
            };
            self.version.fetch_add(1, Ordering::Release);
            return Ok((now_member, members.len()));
        }

        Err(AppError::Conflict(
            "relationship toggle retries exhausted".to_string(),
        ))
    }

    /// Compare-and-apply a target membership state. Returns whether the set
    /// changed. Used by the follow pairing path, where both sides must move
    /// toward the same desired state rather than blindly flipping.
    pub fn apply(&self, member: Uuid, desired: bool) -> Result<bool> {
        for _ in 0..MAX_TOGGLE_ATTEMPTS {
            let seen = self.version.load(Ordering::Acquire);

            let mut members = self.write_members();
            if self.version.load(Ordering::Acquire) != seen {
                continue;
            }

            let changed = if desired {
                members.insert(member)
            } else {
                members.remove(&member)
            };
            if changed {
                self.version.fetch_add(1, Ordering::Release);
            }
            return Ok(changed);
        }

        Err(AppError::Conflict(
            "relationship update retries exhausted".to_string(),
        ))
    }

    fn read_members(&self) -> std::sync::RwLockReadGuard<'_, HashSet<Uuid>> {
        self.members.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_members(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<Uuid>> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn toggle_adds_then_removes() {
        let set = RelationshipSet::new();
        let user = Uuid::new_v4();

        assert_eq!(set.toggle(user).unwrap(), (true, 1));
        assert!(set.contains(user));
        assert_eq!(set.toggle(user).unwrap(), (false, 0));
        assert!(!set.contains(user));
    }

    #[test]
    fn double_toggle_restores_original_state() {
        let set = RelationshipSet::new();
        let resident = Uuid::new_v4();
        let visitor = Uuid::new_v4();
        set.toggle(resident).unwrap();

        let before = set.len();
        set.toggle(visitor).unwrap();
        set.toggle(visitor).unwrap();

        assert_eq!(set.len(), before);
        assert!(set.contains(resident));
        assert!(!set.contains(visitor));
    }

    #[test]
    fn no_duplicates_under_repeated_apply() {
        let set = RelationshipSet::new();
        let user = Uuid::new_v4();

        assert!(set.apply(user, true).unwrap());
        assert!(!set.apply(user, true).unwrap());
        assert_eq!(set.len(), 1);
        assert!(set.apply(user, false).unwrap());
        assert!(!set.apply(user, false).unwrap());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn concurrent_toggles_are_all_observed() {
        let set = Arc::new(RelationshipSet::new());
        let users: Vec<Uuid> = (0..32).map(|_| Uuid::new_v4()).collect();

        let handles: Vec<_> = users
            .iter()
            .map(|&user| {
                let set = Arc::clone(&set);
                std::thread::spawn(move || set.toggle(user).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(set.len(), users.len());
        for user in users {
            assert!(set.contains(user));
        }
    }
}
