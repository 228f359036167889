/// Follow service - paired follow/unfollow across two profiles
///
/// A follow touches two relationship sets: the follower's `following` and
/// the followee's `followers`. Both sides move through compare-and-apply
/// toward the same desired state; if the second side fails, the first is
/// rolled back so no half-applied pair is ever observable.
use crate::error::{AppError, Result};
use crate::store::Store;
use std::sync::Arc;
use uuid::Uuid;

/// Result of a follow toggle, with counts derived from the updated sets.
#[derive(Debug, Clone, Copy)]
pub struct FollowChange {
    pub is_following: bool,
    pub follower_count: usize,
    pub following_count: usize,
}

#[derive(Clone)]
pub struct FollowService {
    store: Arc<Store>,
}

impl FollowService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Toggle `follower_id` following `followee_id`.
    pub fn toggle_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<FollowChange> {
        if follower_id == followee_id {
            return Err(AppError::validation("userId", "You cannot follow yourself"));
        }

        let followee = self.store.user(followee_id)?;
        let follower = self.store.user(follower_id)?;

        // Both sides are driven toward one desired state computed up front;
        // blind toggles on each side could diverge under concurrency.
        let desired = !follower.following.contains(followee_id);

        follower.following.apply(followee_id, desired)?;
        if let Err(err) = followee.followers.apply(follower_id, desired) {
            // Roll back the first side rather than leave the pair split.
            if let Err(rollback_err) = follower.following.apply(followee_id, !desired) {
                tracing::error!(
                    %follower_id,
                    %followee_id,
                    error = %rollback_err,
                    "follow rollback failed after pair conflict"
                );
            }
            return Err(err);
        }

        tracing::debug!(%follower_id, %followee_id, following = desired, "follow toggled");

        Ok(FollowChange {
            is_following: desired,
            follower_count: followee.follower_count(),
            following_count: follower.following_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;

    fn two_users() -> (FollowService, Arc<Store>, Uuid, Uuid) {
        let store = Store::new();
        let a = store.register_user(UserProfile::new("ada", "", ""));
        let b = store.register_user(UserProfile::new("grace", "", ""));
        (FollowService::new(Arc::clone(&store)), store, a.id, b.id)
    }

    #[test]
    fn follow_updates_both_sides_together() {
        let (service, store, a, b) = two_users();

        let change = service.toggle_follow(a, b).unwrap();
        assert!(change.is_following);
        assert_eq!(change.follower_count, 1);
        assert_eq!(change.following_count, 1);

        let follower = store.user(a).unwrap();
        let followee = store.user(b).unwrap();
        assert!(follower.following.contains(b));
        assert!(followee.followers.contains(a));
    }

    #[test]
    fn unfollow_reverses_both_sides_together() {
        let (service, store, a, b) = two_users();
        service.toggle_follow(a, b).unwrap();

        let change = service.toggle_follow(a, b).unwrap();
        assert!(!change.is_following);
        assert_eq!(change.follower_count, 0);
        assert_eq!(change.following_count, 0);

        let follower = store.user(a).unwrap();
        let followee = store.user(b).unwrap();
        assert!(!follower.following.contains(b));
        assert!(!followee.followers.contains(a));
    }

    #[test]
    fn self_follow_is_rejected() {
        let (service, _store, a, _b) = two_users();
        assert!(matches!(
            service.toggle_follow(a, a),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn missing_followee_is_not_found() {
        let (service, _store, a, _b) = two_users();
        assert!(matches!(
            service.toggle_follow(a, Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn counts_are_views_over_the_sets() {
        let (service, store, a, b) = two_users();
        let c = store.register_user(UserProfile::new("lin", "", "")).id;

        service.toggle_follow(a, b).unwrap();
        let change = service.toggle_follow(c, b).unwrap();

        assert_eq!(change.follower_count, 2);
        assert_eq!(store.user(b).unwrap().follower_count(), 2);
    }
}
