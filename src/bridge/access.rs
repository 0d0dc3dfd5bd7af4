//! Access control over both platforms.
//!
//! Pure predicates over the configured access lists and admin set.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;

use crate::config::types::{AccessConfig, AccessList, AccessMode};

impl<T: Eq + Hash> AccessList<T> {
    /// Whether `id` may use the bridge under this list's mode.
    pub fn allows<Q>(&self, id: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let listed = self.members.contains(id);
        match self.mode {
            AccessMode::Whitelist => listed,
            AccessMode::Blacklist => !listed,
        }
    }
}

/// Access policy built from config.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    chatroom: AccessList<i64>,
    remote: AccessList<String>,
    admins: HashSet<i64>,
}

impl AccessPolicy {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            chatroom: config.chatroom.clone(),
            remote: config.remote.clone(),
            admins: config.admins.clone(),
        }
    }

    /// Whether a chat-room user may use the bridge.
    pub fn chatroom_allowed(&self, user_id: i64) -> bool {
        self.chatroom.allows(&user_id)
    }

    /// Whether a remote player may use the bridge.
    pub fn remote_allowed(&self, player: &str) -> bool {
        self.remote.allows(player)
    }

    /// Whether a chat-room user is an admin, regardless of list mode.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(mode: AccessMode, members: &[i64], admins: &[i64]) -> AccessPolicy {
        AccessPolicy::new(&AccessConfig {
            chatroom: AccessList {
                mode,
                members: members.iter().copied().collect(),
            },
            remote: AccessList {
                mode,
                members: ["Alex".to_string()].into_iter().collect(),
            },
            admins: admins.iter().copied().collect(),
        })
    }

    #[test]
    fn test_whitelist_allows_only_members() {
        let policy = policy(AccessMode::Whitelist, &[1, 2], &[]);
        assert!(policy.chatroom_allowed(1));
        assert!(!policy.chatroom_allowed(3));
        assert!(policy.remote_allowed("Alex"));
        assert!(!policy.remote_allowed("Steve"));
    }

    #[test]
    fn test_blacklist_rejects_members() {
        let policy = policy(AccessMode::Blacklist, &[1, 2], &[]);
        assert!(!policy.chatroom_allowed(1));
        assert!(policy.chatroom_allowed(3));
        assert!(!policy.remote_allowed("Alex"));
        assert!(policy.remote_allowed("Steve"));
    }

    #[test]
    fn test_flipping_mode_inverts_decision() {
        let members = [5, 8, 13];
        let white = policy(AccessMode::Whitelist, &members, &[]);
        let black = policy(AccessMode::Blacklist, &members, &[]);

        for user in 0..20 {
            assert_ne!(white.chatroom_allowed(user), black.chatroom_allowed(user));
        }
    }

    #[test]
    fn test_admin_independent_of_mode() {
        let white = policy(AccessMode::Whitelist, &[], &[42]);
        let black = policy(AccessMode::Blacklist, &[42], &[42]);
        assert!(white.is_admin(42));
        assert!(black.is_admin(42));
        assert!(!white.is_admin(7));
    }

    #[test]
    fn test_empty_blacklist_allows_everyone() {
        let policy = AccessPolicy::new(&AccessConfig::default());
        assert!(policy.chatroom_allowed(123));
        assert!(policy.remote_allowed("anyone"));
        assert!(!policy.is_admin(123));
    }
}
