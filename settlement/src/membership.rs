//! Membership oracle
//!
//! The settlement service validates that a group and its members exist before
//! recording a transfer. In a full deployment that check is a call to the
//! membership service; behind this trait the engine stays testable without
//! any HTTP in the picture.

use crate::error::Result;
use async_trait::async_trait;
use balance_core::{GroupId, MemberId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Group/member existence checks
#[async_trait]
pub trait MembershipOracle: Send + Sync {
    /// Does the group exist?
    async fn group_exists(&self, group: GroupId) -> Result<bool>;

    /// Is the member part of the group?
    async fn member_exists(&self, group: GroupId, member: MemberId) -> Result<bool>;
}

/// Fixed in-process roster
#[derive(Debug, Default)]
pub struct StaticRoster {
    groups: RwLock<HashMap<GroupId, HashSet<MemberId>>>,
}

impl StaticRoster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group with its members, replacing any previous roster
    pub fn add_group(&self, group: GroupId, members: impl IntoIterator<Item = MemberId>) {
        self.groups
            .write()
            .insert(group, members.into_iter().collect());
    }

    /// Add a member to an existing or new group
    pub fn add_member(&self, group: GroupId, member: MemberId) {
        self.groups.write().entry(group).or_default().insert(member);
    }
}

#[async_trait]
impl MembershipOracle for StaticRoster {
    async fn group_exists(&self, group: GroupId) -> Result<bool> {
        Ok(self.groups.read().contains_key(&group))
    }

    async fn member_exists(&self, group: GroupId, member: MemberId) -> Result<bool> {
        Ok(self
            .groups
            .read()
            .get(&group)
            .is_some_and(|members| members.contains(&member)))
    }
}

/// Oracle that accepts every group and member.
///
/// For deployments where the surrounding service layer has already validated
/// existence before calling in.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveOracle;

#[async_trait]
impl MembershipOracle for PermissiveOracle {
    async fn group_exists(&self, _group: GroupId) -> Result<bool> {
        Ok(true)
    }

    async fn member_exists(&self, _group: GroupId, _member: MemberId) -> Result<bool> {
        Ok(true)
    }
}
