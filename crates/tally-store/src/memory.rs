// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store implementation.
//!
//! A thread-safe, `parking_lot`-backed implementation of [`AccessStore`],
//! used by the binary for runnable deployments without a database and by
//! the test suites for deterministic fixtures. Data is lost on drop.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use tally_core::permission::{category_permissions, default_global_permissions};
use tally_core::{Group, Permission, Session, User};

use crate::error::StoreError;
use crate::store::{AccessStore, GroupPatch, NewGroup, NewUser};

// =============================================================================
// Tables
// =============================================================================

/// All rows, behind one lock. Operations are short and never await while
/// holding it.
#[derive(Debug, Default)]
struct Tables {
    users: HashMap<i64, User>,
    passwords: HashMap<i64, String>,
    groups: HashMap<i64, Group>,
    sessions: HashMap<i64, Session>,
    permissions: HashMap<i64, Permission>,
    user_grants: HashMap<i64, BTreeSet<i64>>,
    group_grants: HashMap<i64, BTreeSet<i64>>,
    next_user_id: i64,
    next_group_id: i64,
    next_session_id: i64,
    next_permission_id: i64,
}

impl Tables {
    fn insert_permission(&mut self, mut permission: Permission) -> i64 {
        self.next_permission_id += 1;
        permission.id = self.next_permission_id;
        self.permissions.insert(permission.id, permission);
        self.next_permission_id
    }

    fn insert_group(&mut self, group: NewGroup) -> Group {
        self.next_group_id += 1;
        let row = Group {
            id: self.next_group_id,
            name: group.name,
            priority: group.priority,
            expiration: group.expiration,
        };
        self.groups.insert(row.id, row.clone());
        row
    }

    /// Every id must exist in the catalog; grants apply all-or-nothing.
    fn check_permission_ids(&self, ids: &[i64]) -> Result<(), StoreError> {
        for id in ids {
            if !self.permissions.contains_key(id) {
                return Err(StoreError::UnknownPermission(*id));
            }
        }
        Ok(())
    }

    fn check_group_exists(&self, group_id: Option<i64>) -> Result<(), StoreError> {
        match group_id {
            Some(id) if !self.groups.contains_key(&id) => Err(StoreError::NotFound {
                entity: "group",
                id,
            }),
            _ => Ok(()),
        }
    }

    fn grants_to_permissions(&self, grants: Option<&BTreeSet<i64>>) -> Vec<Permission> {
        grants
            .into_iter()
            .flatten()
            .filter_map(|id| self.permissions.get(id).cloned())
            .collect()
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// A thread-safe in-memory [`AccessStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with the default catalog: the global
    /// permission set, two sample asset categories with their scoped rows,
    /// and the "Super User" group (priority 0) granted everything.
    pub fn with_defaults() -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.write();

            let mut all_ids = BTreeSet::new();
            for permission in default_global_permissions() {
                all_ids.insert(tables.insert_permission(permission));
            }
            for (category_id, category_name) in [(1, "Laptops"), (2, "Projectors")] {
                for permission in category_permissions(category_id, category_name) {
                    all_ids.insert(tables.insert_permission(permission));
                }
            }

            let seeded = all_ids.len();
            let super_group = tables.insert_group(NewGroup {
                name: "Super User".to_string(),
                priority: 0,
                expiration: None,
                permission_ids: Vec::new(),
            });
            tables.group_grants.insert(super_group.id, all_ids);

            debug!(permissions = seeded, "Seeded default catalog");
        }
        store
    }

    /// Inserts a category's scoped permission rows and returns their ids.
    pub fn add_category(&self, category_id: i64, category_name: &str) -> Vec<i64> {
        let mut tables = self.tables.write();
        category_permissions(category_id, category_name)
            .into_iter()
            .map(|permission| tables.insert_permission(permission))
            .collect()
    }

    /// Looks up catalog ids by permission name (case-insensitive, exact).
    ///
    /// Test and seeding convenience; unknown names are skipped.
    pub fn permission_ids_by_name(&self, names: &[&str]) -> Vec<i64> {
        let tables = self.tables.read();
        names
            .iter()
            .filter_map(|name| {
                tables
                    .permissions
                    .values()
                    .find(|perm| perm.name.eq_ignore_ascii_case(name))
                    .map(|perm| perm.id)
            })
            .collect()
    }
}

#[async_trait]
impl AccessStore for MemoryStore {
    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .sessions
            .values()
            .find(|session| session.token.as_deref() == Some(token))
            .cloned())
    }

    async fn insert_session(
        &self,
        user_id: i64,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let mut tables = self.tables.write();
        tables.next_session_id += 1;
        let session = Session {
            id: tables.next_session_id,
            token: Some(token),
            user_id,
            expires_at,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn clear_session_token(&self, session_id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if let Some(session) = tables.sessions.get_mut(&session_id) {
            session.token = None;
        }
        Ok(())
    }

    async fn user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read();
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write();
        if tables.users.values().any(|u| u.username == new.username) {
            return Err(StoreError::Conflict {
                entity: "user",
                name: new.username,
            });
        }
        tables.check_group_exists(new.group_id)?;
        tables.check_permission_ids(&new.permission_ids)?;

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: new.username,
            blocked: false,
            group_id: new.group_id,
            group_expiration: new.group_expiration,
        };
        tables.users.insert(user.id, user.clone());
        tables.passwords.insert(user.id, new.password);
        tables
            .user_grants
            .insert(user.id, new.permission_ids.into_iter().collect());
        Ok(user)
    }

    async fn set_user_blocked(&self, user_id: i64, blocked: bool) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let user = tables.users.get_mut(&user_id).ok_or(StoreError::NotFound {
            entity: "user",
            id: user_id,
        })?;
        user.blocked = blocked;
        Ok(())
    }

    async fn set_user_group(
        &self,
        user_id: i64,
        group_id: Option<i64>,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        tables.check_group_exists(group_id)?;
        let user = tables.users.get_mut(&user_id).ok_or(StoreError::NotFound {
            entity: "user",
            id: user_id,
        })?;
        user.group_id = group_id;
        user.group_expiration = expiration;
        Ok(())
    }

    async fn set_user_group_expiration(
        &self,
        user_id: i64,
        expiration: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let user = tables.users.get_mut(&user_id).ok_or(StoreError::NotFound {
            entity: "user",
            id: user_id,
        })?;
        user.group_expiration = expiration;
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.users.remove(&user_id).is_none() {
            return Err(StoreError::NotFound {
                entity: "user",
                id: user_id,
            });
        }
        tables.passwords.remove(&user_id);
        tables.user_grants.remove(&user_id);
        tables.sessions.retain(|_, session| session.user_id != user_id);
        Ok(())
    }

    async fn group(&self, id: i64) -> Result<Option<Group>, StoreError> {
        Ok(self.tables.read().groups.get(&id).cloned())
    }

    async fn groups(&self) -> Result<Vec<Group>, StoreError> {
        let tables = self.tables.read();
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by_key(|group| group.id);
        Ok(groups)
    }

    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError> {
        let mut tables = self.tables.write();
        if tables.groups.values().any(|g| g.name == new.name) {
            return Err(StoreError::Conflict {
                entity: "group",
                name: new.name,
            });
        }
        tables.check_permission_ids(&new.permission_ids)?;

        let grants: BTreeSet<i64> = new.permission_ids.iter().copied().collect();
        let group = tables.insert_group(new);
        tables.group_grants.insert(group.id, grants);
        Ok(group)
    }

    async fn update_group(&self, group_id: i64, patch: GroupPatch) -> Result<Group, StoreError> {
        let mut tables = self.tables.write();
        if let Some(name) = &patch.name {
            if tables
                .groups
                .values()
                .any(|g| g.id != group_id && &g.name == name)
            {
                return Err(StoreError::Conflict {
                    entity: "group",
                    name: name.clone(),
                });
            }
        }
        let group = tables
            .groups
            .get_mut(&group_id)
            .ok_or(StoreError::NotFound {
                entity: "group",
                id: group_id,
            })?;
        if let Some(name) = patch.name {
            group.name = name;
        }
        if let Some(priority) = patch.priority {
            group.priority = priority;
        }
        if let Some(expiration) = patch.expiration {
            group.expiration = Some(expiration);
        }
        Ok(group.clone())
    }

    async fn permissions(&self) -> Result<Vec<Permission>, StoreError> {
        let tables = self.tables.read();
        let mut permissions: Vec<Permission> = tables.permissions.values().cloned().collect();
        permissions.sort_by_key(|perm| perm.id);
        Ok(permissions)
    }

    async fn permission(&self, id: i64) -> Result<Option<Permission>, StoreError> {
        Ok(self.tables.read().permissions.get(&id).cloned())
    }

    async fn user_permissions(&self, user_id: i64) -> Result<Vec<Permission>, StoreError> {
        let tables = self.tables.read();
        Ok(tables.grants_to_permissions(tables.user_grants.get(&user_id)))
    }

    async fn group_permissions(&self, group_id: i64) -> Result<Vec<Permission>, StoreError> {
        let tables = self.tables.read();
        Ok(tables.grants_to_permissions(tables.group_grants.get(&group_id)))
    }

    async fn set_user_permissions(
        &self,
        user_id: i64,
        permission_ids: &[i64],
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::NotFound {
                entity: "user",
                id: user_id,
            });
        }
        tables.check_permission_ids(permission_ids)?;
        tables
            .user_grants
            .insert(user_id, permission_ids.iter().copied().collect());
        Ok(())
    }

    async fn set_group_permissions(
        &self,
        group_id: i64,
        permission_ids: &[i64],
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if !tables.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound {
                entity: "group",
                id: group_id,
            });
        }
        tables.check_permission_ids(permission_ids)?;
        tables
            .group_grants
            .insert(group_id, permission_ids.iter().copied().collect());
        Ok(())
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read();
        let user = tables.users.values().find(|user| user.username == username);
        Ok(user
            .filter(|user| tables.passwords.get(&user.id).map(String::as_str) == Some(password))
            .cloned())
    }
}

// =============================================================================
// Tests
// =============================================================================
