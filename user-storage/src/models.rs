//! User record and role flags, mapped to the `users` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use uuid::Uuid;

/// Role bitmask. Bit values are persisted and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct RoleFlags(u32);

impl RoleFlags {
    pub const NONE: RoleFlags = RoleFlags(0);
    pub const USER: RoleFlags = RoleFlags(1);
    pub const ADMIN: RoleFlags = RoleFlags(2);
    pub const TEACHER: RoleFlags = RoleFlags(4);
    pub const BLOCKED: RoleFlags = RoleFlags(8);

    pub const fn from_bits(bits: u32) -> Self {
        RoleFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: RoleFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_user(self) -> bool {
        self.contains(Self::USER)
    }

    pub fn is_admin(self) -> bool {
        self.contains(Self::ADMIN)
    }

    pub fn is_teacher(self) -> bool {
        self.contains(Self::TEACHER)
    }

    pub fn is_blocked(self) -> bool {
        self.contains(Self::BLOCKED)
    }
}

impl BitOr for RoleFlags {
    type Output = RoleFlags;

    fn bitor(self, rhs: RoleFlags) -> RoleFlags {
        RoleFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for RoleFlags {
    fn bitor_assign(&mut self, rhs: RoleFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for RoleFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::USER, "user"),
            (Self::ADMIN, "admin"),
            (Self::TEACHER, "teacher"),
            (Self::BLOCKED, "blocked"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub login: String,
    /// Telegram user id of the account that completed verification.
    pub telegram_id: Option<i64>,
    #[sqlx(rename = "role_flags")]
    pub roles: RoleFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a new record with a generated UUID and current timestamps.
    pub fn new(login: impl Into<String>, telegram_id: Option<i64>, roles: RoleFlags) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            login: login.into(),
            telegram_id,
            roles,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_bits_are_stable() {
        assert_eq!(RoleFlags::USER.bits(), 1);
        assert_eq!(RoleFlags::ADMIN.bits(), 2);
        assert_eq!(RoleFlags::TEACHER.bits(), 4);
        assert_eq!(RoleFlags::BLOCKED.bits(), 8);
    }

    #[test]
    fn test_predicates_and_union() {
        let roles = RoleFlags::USER | RoleFlags::TEACHER;
        assert!(roles.is_user());
        assert!(roles.is_teacher());
        assert!(!roles.is_admin());
        assert!(!roles.is_blocked());
        assert_eq!(roles.bits(), 5);
        assert_eq!(roles.to_string(), "user|teacher");
        assert_eq!(RoleFlags::NONE.to_string(), "none");
    }

    #[test]
    fn test_new_record_has_fresh_id_and_equal_timestamps() {
        let a = UserRecord::new("alice", Some(7), RoleFlags::USER);
        let b = UserRecord::new("alice", Some(7), RoleFlags::USER);
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
    }
}
