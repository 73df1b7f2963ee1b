//! User entity - marketplace accounts and their administrative rules

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{Actor, Snowflake};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    Superadmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            other => Err(DomainError::validation(format!("Invalid role: {other}"))),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            other => Err(DomainError::validation(format!("Invalid user status: {other}"))),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marketplace account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub profile_image: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New active account with the `user` role
    pub fn new(id: Snowflake, email: String, first_name: String, last_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            first_name,
            last_name,
            phone: None,
            role: UserRole::User,
            status: UserStatus::Active,
            profile_image: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Identity used for authorization checks
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }

    /// Apply a role change requested by `actor`.
    ///
    /// Granting or revoking an administrative role takes a superadmin.
    pub fn change_role(&mut self, actor: &Actor, role: UserRole) -> Result<(), DomainError> {
        if !actor.is_admin() {
            return Err(DomainError::forbidden("Admin access required"));
        }
        if actor.is(self.id) {
            return Err(DomainError::validation("You cannot change your own role"));
        }
        if (role.is_admin() || self.role.is_admin()) && !actor.is_superadmin() {
            return Err(DomainError::forbidden(
                "Only superadmins can grant or revoke admin roles",
            ));
        }
        self.role = role;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply a status change requested by `actor`.
    pub fn change_status(&mut self, actor: &Actor, status: UserStatus) -> Result<(), DomainError> {
        if !actor.is_admin() {
            return Err(DomainError::forbidden("Admin access required"));
        }
        if actor.is(self.id) {
            return Err(DomainError::validation("You cannot change your own status"));
        }
        if self.role.is_admin() && !actor.is_superadmin() {
            return Err(DomainError::forbidden(
                "Only superadmins can change the status of an admin",
            ));
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login = Some(at);
    }
}
