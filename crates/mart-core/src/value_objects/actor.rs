//! Authenticated caller identity

use crate::entities::UserRole;
use crate::value_objects::Snowflake;

/// The caller on whose behalf an operation runs. Resolved by the API layer
/// from a bearer token and the user's current role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Snowflake,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: Snowflake, role: UserRole) -> Self {
        Self { id, role }
    }

    /// `admin` and `superadmin` both moderate content.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[inline]
    pub fn is_superadmin(&self) -> bool {
        self.role == UserRole::Superadmin
    }

    #[inline]
    pub fn is(&self, user_id: Snowflake) -> bool {
        self.id == user_id
    }
}
