//! Authenticated caller identity and role guards.

use crate::domain::{Error, Role, UserId};

/// The authenticated user on whose behalf a service call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    /// Construct an actor from a resolved account.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with `forbidden` unless the actor holds one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), Error> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "this action is not available to the {} role",
                self.role
            )))
        }
    }

    /// Livestock owners only.
    pub fn require_owner(&self) -> Result<(), Error> {
        self.require_any(&[Role::Owner])
    }

    /// Veterinarians only.
    pub fn require_vet(&self) -> Result<(), Error> {
        self.require_any(&[Role::Vet])
    }

    /// Sellers only.
    pub fn require_seller(&self) -> Result<(), Error> {
        self.require_any(&[Role::Seller])
    }

    /// Administrators only.
    pub fn require_admin(&self) -> Result<(), Error> {
        self.require_any(&[Role::Admin])
    }
}
