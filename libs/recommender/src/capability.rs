//! Proof that an admin role check has been performed
//!
//! [`AdminCapability`] has a private field, so the only way to obtain one is
//! [`AdminCapability::grant`], which consults the role read from the
//! credential store. Operations restricted to admins take it by reference.

use crate::model::{Role, User, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCapability {
    granted_to: UserId,
}

impl AdminCapability {
    /// Grant the capability if the stored user is an admin
    pub fn grant(user: &User) -> Option<Self> {
        match user.role {
            Role::Admin => Some(Self {
                granted_to: user.id,
            }),
            Role::Member => None,
        }
    }

    /// The admin the capability was granted to
    pub fn granted_to(&self) -> UserId {
        self.granted_to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: 3,
            username: "someone".to_string(),
            password_hash: String::new(),
            role,
            interests: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_is_granted() {
        let capability = AdminCapability::grant(&user(Role::Admin)).unwrap();
        assert_eq!(capability.granted_to(), 3);
    }

    #[test]
    fn test_member_is_refused() {
        assert!(AdminCapability::grant(&user(Role::Member)).is_none());
    }
}
