use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller role as asserted by the identity provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Admin,
}

/// The authenticated caller of a core operation.
///
/// Supplied by the identity/session layer; the core trusts it for
/// authorization checks and performs no authentication itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Actor {
    pub account_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn customer(account_id: Uuid) -> Self {
        Self {
            account_id,
            role: Role::Customer,
        }
    }

    pub fn admin(account_id: Uuid) -> Self {
        Self {
            account_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_flag() {
        let id = Uuid::new_v4();
        assert!(Actor::admin(id).is_admin());
        assert!(!Actor::customer(id).is_admin());
    }
}
