use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::constants::ROLE_SUPERUSER;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Superusers may read and modify every item
    pub fn is_superuser(&self) -> bool {
        self.has_role(ROLE_SUPERUSER)
    }

    /// Owners and superusers may access a record
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_superuser() || self.user_id == owner_id
    }
}

/// Claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_and_superuser_access() {
        let owner = Uuid::new_v4();
        let user = AuthenticatedUser {
            user_id: owner,
            roles: vec![],
        };
        assert!(user.can_access(owner));
        assert!(!user.can_access(Uuid::new_v4()));

        let admin = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            roles: vec![ROLE_SUPERUSER.to_string()],
        };
        assert!(admin.is_superuser());
        assert!(admin.can_access(owner));
    }
}
