//! Caller identity as handed over by the session layer.

use crate::{
    entities::{Role, account},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};

/// The authenticated principal behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Account id from the identity provider
    pub account_id: String,
    /// Role granted by the identity provider
    pub role: Role,
}

impl Caller {
    /// A regular user.
    #[must_use]
    pub fn user(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            role: Role::User,
        }
    }

    /// An administrator.
    #[must_use]
    pub fn admin(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            role: Role::Admin,
        }
    }

    /// Whether the caller holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `Unauthorized` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                account_id: self.account_id.clone(),
            })
        }
    }
}

impl From<&account::Model> for Caller {
    fn from(account: &account::Model) -> Self {
        Self {
            account_id: account.id.clone(),
            role: account.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::account_snapshot;
    use rust_decimal::Decimal;

    #[test]
    fn test_require_admin() {
        assert!(Caller::admin("root").require_admin().is_ok());
        assert!(matches!(
            Caller::user("alice").require_admin(),
            Err(Error::Unauthorized { account_id }) if account_id == "alice"
        ));
    }

    #[test]
    fn test_caller_from_account() {
        let mut account = account_snapshot("ops", Decimal::ZERO, None);
        assert_eq!(Caller::from(&account), Caller::user("ops"));

        account.role = Role::Admin;
        assert!(Caller::from(&account).is_admin());
    }
}
