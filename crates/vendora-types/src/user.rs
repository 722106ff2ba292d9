//! User accounts, roles, and the capability check.
//!
//! The role is immutable per account as far as this engine is concerned.
//! Entry points never inspect session mechanics: the caller resolves the
//! session into a [`Principal`] and passes it in explicitly. Both the
//! buyer-initiated and gateway-initiated flows go through the same
//! [`authorize`] function — there are no scattered role comparisons.

use serde::{Deserialize, Serialize};

use crate::{Result, UserId, VendoraError};

/// The role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "BUYER"),
            Self::Seller => write!(f, "SELLER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            role,
        }
    }
}

/// The authenticated caller of an orchestrator entry point.
///
/// Resolved from the session by the identity collaborator and passed in
/// explicitly — the engine holds no ambient security context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn of(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

/// Proof that a principal holds the required role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizedAs {
    pub user_id: UserId,
    pub role: Role,
}

/// The single capability check used by every entry point.
///
/// # Errors
/// Returns [`VendoraError::WrongRole`] when the principal's role does not
/// match the required one.
pub fn authorize(principal: &Principal, required: Role) -> Result<AuthorizedAs> {
    if principal.role == required {
        Ok(AuthorizedAs {
            user_id: principal.user_id,
            role: required,
        })
    } else {
        Err(VendoraError::WrongRole {
            required,
            actual: principal.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_matching_role() {
        let user = User::new("buyer@example.com", Role::Buyer);
        let principal = Principal::of(&user);
        let auth = authorize(&principal, Role::Buyer).unwrap();
        assert_eq!(auth.user_id, user.id);
        assert_eq!(auth.role, Role::Buyer);
    }

    #[test]
    fn authorize_wrong_role_denied() {
        let user = User::new("seller@example.com", Role::Seller);
        let principal = Principal::of(&user);
        let err = authorize(&principal, Role::Buyer).unwrap_err();
        assert!(matches!(
            err,
            VendoraError::WrongRole {
                required: Role::Buyer,
                actual: Role::Seller,
            }
        ));
    }

    #[test]
    fn role_display_uppercase() {
        assert_eq!(Role::Buyer.to_string(), "BUYER");
        assert_eq!(Role::Seller.to_string(), "SELLER");
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }
}
