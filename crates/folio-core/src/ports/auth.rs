//! Authentication and authorization ports.

use uuid::Uuid;

use crate::visibility::Viewer;

/// Role granted to staff accounts.
pub const STAFF_ROLE: &str = "staff";

/// Claims stored in access tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_staff(&self) -> bool {
        self.roles.iter().any(|r| r == STAFF_ROLE)
    }

    /// The viewer these claims authenticate.
    pub fn viewer(&self) -> Viewer {
        if self.is_staff() {
            Viewer::Staff(self.user_id)
        } else {
            Viewer::Member(self.user_id)
        }
    }
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Generate access token for a user.
    fn generate_token(
        &self,
        user_id: Uuid,
        username: &str,
        roles: Vec<String>,
    ) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Hashing error: {0}")]
    HashingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_role_maps_to_staff_viewer() {
        let id = Uuid::new_v4();
        let claims = TokenClaims {
            user_id: id,
            username: "ada".into(),
            roles: vec!["user".into(), STAFF_ROLE.into()],
            exp: 0,
        };
        assert_eq!(claims.viewer(), Viewer::Staff(id));

        let member = TokenClaims {
            roles: vec!["user".into()],
            ..claims
        };
        assert_eq!(member.viewer(), Viewer::Member(id));
    }
}
