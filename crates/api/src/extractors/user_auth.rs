//! User JWT authentication extractor.
//!
//! Validates the Bearer token, then loads the user row so that every handler
//! receives an [`Actor`] carrying the user's parish and superuser flag.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::{Actor, User};
use persistence::repositories::UserRepository;
use shared::jwt::{extract_user_id, JwtError};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti) of the presented token.
    pub jti: String,
    /// The actor handed to domain operations.
    pub actor: Actor,
}

impl UserAuth {
    fn from_user(user: &User, jti: String) -> Self {
        Self {
            user_id: user.id,
            jti,
            actor: user.actor(),
        }
    }
}

/// Returns the token part of a `Bearer` authorization header.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuth>() {
            return Ok(auth.clone());
        }

        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = bearer_token(auth_header).ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let claims = state.jwt.validate_token(token).map_err(|e| match e {
            JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            _ => ApiError::Unauthorized("Invalid or expired token".to_string()),
        })?;

        let user_id = extract_user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))?;

        let user: User = UserRepository::new(state.pool.clone())
            .find_by_id(user_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_string()))?;

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "Rejected token of inactive user");
            return Err(ApiError::Unauthorized("User account is disabled".to_string()));
        }

        let auth = UserAuth::from_user(&user, claims.jti);
        parts.extensions.insert(auth.clone());
        Ok(auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }

    #[test]
    fn test_user_auth_from_user() {
        let parish = Uuid::new_v4();
        let user = User {
            id: Uuid::new_v4(),
            email: "anna@example.org".to_string(),
            display_name: "Anna".to_string(),
            parish_id: Some(parish),
            is_superuser: false,
            is_active: true,
            created_at: Utc::now(),
        };

        let auth = UserAuth::from_user(&user, "jti-1".to_string());
        assert_eq!(auth.user_id, user.id);
        assert_eq!(auth.actor.id, user.id);
        assert_eq!(auth.actor.parish_id, Some(parish));
        assert!(!auth.actor.is_superuser);
    }
}
