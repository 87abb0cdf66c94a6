use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::db::UserStore;
use crate::models::user_models::{CurrentUser, User};
use crate::utils::error::{AppError, AppResult};
use crate::utils::session::SessionKeys;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Registers users, checks credentials and turns bearer tokens into callers.
pub struct AuthProvider {
    users: Arc<dyn UserStore>,
    keys: SessionKeys,
    bcrypt_cost: u32,
}

impl AuthProvider {
    pub fn new(users: Arc<dyn UserStore>, keys: SessionKeys, bcrypt_cost: u32) -> Self {
        Self {
            users,
            keys,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> AppResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::ValidationError("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::ValidationError("Password is required".to_string()));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already registered".to_string()));
        }

        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

        let user = self.users.create_user(username, &hash).await?;
        info!(user_id = user.id, username = %user.username, "user registered");

        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<TokenResponse> {
        let user = self
            .users
            .verify_credential(username.trim(), password)
            .await?
            .ok_or_else(|| {
                AppError::AuthenticationError("Incorrect username or password".to_string())
            })?;

        debug!(user_id = user.id, "login succeeded");

        Ok(TokenResponse {
            access_token: self.issue_token(&user)?,
            token_type: "bearer".to_string(),
        })
    }

    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        self.keys.create_token(user)
    }

    pub async fn resolve_caller(&self, token: &str) -> AppResult<CurrentUser> {
        let claims = self.keys.verify_token(token)?;
        let user_id = claims.user_id()?;

        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            AppError::AuthenticationError("Token refers to an unknown user".to_string())
        })?;

        Ok(CurrentUser {
            id: user.id,
            username: user.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn provider() -> AuthProvider {
        AuthProvider::new(
            Arc::new(MemoryStore::new()),
            SessionKeys::new("test-secret", 30).unwrap(),
            4,
        )
    }

    #[tokio::test]
    async fn register_login_and_resolve() {
        let auth = provider();
        let user = auth.register("  alice ", "pw").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "pw");

        let token = auth.login("alice", "pw").await.unwrap();
        assert_eq!(token.token_type, "bearer");

        let caller = auth.resolve_caller(&token.access_token).await.unwrap();
        assert_eq!(
            caller,
            CurrentUser {
                id: user.id,
                username: "alice".to_string()
            }
        );
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let auth = provider();
        auth.register("alice", "pw").await.unwrap();
        let err = auth.register("alice", "other").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn empty_credentials_are_rejected() {
        let auth = provider();
        assert!(matches!(
            auth.register(" ", "pw").await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            auth.register("bob", "").await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthenticated() {
        let auth = provider();
        auth.register("alice", "pw").await.unwrap();
        assert!(matches!(
            auth.login("alice", "nope").await,
            Err(AppError::AuthenticationError(_))
        ));
        assert!(matches!(
            auth.login("nobody", "pw").await,
            Err(AppError::AuthenticationError(_))
        ));
    }

    #[tokio::test]
    async fn token_for_unknown_user_is_rejected() {
        let auth = provider();
        let ghost = User {
            id: 999,
            username: "ghost".to_string(),
            password_hash: String::new(),
            created_at: chrono::Utc::now(),
        };
        let token = auth.issue_token(&ghost).unwrap();
        assert!(matches!(
            auth.resolve_caller(&token).await,
            Err(AppError::AuthenticationError(_))
        ));
    }
}
