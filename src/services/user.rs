//! User service
//!
//! Accounts, password login, sign-up and cookie sessions.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{FormErrors, Session, User, UserRole, NON_FIELD_ERRORS};
use crate::services::password::{hash_password, make_unusable_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 14;

/// Maximum username length
pub const USERNAME_MAX_LEN: usize = 150;

const REQUIRED: &str = "Обязательное поле.";
const INVALID_LOGIN: &str =
    "Пожалуйста, введите правильные имя пользователя и пароль. Оба поля могут быть чувствительны к регистру.";
const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";
const PASSWORD_MISMATCH: &str = "Введенные пароли не совпадают.";

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Form input rejected
    #[error("Validation error: {0}")]
    ValidationError(FormErrors),

    /// Referenced user does not exist
    #[error("User not found: {0}")]
    UserNotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_expiration(user_repo, session_repo, DEFAULT_SESSION_EXPIRATION_DAYS)
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Sign-up form: a regular user with a password.
    ///
    /// All problems are reported at once, keyed by form field.
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let username = input.username.trim();
        let mut errors = FormErrors::new();

        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username.chars().count() > USERNAME_MAX_LEN {
            errors.add(
                "username",
                format!(
                    "Убедитесь, что это значение содержит не более {} символов (сейчас {}).",
                    USERNAME_MAX_LEN,
                    username.chars().count()
                ),
            );
        } else if self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            errors.add("username", USERNAME_TAKEN);
        }

        if input.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if input.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if !input.password1.is_empty() && input.password1 != input.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }

        errors.into_result().map_err(UserServiceError::ValidationError)?;

        let password_hash = hash_password(&input.password1).context("Failed to hash password")?;
        let user = self
            .user_repo
            .create(&User::new(username.to_string(), password_hash, UserRole::User))
            .await
            .context("Failed to create user")?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Create an account directly, without form validation.
    ///
    /// Without a password the account can only be signed in with
    /// [`UserService::force_login`].
    pub async fn create_user(
        &self,
        username: &str,
        password: Option<&str>,
        role: UserRole,
    ) -> Result<User, UserServiceError> {
        let password_hash = match password {
            Some(password) => hash_password(password).context("Failed to hash password")?,
            None => make_unusable_password(),
        };

        let user = self
            .user_repo
            .create(&User::new(username.to_string(), password_hash, role))
            .await
            .with_context(|| format!("Failed to create user '{}'", username))?;

        tracing::debug!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Check credentials and open a session
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let mut errors = FormErrors::new();
        if input.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        }
        if input.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result().map_err(UserServiceError::ValidationError)?;

        let user = self
            .user_repo
            .get_by_username(input.username.trim())
            .await
            .context("Failed to get user by username")?
            .ok_or_else(|| UserServiceError::AuthenticationError(INVALID_LOGIN.to_string()))?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            tracing::debug!(username = %user.username, "Login rejected");
            return Err(UserServiceError::AuthenticationError(
                INVALID_LOGIN.to_string(),
            ));
        }

        let session = self.create_session(user.id).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(session)
    }

    /// Open a session for `user_id` without checking a password
    pub async fn force_login(&self, user_id: i64) -> Result<Session, UserServiceError> {
        if self
            .user_repo
            .get_by_id(user_id)
            .await
            .context("Failed to get user by ID")?
            .is_none()
        {
            return Err(UserServiceError::UserNotFound(user_id));
        }

        self.create_session(user_id).await
    }

    /// Logout (invalidate session)
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;

        tracing::debug!("Session closed");
        Ok(())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?;

        Ok(user)
    }

    /// Resolve a session token to its user.
    ///
    /// Unknown and expired tokens give `None`; expired sessions are removed.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo
                .delete(token)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        self.get_by_id(session.user_id).await
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            user_id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }
}

/// Sign-up form input
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl RegisterInput {
    pub fn new(
        username: impl Into<String>,
        password1: impl Into<String>,
        password2: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password1: password1.into(),
            password2: password2.into(),
        }
    }
}

/// Login form input
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl UserServiceError {
    /// Form errors to show next to the submitted form, if this error has any
    pub fn form_errors(&self) -> Option<FormErrors> {
        match self {
            UserServiceError::ValidationError(errors) => Some(errors.clone()),
            UserServiceError::AuthenticationError(message) => {
                Some(FormErrors::single(NON_FIELD_ERRORS, message.clone()))
            }
            _ => None,
        }
    }
}
