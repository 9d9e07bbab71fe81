//! Account service: registration and login.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use noticeboard_common::{AppError, AppResult, IdGenerator};
use noticeboard_db::{
    entities::account::{self, Role},
    repositories::AccountRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::services::token::TokenService;

/// Account service for business logic.
#[derive(Clone)]
pub struct AccountService {
    account_repo: AccountRepository,
    tokens: TokenService,
    id_gen: IdGenerator,
}

/// Input for registering an account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    /// `admin` or `student`.
    pub role: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl From<account::Model> for AccountSummary {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            role: model.role,
        }
    }
}

/// Token plus the account it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: AccountSummary,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(account_repo: AccountRepository, tokens: TokenService) -> Self {
        Self {
            account_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and issue a token for it.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        input.validate()?;

        let role = Role::parse(&input.role)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid role: {}", input.role)))?;

        let email = input.email.trim().to_lowercase();

        if self.account_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let model = account::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            email: Set(email),
            password: Set(hash_password(&input.password)?),
            role: Set(role),
            created_at: Set(Utc::now()),
        };

        // The unique index still catches a concurrent registration.
        let account = self.account_repo.create(model).await?;

        info!(account_id = %account.id, role = account.role.as_str(), "Account registered");

        self.session(account)
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthSession> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        let account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(&input.password, &account.password)? {
            return Err(AppError::Unauthorized);
        }

        info!(account_id = %account.id, "Account logged in");

        self.session(account)
    }

    fn session(&self, account: account::Model) -> AppResult<AuthSession> {
        let token = self.tokens.issue(&account)?;
        Ok(AuthSession {
            token,
            user: account.into(),
        })
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use noticeboard_common::config::AuthConfig;
    use noticeboard_db::test_utils::account_fixture;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn tokens() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 7,
            require_auth_for_reads: true,
        })
    }

    fn service(db: MockDatabase) -> AccountService {
        AccountService::new(AccountRepository::new(Arc::new(db.into_connection())), tokens())
    }

    fn register_input(role: &str) -> RegisterInput {
        RegisterInput {
            name: "Asha".to_string(),
            email: "Asha@College.edu".to_string(),
            password: "secret1".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_issues_token() {
        let stored = account_fixture("a1", "asha@college.edu", Role::Student);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<account::Model>::new()])
            .append_query_results([[stored]]);

        let session = service(db).register(register_input("student")).await.unwrap();

        assert_eq!(session.user.id, "a1");
        assert_eq!(session.user.role, Role::Student);
        let claims = tokens().verify(&session.token).unwrap();
        assert_eq!(claims.id, "a1");
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let result = service(db).register(register_input("teacher")).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);
        let mut input = register_input("student");
        input.password = "123".to_string();

        let result = service(db).register(input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let existing = account_fixture("a1", "asha@college.edu", Role::Student);
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]);

        let result = service(db).register(register_input("student")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let mut account = account_fixture("a1", "asha@college.edu", Role::Admin);
        account.password = hash_password("secret1").unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[account.clone()]])
            .append_query_results([[account]]);
        let service = service(db);

        let ok = service
            .login(LoginInput {
                email: "asha@college.edu".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(ok.user.role, Role::Admin);

        let bad = service
            .login(LoginInput {
                email: "asha@college.edu".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        assert!(matches!(bad, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<account::Model>::new()]);

        let result = service(db)
            .login(LoginInput {
                email: "nobody@college.edu".to_string(),
                password: "secret1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
