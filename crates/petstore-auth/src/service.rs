//! Authentication service: login and default account seeding.

use petstore_core::error::{PetstoreError, PetstoreResult};
use petstore_core::identity::Authority;
use petstore_core::models::audit::SYSTEM_ACTOR;
use petstore_core::models::user::{CreateUser, User};
use petstore_core::pagination::PageRequest;
use petstore_core::repository::{CrudRepository, UserRepository};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Credentials posted to the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub id_token: String,
    /// Access token lifetime in seconds.
    #[serde(skip)]
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify `login`/`password` and issue an access token.
    ///
    /// Unknown logins and wrong passwords produce the same
    /// [`AuthError::InvalidCredentials`] so callers cannot probe for
    /// existing accounts.
    pub async fn authenticate(&self, input: LoginInput) -> PetstoreResult<LoginOutput> {
        let user = match self.user_repo.get_by_login(&input.username).await {
            Ok(u) => u,
            Err(PetstoreError::NotFound { .. }) => {
                warn!(login = %input.username, "Login attempt for unknown user");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(login = %user.login, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.activated {
            return Err(AuthError::AccountInactive.into());
        }

        let id_token = token::issue_access_token(&user, &self.config)?;
        info!(login = %user.login, "User authenticated");

        Ok(LoginOutput {
            id_token,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Create the `admin` and `user` accounts if no user exists yet.
    ///
    /// Returns the seeded accounts (empty when the table was not empty).
    pub async fn seed_default_users(&self) -> PetstoreResult<Vec<User>> {
        let existing = self
            .user_repo
            .list(PageRequest {
                size: 1,
                ..Default::default()
            })
            .await?;
        if existing.total > 0 {
            return Ok(Vec::new());
        }

        let seeded = self
            .user_repo
            .create_many(
                vec![
                    default_account("admin", vec![Authority::Admin, Authority::User]),
                    default_account("user", vec![Authority::User]),
                ],
                SYSTEM_ACTOR,
            )
            .await?;
        info!(count = seeded.len(), "Seeded default user accounts");
        Ok(seeded)
    }
}

/// Seeded accounts use their login as the initial password.
fn default_account(login: &str, authorities: Vec<Authority>) -> CreateUser {
    CreateUser {
        login: login.into(),
        password: login.into(),
        first_name: None,
        last_name: None,
        email: Some(format!("{login}@localhost")),
        phone: None,
        activated: true,
        authorities,
    }
}
