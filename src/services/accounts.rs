use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{self, JwtError, TokenPair, TokenType};
use crate::config;
use crate::database::models::{Profile, User};
use crate::database::{DatabaseError, Store};
use crate::types::Identity;

use super::{validate, ServiceError};

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";
const INVALID_TOKEN: &str = "Token is invalid or expired";

#[derive(Debug, Deserialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Registered {
    pub profile: Profile,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user: User,
    pub profile: Profile,
}

/// Identity store: registration, credentials and token issuance
pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create an identity and its profile, returning the profile with a token pair
    pub async fn register(&self, input: Registration) -> Result<Registered, ServiceError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_string();
        validate::username(&username)?;
        validate::password(&input.password)?;
        validate::email(&email)?;
        let full_name = validate::optional_name("full_name", input.full_name)?;

        if self.store.find_user_by_username(&username).await?.is_some() {
            return Err(username_taken());
        }

        let iterations = config::config().security.password_iterations;
        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password, iterations))
            .await
            .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {}", e)))?;

        let user = User::new(username, password_hash);
        let mut profile = Profile::new(user.id, email);
        profile.full_name = full_name;

        match self.store.create_account(&user, &profile).await {
            Ok(()) => {}
            Err(DatabaseError::UniqueViolation(_)) => return Err(username_taken()),
            Err(e) => return Err(e.into()),
        }

        let identity = Identity::new(user.id, user.username.clone());
        let tokens = auth::issue_token_pair(&identity)?;
        tracing::info!("Registered user '{}' ({})", identity.username, identity.id);
        Ok(Registered { profile, tokens })
    }

    /// Exchange credentials for an access/refresh token pair
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ServiceError> {
        let Some(user) = self.store.find_user_by_username(username.trim()).await? else {
            tracing::warn!("Login failed for unknown user '{}'", username);
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        };

        let password = password.to_string();
        let encoded = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || auth::verify_password(&password, &encoded))
            .await
            .map_err(|e| ServiceError::Internal(format!("password verification task failed: {}", e)))??;

        if !verified {
            tracing::warn!("Login failed for user '{}'", user.username);
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        Ok(auth::issue_token_pair(&Identity::new(user.id, user.username))?)
    }

    /// Issue a fresh access token from a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, ServiceError> {
        let identity = self.resolve(refresh_token, TokenType::Refresh).await?;
        let access = auth::generate_jwt(&auth::Claims::access(&identity))?;
        Ok(AccessToken { access })
    }

    /// Resolve a bearer access token to the identity it names
    pub async fn authenticate(&self, access_token: &str) -> Result<Identity, ServiceError> {
        self.resolve(access_token, TokenType::Access).await
    }

    pub async fn whoami(&self, identity: &Identity) -> Result<WhoAmI, ServiceError> {
        let user = self
            .store
            .find_user(identity.id)
            .await?
            .ok_or_else(|| ServiceError::Unauthenticated("User not found".to_string()))?;
        let profile = self
            .store
            .get_profile(identity.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile"))?;
        Ok(WhoAmI { user, profile })
    }

    /// Validate a token of the given type and check its identity still exists
    async fn resolve(&self, token: &str, token_type: TokenType) -> Result<Identity, ServiceError> {
        let claims = match auth::validate_jwt(token, token_type) {
            Ok(claims) => claims,
            Err(JwtError::InvalidSecret) => return Err(JwtError::InvalidSecret.into()),
            Err(e) => {
                tracing::warn!("Rejected {:?} token: {}", token_type, e);
                return Err(ServiceError::Unauthenticated(INVALID_TOKEN.to_string()));
            }
        };

        match self.store.find_user(claims.sub).await? {
            Some(user) => Ok(Identity::new(user.id, user.username)),
            None => Err(ServiceError::Unauthenticated("User not found".to_string())),
        }
    }
}

fn username_taken() -> ServiceError {
    ServiceError::Conflict("A user with that username already exists.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.to_string(),
            password: "correct horse battery".to_string(),
            email: format!("{}@example.com", username),
            full_name: Some("Alice Liddell".to_string()),
        }
    }

    #[tokio::test]
    async fn register_creates_identity_and_profile() {
        let ctx = TestContext::new();
        let service = AccountService::new(ctx.store.clone());

        let registered = service.register(registration("alice")).await.unwrap();
        assert_eq!(registered.profile.email, "alice@example.com");
        assert_eq!(registered.profile.full_name.as_deref(), Some("Alice Liddell"));

        let identity = service.authenticate(&registered.tokens.access).await.unwrap();
        assert_eq!(identity.id, registered.profile.id);
        assert_eq!(identity.username, "alice");

        let me = service.whoami(&identity).await.unwrap();
        assert_eq!(me.user.id, me.profile.id);
    }

    #[tokio::test]
    async fn register_validates_and_rejects_duplicates() {
        let ctx = TestContext::new();
        let service = AccountService::new(ctx.store.clone());
        service.register(registration("alice")).await.unwrap();

        let err = service.register(registration("alice")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let short = Registration {
            password: "short".to_string(),
            ..registration("bob")
        };
        let err = service.register(short).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some("password"), .. }));

        let bad_email = Registration {
            email: "bob".to_string(),
            ..registration("bob")
        };
        let err = service.register(bad_email).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some("email"), .. }));

        let long_name = Registration {
            full_name: Some("n".repeat(300)),
            ..registration("bob")
        };
        let err = service.register(long_name).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some("full_name"), .. }));
        assert!(ctx.store.find_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_checks_credentials() {
        let ctx = TestContext::new();
        let service = AccountService::new(ctx.store.clone());
        service.register(registration("alice")).await.unwrap();

        let pair = service.login("alice", "correct horse battery").await.unwrap();
        assert!(service.authenticate(&pair.access).await.is_ok());

        for (user, pass) in [("alice", "wrong password"), ("nobody", "correct horse battery")] {
            let err = service.login(user, pass).await.unwrap_err();
            assert!(matches!(err, ServiceError::Unauthenticated(ref m) if m == INVALID_CREDENTIALS));
        }
    }

    #[tokio::test]
    async fn token_types_are_not_interchangeable() {
        let ctx = TestContext::new();
        let service = AccountService::new(ctx.store.clone());
        let pair = service.register(registration("alice")).await.unwrap().tokens;

        let err = service.authenticate(&pair.refresh).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
        let err = service.refresh(&pair.access).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));

        let fresh = service.refresh(&pair.refresh).await.unwrap();
        assert!(service.authenticate(&fresh.access).await.is_ok());
    }

    #[tokio::test]
    async fn tokens_of_closed_accounts_are_rejected() {
        let ctx = TestContext::new();
        let service = AccountService::new(ctx.store.clone());
        let registered = service.register(registration("alice")).await.unwrap();

        ctx.store.delete_profile(registered.profile.id).await.unwrap();

        let err = service.authenticate(&registered.tokens.access).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }
}
