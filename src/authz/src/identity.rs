//! Lazily authenticated caller identity
//!
//! A request carries credentials from the start but only authenticates
//! when something actually needs the user: a role check that is not
//! satisfied by [`ANYONE`](crate::roles::ANYONE), or the root page
//! deciding between "log in" and "forbidden". The outcome is cached for
//! the rest of the request.

use crate::error::{AuthzError, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use wiking_core::User;

/// Credentials presented with a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub login: Option<String>,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn login(login: impl Into<String>) -> Self {
        Self {
            login: Some(login.into()),
        }
    }
}

/// Turns credentials into a user
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `Ok(None)` when no credentials were presented, an error when they
    /// were presented but rejected
    async fn authenticate(&self, credentials: &Credentials) -> Result<Option<Arc<dyn User>>>;
}

/// Authenticator that never recognises anybody
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuthentication;

#[async_trait]
impl Authenticator for NoAuthentication {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Option<Arc<dyn User>>> {
        Ok(None)
    }
}

type Outcome = std::result::Result<Option<Arc<dyn User>>, String>;

/// Per-request identity with at-most-once authentication
pub struct Identity {
    credentials: Credentials,
    authenticator: Arc<dyn Authenticator>,
    user: OnceCell<Outcome>,
}

impl Identity {
    pub fn new(credentials: Credentials, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            credentials,
            authenticator,
            user: OnceCell::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(Credentials::anonymous(), Arc::new(NoAuthentication))
    }

    /// Identity already resolved to `user`
    pub fn authenticated(user: Arc<dyn User>) -> Self {
        Self {
            credentials: Credentials::login(user.login()),
            authenticator: Arc::new(NoAuthentication),
            user: OnceCell::new_with(Some(Ok(Some(user)))),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The authenticated user, authenticating on first call
    pub async fn user(&self) -> Result<Option<Arc<dyn User>>> {
        let outcome = self
            .user
            .get_or_init(|| async {
                match self.authenticator.authenticate(&self.credentials).await {
                    Ok(user) => {
                        if let Some(user) = &user {
                            debug!(login = user.login(), uid = user.uid(), "Authenticated");
                        }
                        Ok(user)
                    }
                    Err(AuthzError::AuthenticationFailed(msg)) => {
                        warn!(login = ?self.credentials.login, reason = %msg, "Authentication failed");
                        Err(msg)
                    }
                    Err(e) => {
                        warn!(login = ?self.credentials.login, error = %e, "Authentication error");
                        Err(e.to_string())
                    }
                }
            })
            .await;

        match outcome {
            Ok(user) => Ok(user.clone()),
            Err(msg) => Err(AuthzError::AuthenticationFailed(msg.clone())),
        }
    }

    /// Whether authentication has already run for this request
    pub fn is_authenticated_yet(&self) -> bool {
        self.user.initialized()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("credentials", &self.credentials)
            .field("resolved", &self.user.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryAccounts;
    use wiking_core::Account;

    #[tokio::test]
    async fn test_anonymous_identity() {
        let identity = Identity::anonymous();
        assert!(!identity.is_authenticated_yet());
        assert!(identity.user().await.unwrap().is_none());
        assert!(identity.is_authenticated_yet());
    }

    #[tokio::test]
    async fn test_authenticates_at_most_once() {
        let accounts = Arc::new(InMemoryAccounts::new());
        accounts.insert(Account::new(1, "joe"));
        let identity = Identity::new(Credentials::login("joe"), accounts.clone());

        let first = identity.user().await.unwrap().unwrap();
        let second = identity.user().await.unwrap().unwrap();
        assert_eq!(first.uid(), second.uid());
        assert_eq!(accounts.authentications(), 1);
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_cached() {
        let accounts = Arc::new(InMemoryAccounts::new());
        let identity = Identity::new(Credentials::login("mallory"), accounts.clone());

        assert!(matches!(
            identity.user().await,
            Err(AuthzError::AuthenticationFailed(_))
        ));
        assert!(identity.user().await.is_err());
        assert_eq!(accounts.authentications(), 1);
    }

    #[tokio::test]
    async fn test_pre_authenticated_identity() {
        let identity = Identity::authenticated(Arc::new(Account::new(9, "ann")));
        assert!(identity.is_authenticated_yet());
        assert_eq!(identity.user().await.unwrap().unwrap().login(), "ann");
    }
}
