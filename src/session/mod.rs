//! Authentication state shared by all page controllers.
//!
//! The store is created once at startup and handed to whoever needs it.
//! Credentials are not verified; any non-blank email and password log in.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ws_types::WsMessage;
use crate::services::Notifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,

    #[error("name is required")]
    MissingName,
}

/// Named views the dashboard can navigate between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "camelCase")]
pub enum Route {
    Landing,
    Home,
    Masters,
    MasterDetail { address: String },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".into(),
            Route::Home => "/home".into(),
            Route::Masters => "/masters".into(),
            Route::MasterDetail { address } => format!("/masters/{address}"),
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            [""] => Some(Route::Landing),
            ["home"] => Some(Route::Home),
            ["masters"] => Some(Route::Masters),
            ["masters", address] => Some(Route::MasterDetail {
                address: (*address).to_string(),
            }),
            _ => None,
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Landing)
    }
}

#[derive(Debug, Default)]
struct SessionInner {
    user: Option<User>,
    /// Bumped on every logout so in-flight page loads can tell they are stale.
    epoch: u64,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionInner>>,
    notifier: Notifier,
}

impl SessionStore {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner::default())),
            notifier,
        }
    }

    fn read<T>(&self, f: impl FnOnce(&SessionInner) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut SessionInner) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn current_user(&self) -> Option<User> {
        self.read(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.user.is_some())
    }

    pub fn epoch(&self) -> u64 {
        self.read(|s| s.epoch)
    }

    fn sign_in(&self, user: User) -> User {
        self.write(|s| s.user = Some(user.clone()));
        tracing::info!(user_id = %user.id, "Session started");
        user
    }

    pub async fn login(&self, credentials: Credentials) -> Result<User, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            self.notifier.error("Login failed");
            return Err(AuthError::MissingCredentials);
        }

        let user = self.sign_in(User {
            id: "123".into(),
            name: "Demo User".into(),
            email: credentials.email,
        });
        self.notifier.info("Login successful", "Welcome back!");
        Ok(user)
    }

    pub async fn login_with_google(&self) -> Result<User, AuthError> {
        let user = self.sign_in(User {
            id: "123".into(),
            name: "Google User".into(),
            email: "google@example.com".into(),
        });
        self.notifier.info("Google login successful", "Welcome!");
        Ok(user)
    }

    pub async fn signup(&self, credentials: Credentials, name: &str) -> Result<User, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            self.notifier.error("Signup failed");
            return Err(AuthError::MissingCredentials);
        }
        if name.trim().is_empty() {
            self.notifier.error("Signup failed");
            return Err(AuthError::MissingName);
        }

        let user = self.sign_in(User {
            id: "456".into(),
            name: name.to_string(),
            email: credentials.email,
        });
        self.notifier.info("Signup successful", "Welcome to Solana Copy Masters!");
        Ok(user)
    }

    /// Ends the session and invalidates every load issued under it.
    pub fn logout(&self) {
        let was_signed_in = self.write(|s| {
            s.epoch += 1;
            s.user.take().is_some()
        });
        if was_signed_in {
            tracing::info!("Session ended");
        }
        self.notifier.info("Logged out", "See you again soon!");
        self.notifier.publish(WsMessage::SessionEnded);
    }

    /// Where a request for `requested` should land given the session.
    pub fn resolve(&self, requested: Route) -> Route {
        let authenticated = self.is_authenticated();
        match requested {
            Route::Landing if authenticated => Route::Home,
            route if route.requires_session() && !authenticated => Route::Landing,
            Route::MasterDetail { address } if address.trim().is_empty() => Route::Masters,
            route => route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_logout() {
        let session = SessionStore::new(Notifier::default());
        assert!(!session.is_authenticated());

        let user = session.login(creds("a@b.com", "pw")).await.unwrap();
        assert_eq!(user.name, "Demo User");
        assert_eq!(session.current_user(), Some(user));

        let epoch = session.epoch();
        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.epoch(), epoch + 1);
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let session = SessionStore::new(Notifier::default());
        assert!(matches!(
            session.login(creds(" ", "pw")).await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_signup_and_google() {
        let session = SessionStore::new(Notifier::default());
        let user = session.signup(creds("x@y.z", "pw"), "Ana").await.unwrap();
        assert_eq!(user.id, "456");
        assert_eq!(user.name, "Ana");

        assert!(session.signup(creds("x@y.z", "pw"), "").await.is_err());

        let google = session.login_with_google().await.unwrap();
        assert_eq!(google.email, "google@example.com");
    }

    #[tokio::test]
    async fn test_route_resolution() {
        let session = SessionStore::new(Notifier::default());
        assert_eq!(session.resolve(Route::Masters), Route::Landing);
        assert_eq!(session.resolve(Route::Landing), Route::Landing);

        session.login(creds("a@b.com", "pw")).await.unwrap();
        assert_eq!(session.resolve(Route::Landing), Route::Home);
        assert_eq!(session.resolve(Route::Masters), Route::Masters);
        assert_eq!(
            session.resolve(Route::MasterDetail { address: "".into() }),
            Route::Masters
        );
        assert_eq!(
            Route::MasterDetail { address: "Cx1".into() }.path(),
            "/masters/Cx1"
        );
    }

    #[test]
    fn test_route_from_path() {
        assert_eq!(Route::from_path("/"), Some(Route::Landing));
        assert_eq!(Route::from_path("/home"), Some(Route::Home));
        assert_eq!(Route::from_path("/masters/"), Some(Route::Masters));
        assert_eq!(
            Route::from_path("/masters/Cx1"),
            Some(Route::MasterDetail { address: "Cx1".into() })
        );
        assert_eq!(Route::from_path("/settings"), None);
    }
}
