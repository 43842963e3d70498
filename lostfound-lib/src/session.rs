use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not logged in")]
    NotLoggedIn,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub username: String,
    token: String,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Shared login state handed to the client and views.
///
/// Begins on a successful login and ends on logout; nothing outlives the process.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub async fn begin(&self, username: impl ToString, token: impl ToString) -> Session {
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            token: token.to_string(),
        };
        let previous = self.inner.write().await.replace(session.clone());
        if let Some(previous) = previous {
            log::debug!("replaced session {}", previous.session_id);
        }
        log::info!("{} logged in", session.username);
        session
    }

    pub async fn end(&self) -> Option<Session> {
        let session = self.inner.write().await.take();
        if let Some(session) = &session {
            log::info!("{} logged out", session.username);
        }
        session
    }

    pub async fn current(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.read().await.is_some()
    }

    pub async fn token(&self) -> Result<String, SessionError> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(SessionError::NotLoggedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionContext, SessionError};

    #[tokio::test]
    async fn test_lifecycle() {
        let context = SessionContext::default();
        assert!(matches!(
            context.token().await,
            Err(SessionError::NotLoggedIn)
        ));

        let shared = context.clone();
        let session = context.begin("ada", "t0ken").await;
        assert_eq!("t0ken", session.token());
        assert!(shared.is_logged_in().await);
        assert_eq!("t0ken", shared.token().await.unwrap());

        let ended = shared.end().await.unwrap();
        assert_eq!(session, ended);
        assert!(!context.is_logged_in().await);
        assert!(context.end().await.is_none());
    }

    #[tokio::test]
    async fn test_begin_replaces_previous_session() {
        let context = SessionContext::default();
        let first = context.begin("ada", "one").await;
        let second = context.begin("bob", "two").await;
        assert_ne!(first.session_id, second.session_id);
        assert_eq!("bob", context.current().await.unwrap().username);
    }
}
