use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Supplies the identity the stores are scoped by. Owned by an external
/// authentication subsystem; services read it per call and never cache the
/// user id beyond the call.
#[async_trait]
pub trait SessionContext: Send + Sync {
    /// User id of the live session, if any.
    async fn current_user(&self) -> Option<String>;

    async fn is_live(&self, user_id: &str) -> bool {
        self.current_user().await.as_deref() == Some(user_id)
    }
}

/// Process-local session handle: login/logout flips the identity the
/// services will accept writes for.
#[derive(Default)]
pub struct AuthSession {
    current: RwLock<Option<String>>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn login(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        debug!(user_id = %user_id, "session login");
        *self.current.write().await = Some(user_id);
    }

    pub async fn logout(&self) {
        debug!("session logout");
        *self.current.write().await = None;
    }
}

#[async_trait]
impl SessionContext for AuthSession {
    async fn current_user(&self) -> Option<String> {
        self.current.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_makes_user_live_and_logout_revokes() {
        let session = AuthSession::new();
        assert_eq!(session.current_user().await, None);

        session.login("u1").await;
        assert!(session.is_live("u1").await);
        assert!(!session.is_live("u2").await);

        session.logout().await;
        assert!(!session.is_live("u1").await);
    }

    #[tokio::test]
    async fn login_replaces_previous_identity() {
        let session = AuthSession::new();
        session.login("u1").await;
        session.login("u2").await;
        assert!(!session.is_live("u1").await);
        assert!(session.is_live("u2").await);
    }
}
