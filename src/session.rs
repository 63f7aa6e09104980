use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// Shared holder of the bearer token for the current user.
///
/// Cloning is cheap; all clones see the same token.
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token)),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Drops the token. Returns whether one was held.
    pub fn clear(&self) -> bool {
        self.token.write().take().is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_token() {
        let session = Session::default();
        let other = session.clone();
        session.set_token("t1");
        assert_eq!(other.token().as_deref(), Some("t1"));
        assert!(other.clear());
        assert!(!session.is_authenticated());
        assert!(!session.clear());
    }

    #[test]
    fn debug_never_prints_the_token() {
        let session = Session::new(Some("secret-token".into()));
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("authenticated: true"));
    }
}
