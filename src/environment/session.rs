use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use super::error::ApiError;
use super::types::{Session, User};

/// Shared read access to the current session for the HTTP pipeline and the
/// orchestrators. Only the auth orchestrator writes to it.
#[derive(Clone, Default)]
pub struct SessionHandle(Arc<RwLock<Session>>);

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("authenticated", &self.read().is_authenticated())
            .finish()
    }
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(RwLock::new(session)))
    }

    pub fn token(&self) -> Option<String> {
        self.read().token().map(str::to_string)
    }

    pub fn user_id(&self) -> Option<String> {
        self.read().user_id().map(str::to_string)
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn set(&self, session: Session) {
        *self.write() = session;
    }

    pub fn set_user(&self, user: User) {
        self.write().user = Some(user);
    }

    pub fn clear(&self) {
        *self.write() = Session::default();
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

const USER_ID_CLAIMS: [&str; 4] = ["userId", "id", "_id", "sub"];

/// Pull the user id out of a JWT's payload. The signature is not checked;
/// the value is only forwarded as a convenience header.
pub fn decode_user_id(token: &str) -> Result<String, ApiError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ApiError::Decode("Token has no payload segment".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ApiError::Decode(format!("Token payload: {e}")))?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes)?;
    USER_ID_CLAIMS
        .iter()
        .find_map(|claim| match claims.get(*claim) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| ApiError::Decode("Token has no user id claim".to_string()))
}

#[cfg(test)]
pub(crate) fn make_token(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
