use crate::environment::types::{Session, User};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AuthStatus {
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuthState {
    pub loading: bool,
    pub session: Session,
    pub error: Option<String>,
}

impl AuthState {
    pub fn status(&self) -> AuthStatus {
        if self.session.is_authenticated() {
            AuthStatus::Authenticated
        } else if self.loading {
            AuthStatus::Authenticating
        } else {
            AuthStatus::Anonymous
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }
}
