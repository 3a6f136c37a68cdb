use strum_macros::{Display, IntoStaticStr};

use crate::effect::RequestId;
use crate::environment::error::ApiError;
use crate::environment::types::{Credentials, ProfileUpdate, Session, User};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, IntoStaticStr)]
pub enum AuthOperation {
    Login,
    Register,
    FetchUser,
    UpdateProfile,
}

#[derive(Clone, Debug)]
pub enum AuthAction {
    Login(RequestId, Credentials),
    LoggedIn(RequestId, Result<Session, ApiError>),

    /// Creates the account and loads its profile with the new token
    Register(RequestId, Credentials),
    Registered(RequestId, Result<Session, ApiError>),

    FetchUser(RequestId),
    UserFetched(RequestId, Result<User, ApiError>),

    UpdateProfile(RequestId, ProfileUpdate),
    ProfileUpdated(RequestId, Result<User, ApiError>),

    Logout,
    /// The server rejected our token
    SessionInvalidated,
    /// A session read back from disk at startup
    Restore(Session),
    ClearError,
}

impl AuthAction {
    pub fn request(&self) -> Option<(AuthOperation, RequestId)> {
        match self {
            AuthAction::Login(id, _) => Some((AuthOperation::Login, *id)),
            AuthAction::Register(id, _) => Some((AuthOperation::Register, *id)),
            AuthAction::FetchUser(id) => Some((AuthOperation::FetchUser, *id)),
            AuthAction::UpdateProfile(id, _) => Some((AuthOperation::UpdateProfile, *id)),
            _ => None,
        }
    }

    pub fn completion(&self) -> Option<(AuthOperation, RequestId, bool)> {
        match self {
            AuthAction::LoggedIn(id, r) => Some((AuthOperation::Login, *id, r.is_ok())),
            AuthAction::Registered(id, r) => Some((AuthOperation::Register, *id, r.is_ok())),
            AuthAction::UserFetched(id, r) => Some((AuthOperation::FetchUser, *id, r.is_ok())),
            AuthAction::ProfileUpdated(id, r) => {
                Some((AuthOperation::UpdateProfile, *id, r.is_ok()))
            }
            _ => None,
        }
    }
}
