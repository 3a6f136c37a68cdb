use super::action::AuthAction;
use super::state::AuthState;
use crate::environment::error::{auth_failure_message, AuthFlow};

pub fn reduce(action: &AuthAction, state: &mut AuthState) {
    match action {
        AuthAction::Login(..)
        | AuthAction::Register(..)
        | AuthAction::FetchUser(_)
        | AuthAction::UpdateProfile(..) => {
            state.loading = true;
            state.error = None;
        }
        AuthAction::LoggedIn(_, result) | AuthAction::Registered(_, result) => {
            state.loading = false;
            match result {
                Ok(session) => state.session = session.clone(),
                Err(e) => {
                    let flow = match action {
                        AuthAction::Registered(..) => AuthFlow::Register,
                        _ => AuthFlow::Login,
                    };
                    state.error = Some(auth_failure_message(flow, e));
                }
            }
        }
        AuthAction::UserFetched(_, result) | AuthAction::ProfileUpdated(_, result) => {
            state.loading = false;
            match result {
                Ok(user) => state.session.user = Some(user.clone()),
                Err(e) => state.error = Some(e.user_message()),
            }
        }
        AuthAction::Logout | AuthAction::SessionInvalidated => *state = AuthState::default(),
        AuthAction::Restore(session) => state.session = session.clone(),
        AuthAction::ClearError => state.error = None,
    }
}
