pub mod auth;
pub mod notification;
pub mod plant;

use std::future::Future;
use std::sync::Arc;

use crate::effect::Effect;
use crate::environment::error::ApiError;
use crate::environment::{Backend, Environment};

/// Run `call` against the backend if a session token is present and
/// `precondition` holds. Otherwise `done` receives the error right away and
/// no request is made.
pub(crate) fn guarded<A, T, F, Fut>(
    environment: &Environment,
    precondition: Result<(), ApiError>,
    call: F,
    done: impl FnOnce(Result<T, ApiError>) -> A + Send + 'static,
) -> Effect<A>
where
    A: Send + 'static,
    T: Send + 'static,
    F: FnOnce(Arc<dyn Backend>) -> Fut,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    let checked = environment
        .token()
        .ok_or(ApiError::AuthenticationRequired)
        .and(precondition);
    match checked {
        Ok(()) => Effect::future(call(environment.backend.clone()), done),
        Err(e) => {
            log::debug!("Request not sent: {e}");
            Effect::action(done(Err(e)))
        }
    }
}

pub(crate) fn require(value: &str, what: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::invalid(format!("{what} is required")))
    } else {
        Ok(())
    }
}
