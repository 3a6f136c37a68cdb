mod action;
mod orchestrator;
mod reducer;
mod state;

pub use action::{AuthAction, AuthOperation};
pub use orchestrator::orchestrate;
pub use reducer::reduce;
pub use state::{AuthState, AuthStatus};

pub use crate::environment::error::{auth_failure_message as failure_message, AuthFlow};

pub struct AuthDomain;

impl crate::store::Domain for AuthDomain {
    type Action = AuthAction;
    type State = AuthState;

    fn reduce(action: &Self::Action, state: &mut Self::State) {
        reduce(action, state)
    }

    fn orchestrate(
        action: &Self::Action,
        environment: &crate::environment::Environment,
    ) -> crate::effect::Effect<Self::Action> {
        orchestrate(action, environment)
    }
}
