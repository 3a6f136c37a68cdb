mod action;
mod orchestrator;
mod reducer;
mod state;

pub use action::{NotificationAction, NotificationOperation};
pub use orchestrator::orchestrate;
pub use reducer::reduce;
pub use state::NotificationState;

pub struct NotificationDomain;

impl crate::store::Domain for NotificationDomain {
    type Action = NotificationAction;
    type State = NotificationState;

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
