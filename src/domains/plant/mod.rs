mod action;
mod orchestrator;
mod reducer;
mod state;

pub use action::{PlantAction, PlantOperation};
pub use orchestrator::orchestrate;
pub use reducer::reduce;
pub use state::PlantState;

pub struct PlantDomain;

impl crate::store::Domain for PlantDomain {
    type Action = PlantAction;
    type State = PlantState;

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
