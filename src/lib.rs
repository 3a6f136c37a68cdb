//! Client-side request orchestration for a plant care backend: an
//! authenticated REST client, a durable session store and a reducer/effect
//! store for the plant, auth and notification domains.

mod app;
pub mod domains;
pub mod effect;
pub mod environment;
mod helper;
pub mod store;

pub use app::{bootstrap, init_logging, run};
pub use environment::config::ApiConfig;
pub use environment::error::ApiError;
pub use environment::Environment;
pub use store::{Action, AppState, Store, Ticket};

/// Handy macro for future localization
#[macro_export]
macro_rules! loc {
    ($x:expr $(,)?) => {
        $x
    };
}
