use crate::domains::auth::AuthAction;
use crate::effect::RequestId;
use crate::environment::config::ApiConfig;
use crate::environment::error::ApiError;
use crate::environment::{Environment, Repository};
use crate::store::Store;

/// Configure `env_logger`. Safe to call more than once.
pub fn init_logging() {
    use env_logger::Env;
    use std::io::Write;
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stdout)
        .try_init();
}

/// Start the store and restore the session persisted by a previous run
pub fn bootstrap(environment: Environment) -> Store {
    let stored = environment.repository.load();
    let store = Store::start(environment);
    match stored {
        Some(session) if session.is_authenticated() && session.user.is_some() => {
            log::info!("Restoring session for user {:?}", session.user_id());
            store.dispatch(AuthAction::Restore(session));
            // Refresh the cached profile
            store.dispatch(AuthAction::FetchUser(RequestId::next()));
        }
        _ => log::debug!("No stored session"),
    }
    store
}

/// Wire up logging, configuration and persistence, then start the store.
/// Must be called from within a tokio runtime.
pub fn run() -> Result<Store, ApiError> {
    init_logging();
    let config = ApiConfig::from_env();
    log::info!("Using API at {}", config.base_url);
    let environment = Environment::new(&config, Repository::new())?;
    Ok(bootstrap(environment))
}
