pub mod config;
pub mod error;
pub mod session;
pub mod types;

mod native;
pub use native::*;

#[cfg(test)]
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use flume::{Receiver, Sender};

use self::config::ApiConfig;
use self::error::ApiError;
use self::session::SessionHandle;
use self::types::*;

/// The REST surface the orchestrators talk to. `Model` is the real
/// implementation; tests swap in an in-memory fake.
#[async_trait]
pub trait Backend: Send + Sync {
    /// A backend that authenticates with `token` instead of the session's
    fn with_token(&self, token: &str) -> Arc<dyn Backend>;

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;
    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;
    async fn user_details(&self) -> Result<User, ApiError>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError>;

    async fn plants(&self) -> Result<Vec<Plant>, ApiError>;
    async fn add_plant(&self, plant: &Plant) -> Result<Plant, ApiError>;
    async fn update_plant(&self, id: &str, plant: &Plant) -> Result<Plant, ApiError>;
    async fn delete_plant(&self, id: &str) -> Result<(), ApiError>;
    async fn plant(&self, id: &str) -> Result<Plant, ApiError>;
    async fn identify_plant(&self, image: &[u8]) -> Result<PlantIdentification, ApiError>;
    async fn care_tips(&self, scientific_name: &str) -> Result<CareTips, ApiError>;
    async fn toxicity_info(&self, scientific_name: &str) -> Result<Toxicity, ApiError>;

    /// The journal calls answer with the full, updated plant
    async fn add_journal_entry(
        &self,
        plant_id: &str,
        entry: &JournalEntryInput,
    ) -> Result<Plant, ApiError>;
    async fn update_journal_entry(
        &self,
        plant_id: &str,
        entry_id: &str,
        entry: &JournalEntryInput,
    ) -> Result<Plant, ApiError>;
    async fn delete_journal_entry(&self, plant_id: &str, entry_id: &str) -> Result<Plant, ApiError>;
    async fn export_pdf(&self) -> Result<Vec<u8>, ApiError>;

    async fn notification_history(&self) -> Result<Vec<NotificationRecord>, ApiError>;
    async fn send_test_notification(&self) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct Environment {
    pub backend: Arc<dyn Backend>,
    pub repository: Repository,
    pub session: SessionHandle,
    unauthorized: (Sender<()>, Receiver<()>),
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("session", &self.session)
            .finish()
    }
}

impl Environment {
    /// The production wiring: a `Model` sharing our session handle and
    /// reporting rejected credentials back to us.
    pub fn new(config: &ApiConfig, repository: Repository) -> Result<Self, ApiError> {
        let session = SessionHandle::default();
        let unauthorized = flume::unbounded();
        let model =
            Model::new(config, session.clone())?.with_unauthorized_signal(unauthorized.0.clone());
        Ok(Self {
            backend: Arc::new(model),
            repository,
            session,
            unauthorized,
        })
    }

    pub fn with_backend(
        backend: Arc<dyn Backend>,
        repository: Repository,
        session: SessionHandle,
    ) -> Self {
        Self {
            backend,
            repository,
            session,
            unauthorized: flume::unbounded(),
        }
    }

    /// Fires once for every request the server answered with 401
    pub fn unauthorized_signals(&self) -> Receiver<()> {
        self.unauthorized.1.clone()
    }

    pub fn unauthorized_sender(&self) -> Sender<()> {
        self.unauthorized.0.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }
}
