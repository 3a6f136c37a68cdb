//! An in-memory stand-in for the REST backend. Behaves like a tiny server:
//! assigns ids, keeps plants and journal entries, and counts every call so
//! tests can assert that guarded operations never reach the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use flume::Sender;

use super::error::ApiError;
use super::types::*;
use super::Backend;

#[derive(Default)]
struct Inner {
    calls: AtomicUsize,
    next_id: AtomicUsize,
    plants: Mutex<Vec<Plant>>,
    notifications: Mutex<Vec<NotificationRecord>>,
    user: Mutex<Option<User>>,
    failures: Mutex<HashMap<&'static str, ApiError>>,
    delays: Mutex<HashMap<String, Duration>>,
    tokens: Mutex<Vec<String>>,
    log: Mutex<Vec<&'static str>>,
    unauthorized: Mutex<Option<Sender<()>>>,
}

#[derive(Clone, Default)]
pub struct MockBackend(Arc<Inner>);

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Arc<dyn Backend> {
        Arc::new(self.clone())
    }

    /// Total number of calls that reached the backend
    pub fn calls(&self) -> usize {
        self.0.calls.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, call: &str) -> usize {
        self.0.log.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    /// Make every future call named `call` fail with `error`
    pub fn fail(&self, call: &'static str, error: ApiError) {
        self.0.failures.lock().unwrap().insert(call, error);
    }

    /// Send `()` on `sender` whenever a forced failure is a 401, whether or
    /// not the call carried a token
    pub fn signal_unauthorized_to(&self, sender: Sender<()>) {
        *self.0.unauthorized.lock().unwrap() = Some(sender);
    }

    /// Delay `plant(id)` so a later request can overtake it
    pub fn delay_plant(&self, id: &str, duration: Duration) {
        self.0.delays.lock().unwrap().insert(id.to_string(), duration);
    }

    pub fn seed_plants(&self, plants: Vec<Plant>) {
        *self.0.plants.lock().unwrap() = plants;
    }

    pub fn set_user(&self, user: User) {
        *self.0.user.lock().unwrap() = Some(user);
    }

    /// Tokens handed to `with_token`, in order
    pub fn tokens(&self) -> Vec<String> {
        self.0.tokens.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.0.notifications.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> Result<(), ApiError> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        self.0.log.lock().unwrap().push(call);
        let Some(error) = self.0.failures.lock().unwrap().get(call).cloned() else {
            return Ok(());
        };
        if error.is_unauthorized() {
            if let Some(sender) = self.0.unauthorized.lock().unwrap().as_ref() {
                let _ = sender.send(());
            }
        }
        Err(error)
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.0.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}{n}")
    }

    fn not_found() -> ApiError {
        ApiError::Status {
            status: 404,
            message: Some("Plant not found".to_string()),
        }
    }

    fn with_plant(
        &self,
        plant_id: &str,
        mutate: impl FnOnce(&mut Plant) -> Result<(), ApiError>,
    ) -> Result<Plant, ApiError> {
        let mut plants = self.0.plants.lock().unwrap();
        let plant = plants
            .iter_mut()
            .find(|p| p.id() == Some(plant_id))
            .ok_or_else(Self::not_found)?;
        mutate(plant)?;
        plant.updated_at = Some(Utc::now());
        Ok(plant.clone())
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn with_token(&self, token: &str) -> Arc<dyn Backend> {
        self.0.tokens.lock().unwrap().push(token.to_string());
        self.shared()
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.record("login")?;
        Ok(AuthResponse {
            token: format!("token-for-{}", credentials.email),
            user_id: "u1".to_string(),
        })
    }

    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.record("register")?;
        let user_id = self.next_id("u");
        self.set_user(User {
            id: user_id.clone(),
            email: credentials.email.clone(),
            ..Default::default()
        });
        Ok(AuthResponse {
            token: format!("token-for-{}", credentials.email),
            user_id,
        })
    }

    async fn user_details(&self) -> Result<User, ApiError> {
        self.record("user_details")?;
        self.0
            .user
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: Some("User not found".to_string()),
            })
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.record("update_profile")?;
        let mut user = self.0.user.lock().unwrap();
        let user = user.get_or_insert_with(|| User::placeholder("u1"));
        if let Some(ref email) = update.email {
            user.email = email.clone();
        }
        if let Some(ref token) = update.fcm_token {
            user.fcm_token = Some(token.clone());
        }
        user.updated_at = Some(Utc::now());
        Ok(user.clone())
    }

    async fn plants(&self) -> Result<Vec<Plant>, ApiError> {
        self.record("plants")?;
        Ok(self.0.plants.lock().unwrap().clone())
    }

    async fn add_plant(&self, plant: &Plant) -> Result<Plant, ApiError> {
        self.record("add_plant")?;
        let mut stored = plant.clone();
        stored.id = Some(self.next_id("p"));
        stored.created_at = Some(Utc::now());
        self.0.plants.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn update_plant(&self, id: &str, plant: &Plant) -> Result<Plant, ApiError> {
        self.record("update_plant")?;
        self.with_plant(id, |stored| {
            let created_at = stored.created_at;
            *stored = plant.clone();
            stored.id = Some(id.to_string());
            stored.created_at = created_at;
            Ok(())
        })
    }

    async fn delete_plant(&self, id: &str) -> Result<(), ApiError> {
        self.record("delete_plant")?;
        let mut plants = self.0.plants.lock().unwrap();
        let before = plants.len();
        plants.retain(|p| p.id() != Some(id));
        if plants.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }

    async fn plant(&self, id: &str) -> Result<Plant, ApiError> {
        self.record("plant")?;
        let delay = self.0.delays.lock().unwrap().get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.0
            .plants
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id() == Some(id))
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn identify_plant(&self, image: &[u8]) -> Result<PlantIdentification, ApiError> {
        self.record("identify_plant")?;
        Ok(PlantIdentification {
            scientific_name: "Aloe vera".to_string(),
            common_name: "Aloe".to_string(),
            confidence_score: if image.len() > 4 { 0.93 } else { 0.41 },
        })
    }

    async fn care_tips(&self, scientific_name: &str) -> Result<CareTips, ApiError> {
        self.record("care_tips")?;
        Ok(CareTips {
            light: Some(format!("bright indirect for {scientific_name}")),
            water: Some("every two weeks".to_string()),
            ..Default::default()
        })
    }

    async fn toxicity_info(&self, _scientific_name: &str) -> Result<Toxicity, ApiError> {
        self.record("toxicity_info")?;
        Ok(Toxicity {
            severity: Some("mild".to_string()),
            symptoms: Some("vomiting".to_string()),
            notes: None,
        })
    }

    async fn add_journal_entry(
        &self,
        plant_id: &str,
        entry: &JournalEntryInput,
    ) -> Result<Plant, ApiError> {
        self.record("add_journal_entry")?;
        let entry_id = self.next_id("e");
        self.with_plant(plant_id, |plant| {
            let mut stored = JournalEntry::from(entry);
            stored.entry_id = Some(entry_id);
            stored.created_at = Some(Utc::now());
            plant.journal_entries.push(stored);
            Ok(())
        })
    }

    async fn update_journal_entry(
        &self,
        plant_id: &str,
        entry_id: &str,
        entry: &JournalEntryInput,
    ) -> Result<Plant, ApiError> {
        self.record("update_journal_entry")?;
        self.with_plant(plant_id, |plant| {
            let stored = plant
                .journal_entries
                .iter_mut()
                .find(|e| e.entry_id.as_deref() == Some(entry_id))
                .ok_or_else(Self::not_found)?;
            let created_at = stored.created_at;
            *stored = JournalEntry::from(entry);
            stored.entry_id = Some(entry_id.to_string());
            stored.created_at = created_at;
            stored.updated_at = Some(Utc::now());
            Ok(())
        })
    }

    async fn delete_journal_entry(&self, plant_id: &str, entry_id: &str) -> Result<Plant, ApiError> {
        self.record("delete_journal_entry")?;
        self.with_plant(plant_id, |plant| {
            plant
                .journal_entries
                .retain(|e| e.entry_id.as_deref() != Some(entry_id));
            Ok(())
        })
    }

    async fn export_pdf(&self) -> Result<Vec<u8>, ApiError> {
        self.record("export_pdf")?;
        Ok(b"%PDF-1.4 mock".to_vec())
    }

    async fn notification_history(&self) -> Result<Vec<NotificationRecord>, ApiError> {
        self.record("notification_history")?;
        let mut history = self.notifications();
        history.reverse();
        Ok(history)
    }

    async fn send_test_notification(&self) -> Result<(), ApiError> {
        self.record("send_test_notification")?;
        let id = self.next_id("n");
        self.0.notifications.lock().unwrap().push(NotificationRecord {
            id,
            title: "Test".to_string(),
            body: "This is a test notification".to_string(),
            sent_at: Utc::now(),
        });
        Ok(())
    }
}
