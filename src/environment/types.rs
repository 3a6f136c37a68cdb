use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

pub type PlantId = String;
pub type EntryId = String;
pub type UserId = String;

// Auth Types

#[derive(Default, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    /// Push registration token, if the device registered one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Minimal profile used when the full profile could not be fetched
    pub fn placeholder(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// The current authenticated identity. Token and user id are always set
/// together; use [`Session::authenticated`] to build one.
#[derive(Default, Clone, Debug, Eq, PartialEq)]
pub struct Session {
    token: Option<String>,
    user_id: Option<UserId>,
    pub user: Option<User>,
}

impl Session {
    pub fn authenticated(token: String, user_id: UserId) -> Self {
        Self {
            token: Some(token),
            user_id: Some(user_id),
            user: None,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[derive(Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: UserId,
}

/// Partial profile update. Unknown backend fields can be carried in `extra`.
#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// Plant Types

#[derive(Default, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareTips {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
}

#[derive(Default, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Toxicity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(
    Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Good,
    Fair,
    Poor,
    Critical,
}

#[derive(Default, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<EntryId>,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Observation date as entered by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The body sent when adding or editing a journal entry
#[derive(Default, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryInput {
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
}

impl JournalEntryInput {
    pub fn new(notes: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
            ..Default::default()
        }
    }
}

impl From<&JournalEntryInput> for JournalEntry {
    fn from(value: &JournalEntryInput) -> Self {
        JournalEntry {
            entry_id: None,
            notes: value.notes.clone(),
            photo_url: value.photo_url.clone(),
            date: value.date.clone(),
            location: value.location.clone(),
            subject: value.subject.clone(),
            name: value.name.clone(),
            health_status: value.health_status,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Default, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    /// Server assigned. `None` while the plant is still a draft.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PlantId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub care_tips: CareTips,
    #[serde(default)]
    pub toxicity: Toxicity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub journal_entries: Vec<JournalEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Plant {
    pub fn draft(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Seed a new draft from an identification result
    pub fn from_identification(name: impl Into<String>, identification: &PlantIdentification) -> Self {
        Self {
            name: name.into(),
            scientific_name: Some(identification.scientific_name.clone()),
            ..Default::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn journal_entry(&self, entry_id: &str) -> Option<&JournalEntry> {
        self.journal_entries
            .iter()
            .find(|e| e.entry_id.as_deref() == Some(entry_id))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlantIdentification {
    pub scientific_name: String,
    pub common_name: String,
    /// Between 0.0 and 1.0
    pub confidence_score: f64,
}

/// A binary export of the plant collection
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PdfDocument {
    pub data: Arc<Vec<u8>>,
    pub created: DateTime<Utc>,
}

impl PdfDocument {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(data),
            created: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Notification Types

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub sent_at: DateTime<Utc>,
}
