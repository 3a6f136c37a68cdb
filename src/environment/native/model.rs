use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flume::Sender;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;
use urlencoding::encode;

use super::super::config::ApiConfig;
use super::super::error::ApiError;
use super::super::session::{decode_user_id, SessionHandle};
use super::super::types::*;
use super::super::Backend;

pub const USER_ID_HEADER: &str = "User-ID";

/// The single outbound request pipeline. Every request gets the current
/// bearer token and the `User-ID` header derived from it; a 401 response to
/// a request that carried a token raises the unauthorized signal.
#[derive(Clone)]
pub struct Model {
    pub url: Url,
    client: reqwest::Client,
    session: SessionHandle,
    /// When set, used instead of the session's token
    token: Option<String>,
    unauthorized: Option<Sender<()>>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("url", &self.url.as_str()).finish()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct IdentifyBody {
    image: String,
}

#[derive(Debug, Deserialize)]
struct NotificationHistory {
    #[serde(default)]
    notifications: Vec<NotificationRecord>,
}

impl Model {
    pub fn new(config: &ApiConfig, session: SessionHandle) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("plantkeeper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: config.base_url.clone(),
            client,
            session,
            token: None,
            unauthorized: None,
        })
    }

    /// Send `()` on `sender` whenever the server rejects our credentials
    pub fn with_unauthorized_signal(mut self, sender: Sender<()>) -> Self {
        self.unauthorized = Some(sender);
        self
    }

    pub fn has_token(&self) -> bool {
        self.current_token().is_some()
    }

    /// A 401 to an anonymous request (a bad password) is an ordinary failure
    fn rejects_session(&self, error: &ApiError) -> bool {
        error.is_unauthorized() && self.has_token()
    }

    fn current_token(&self) -> Option<String> {
        self.token.clone().or_else(|| self.session.token())
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .url
            .join(path)
            .map_err(|e| ApiError::invalid(format!("Invalid path {path}: {e}")))?;
        log::trace!("{method} {url}");
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.current_token() {
            match decode_user_id(&token) {
                Ok(user_id) => builder = builder.header(USER_ID_HEADER, user_id),
                Err(e) => log::debug!("Sending without {USER_ID_HEADER}: {e}"),
            }
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        let error = ApiError::Status {
            status: status.as_u16(),
            message,
        };
        if self.rejects_session(&error) {
            self.signal_unauthorized();
        }
        Err(error)
    }

    fn signal_unauthorized(&self) {
        log::warn!("Server rejected the session token");
        if let Some(ref sender) = self.unauthorized {
            let _ = sender.send(());
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: Result<RequestBuilder, ApiError>,
        call: &'static str,
    ) -> Result<T, ApiError> {
        let response = self.send(builder.logged(call)?).await.logged(call)?;
        response.json::<T>().await.map_err(ApiError::from).logged(call)
    }

    async fn execute(
        &self,
        builder: Result<RequestBuilder, ApiError>,
        call: &'static str,
    ) -> Result<(), ApiError> {
        self.send(builder.logged(call)?)
            .await
            .logged(call)
            .map(|_| ())
    }
}

#[async_trait]
impl Backend for Model {
    fn with_token(&self, token: &str) -> Arc<dyn Backend> {
        let mut model = self.clone();
        model.token = Some(token.to_string());
        Arc::new(model)
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        log::trace!("Login");
        let request = self.request(Method::POST, "auth/login");
        self.fetch(request.map(|r| r.json(credentials)), "login")
            .await
    }

    async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        log::trace!("Register");
        let request = self.request(Method::POST, "auth/register");
        self.fetch(request.map(|r| r.json(credentials)), "register")
            .await
    }

    async fn user_details(&self) -> Result<User, ApiError> {
        let request = self.request(Method::GET, "auth/getUserDetails");
        self.fetch(request, "user_details").await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let request = self.request(Method::PUT, "auth/profile");
        self.fetch(request.map(|r| r.json(update)), "update_profile")
            .await
    }

    async fn plants(&self) -> Result<Vec<Plant>, ApiError> {
        log::trace!("Plants");
        let request = self.request(Method::GET, "plants/getPlants");
        self.fetch(request, "plants").await
    }

    async fn add_plant(&self, plant: &Plant) -> Result<Plant, ApiError> {
        let request = self.request(Method::POST, "plants/addPlant");
        self.fetch(request.map(|r| r.json(plant)), "add_plant")
            .await
    }

    async fn update_plant(&self, id: &str, plant: &Plant) -> Result<Plant, ApiError> {
        let request = self.request(Method::PUT, &format!("plants/{}", encode(id)));
        self.fetch(request.map(|r| r.json(plant)), "update_plant")
            .await
    }

    async fn delete_plant(&self, id: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("plants/{}", encode(id)));
        self.execute(request, "delete_plant").await
    }

    async fn plant(&self, id: &str) -> Result<Plant, ApiError> {
        let request = self.request(Method::GET, &format!("plants/{}", encode(id)));
        self.fetch(request, "plant").await
    }

    async fn identify_plant(&self, image: &[u8]) -> Result<PlantIdentification, ApiError> {
        let body = IdentifyBody {
            image: STANDARD.encode(image),
        };
        let request = self.request(Method::POST, "plants/identify");
        self.fetch(request.map(|r| r.json(&body)), "identify_plant")
            .await
    }

    async fn care_tips(&self, scientific_name: &str) -> Result<CareTips, ApiError> {
        let request = self
            .request(Method::GET, "plants/care-tips")
            .map(|r| r.query(&[("scientificName", scientific_name)]));
        self.fetch(request, "care_tips").await
    }

    async fn toxicity_info(&self, scientific_name: &str) -> Result<Toxicity, ApiError> {
        let request = self
            .request(Method::GET, "plants/toxicity-info")
            .map(|r| r.query(&[("scientificName", scientific_name)]));
        self.fetch(request, "toxicity_info").await
    }

    async fn add_journal_entry(
        &self,
        plant_id: &str,
        entry: &JournalEntryInput,
    ) -> Result<Plant, ApiError> {
        let path = format!("plants/{}/journal", encode(plant_id));
        let request = self.request(Method::POST, &path);
        self.fetch(request.map(|r| r.json(entry)), "add_journal_entry")
            .await
    }

    async fn update_journal_entry(
        &self,
        plant_id: &str,
        entry_id: &str,
        entry: &JournalEntryInput,
    ) -> Result<Plant, ApiError> {
        let path = format!("plants/{}/journal/{}", encode(plant_id), encode(entry_id));
        let request = self.request(Method::PUT, &path);
        self.fetch(request.map(|r| r.json(entry)), "update_journal_entry")
            .await
    }

    async fn delete_journal_entry(&self, plant_id: &str, entry_id: &str) -> Result<Plant, ApiError> {
        let path = format!("plants/{}/journal/{}", encode(plant_id), encode(entry_id));
        let request = self.request(Method::DELETE, &path);
        self.fetch(request, "delete_journal_entry").await
    }

    async fn export_pdf(&self) -> Result<Vec<u8>, ApiError> {
        log::trace!("Export PDF");
        let request = self
            .request(Method::GET, "plants/exportPDF")
            .map(|r| r.header(ACCEPT, HeaderValue::from_static("application/pdf")));
        let response = self.send(request.logged("export_pdf")?).await.logged("export_pdf")?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(ApiError::from)
            .logged("export_pdf")
    }

    async fn notification_history(&self) -> Result<Vec<NotificationRecord>, ApiError> {
        let request = self.request(Method::GET, "notifications/notificationHistory");
        self.fetch::<NotificationHistory>(request, "notification_history")
            .await
            .map(|history| history.notifications)
    }

    async fn send_test_notification(&self) -> Result<(), ApiError> {
        let request = self.request(Method::POST, "notifications/send-test");
        self.execute(
            request.map(|r| r.json(&serde_json::json!({}))),
            "send_test_notification",
        )
        .await
    }
}

trait ResultExt {
    fn logged(self, call: &'static str) -> Self;
}

impl<T> ResultExt for Result<T, ApiError> {
    fn logged(self, call: &'static str) -> Self {
        if let Err(ref e) = self {
            log::error!("API Error: {call} {e:?}");
        }
        self
    }
}
