use std::time::Duration;

use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const BASE_URL_VAR: &str = "PLANTKEEPER_API_URL";
const TIMEOUT_VAR: &str = "PLANTKEEPER_API_TIMEOUT_MS";

/// Fixed at construction of the HTTP client; not overridable per call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("static url"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: normalize(Url::parse(base_url)?),
            timeout,
        })
    }

    /// Read the configuration from the environment, falling back to the
    /// defaults for anything missing or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(BASE_URL_VAR) {
            match Url::parse(&value) {
                Ok(url) => config.base_url = normalize(url),
                Err(e) => log::warn!("Ignoring {BASE_URL_VAR}={value}: {e:?}"),
            }
        }
        if let Ok(value) = std::env::var(TIMEOUT_VAR) {
            match value.parse::<u64>() {
                Ok(ms) => config.timeout = Duration::from_millis(ms),
                Err(e) => log::warn!("Ignoring {TIMEOUT_VAR}={value}: {e:?}"),
            }
        }
        config
    }
}

// `Url::join` drops the last segment unless the base ends in a slash
fn normalize(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
