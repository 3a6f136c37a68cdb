use thiserror::Error;

use crate::loc;

/// Everything that can go wrong between dispatching a request and
/// receiving its result. Cloneable so it can travel inside actions.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ApiError {
    /// A protected operation was dispatched without a session token
    #[error("Authentication required. Please log in.")]
    AuthenticationRequired,
    /// A local precondition failed before any request was made
    #[error("{0}")]
    Invalid(String),
    #[error("Unable to connect to server: {0}")]
    Connect(String),
    #[error("The request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Request failed with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("Could not decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ApiError::Invalid(reason.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The text a screen should show for this error
    pub fn user_message(&self) -> String {
        self.server_message()
            .map(|m| m.to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            ApiError::Timeout
        } else if value.is_connect() {
            ApiError::Connect(value.to_string())
        } else if value.is_decode() {
            ApiError::Decode(value.to_string())
        } else if let Some(status) = value.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: None,
            }
        } else {
            ApiError::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::Decode(value.to_string())
    }
}

/// Which auth flow failed. Changes the wording of a few messages.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AuthFlow {
    Login,
    Register,
}

/// Map a login or registration failure to the message shown to the user
pub fn auth_failure_message(flow: AuthFlow, error: &ApiError) -> String {
    let register = flow == AuthFlow::Register;
    let message = match error {
        ApiError::Connect(_) => {
            loc!("Unable to connect to server. Please check your internet connection.")
        }
        ApiError::Status { status: 409, .. } => {
            loc!("Email already exists. Please use a different email.")
        }
        ApiError::Status { status: 400, .. } if register => {
            loc!("Invalid registration data. Please check your input.")
        }
        ApiError::Status { status: 400, .. } => loc!("Invalid login data. Please check your input."),
        ApiError::Status { status: 404, .. } if register => {
            loc!("Registration endpoint not found. Please check server configuration.")
        }
        ApiError::Status { status: 404, .. } => {
            loc!("Login endpoint not found. Please check server configuration.")
        }
        ApiError::Status { status, .. } if *status >= 500 => {
            loc!("Server error. Please try again later.")
        }
        ApiError::Invalid(reason) => return reason.clone(),
        other => match other.server_message() {
            Some(message) => return message.to_string(),
            None if register => loc!("Registration failed"),
            None => loc!("Login failed"),
        },
    };
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, message: Option<&str>) -> ApiError {
        ApiError::Status {
            status,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn conflict_maps_to_existing_account() {
        assert_eq!(
            auth_failure_message(AuthFlow::Login, &status(409, Some("dup"))),
            "Email already exists. Please use a different email."
        );
        assert_eq!(
            auth_failure_message(AuthFlow::Register, &status(409, None)),
            "Email already exists. Please use a different email."
        );
    }

    #[test]
    fn classification_by_flow() {
        assert_eq!(
            auth_failure_message(AuthFlow::Register, &status(400, None)),
            "Invalid registration data. Please check your input."
        );
        assert_eq!(
            auth_failure_message(AuthFlow::Login, &status(404, None)),
            "Login endpoint not found. Please check server configuration."
        );
        assert_eq!(
            auth_failure_message(AuthFlow::Login, &status(503, Some("down"))),
            "Server error. Please try again later."
        );
        assert_eq!(
            auth_failure_message(AuthFlow::Login, &ApiError::Connect("refused".into())),
            "Unable to connect to server. Please check your internet connection."
        );
    }

    #[test]
    fn server_message_then_generic_fallback() {
        assert_eq!(
            auth_failure_message(AuthFlow::Login, &status(401, Some("Invalid credentials"))),
            "Invalid credentials"
        );
        assert_eq!(
            auth_failure_message(AuthFlow::Login, &status(401, None)),
            "Login failed"
        );
        assert_eq!(
            auth_failure_message(AuthFlow::Register, &ApiError::Timeout),
            "Registration failed"
        );
    }

    #[test]
    fn user_message_prefers_server_text() {
        assert_eq!(status(422, Some("Name taken")).user_message(), "Name taken");
        assert_eq!(
            ApiError::AuthenticationRequired.user_message(),
            "Authentication required. Please log in."
        );
    }
}
