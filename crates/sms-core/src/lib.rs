//! # SMS Core
//!
//! Core traits and types shared by the twilio-sms crates.
//!
//! This crate provides the provider-agnostic building blocks for SMS operations:
//! - [`SmsClient`] trait for sending SMS messages
//! - [`SendRequest`] / [`SendResponse`] describing one outbound message
//! - [`DeliveryStatus`] for the provider-reported message state
//! - [`SmsError`] for transport failures
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//!
//! // Any SMS provider implements SmsClient
//! let response = client.send(SendRequest {
//!     to: "+15551234567",
//!     from: "+15557654321",
//!     text: "Hello world!"
//! }).await?;
//! println!("{} is {}", response.id, response.status);
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Errors that can occur during SMS operations
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// HTTP communication error
    #[error("http error: {0}")]
    Http(String),
    /// Authentication/authorization error
    #[error("authentication error: {0}")]
    Auth(String),
    /// Invalid request parameters
    #[error("invalid request: {0}")]
    Invalid(String),
    /// SMS provider returned an error
    #[error("provider error: {0}")]
    Provider(String),
    /// Unexpected error occurred
    #[error("unexpected: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SendRequest<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub text: &'a str,
}

/// Message state as reported by the provider.
///
/// Unrecognised values are kept verbatim in [`DeliveryStatus::Other`] so a new
/// provider state never breaks response parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeliveryStatus {
    Accepted,
    Scheduled,
    Queued,
    Sending,
    Sent,
    Delivered,
    Undelivered,
    Failed,
    Received,
    Canceled,
    Other(String),
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Accepted => "accepted",
            Self::Scheduled => "scheduled",
            Self::Queued => "queued",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Undelivered => "undelivered",
            Self::Failed => "failed",
            Self::Received => "received",
            Self::Canceled => "canceled",
            Self::Other(raw) => raw,
        }
    }

    /// True once the provider will not change the status any more.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::Undelivered | Self::Failed | Self::Received | Self::Canceled
        )
    }
}

impl From<String> for DeliveryStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "accepted" => Self::Accepted,
            "scheduled" => Self::Scheduled,
            "queued" => Self::Queued,
            "sending" => Self::Sending,
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            "undelivered" => Self::Undelivered,
            "failed" => Self::Failed,
            "received" => Self::Received,
            "canceled" => Self::Canceled,
            _ => Self::Other(raw),
        }
    }
}

impl From<DeliveryStatus> for String {
    fn from(status: DeliveryStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub id: String,
    /// Name of the backend/provider that produced the response, e.g. "twilio".
    pub provider: &'static str,
    pub status: DeliveryStatus,
    /// Raw provider payload for debugging / audit.
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait SmsClient: Send + Sync {
    /// Send a single text SMS.
    async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError>;
}

/// Utility to create a pseudo id if a provider doesn't return one.
pub fn fallback_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_and_unknown_values() {
        assert_eq!(DeliveryStatus::from("Queued".to_string()), DeliveryStatus::Queued);
        assert_eq!(
            DeliveryStatus::from("partially_delivered".to_string()),
            DeliveryStatus::Other("partially_delivered".into())
        );
        assert_eq!(DeliveryStatus::Delivered.to_string(), "delivered");
    }

    #[test]
    fn status_round_trips_through_json() {
        let status: DeliveryStatus = serde_json::from_str("\"failed\"").unwrap();
        assert!(status.is_final());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"failed\"");
    }

    #[test]
    fn fallback_ids_are_unique() {
        assert_ne!(fallback_id(), fallback_id());
    }
}
