//! # Twilio SMS Provider
//!
//! Twilio REST transport for the twilio-sms demo client.
//!
//! ## Features
//!
//! - Send SMS messages through the Messages API (v2010)
//! - Fetch, list, redact and delete message resources
//! - Carrier lookups through Lookup v2
//! - Twilio error documents surfaced as [`SmsError`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//! use sms_twilio::TwilioClient;
//!
//! let client = TwilioClient::new("AC...", "auth_token");
//! let response = client.send(SendRequest {
//!     to: "+15551234567",
//!     from: "+15557654321",
//!     text: "Hello from Twilio!"
//! }).await?;
//! ```

mod record;

pub use record::{emoji_count, is_message_sid, MessageExtract, MessageRecord, SID_LEN};

use async_trait::async_trait;
use record::{MessagePage, TwilioMessage};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use sms_core::{DeliveryStatus, SendRequest, SendResponse, SmsClient, SmsError};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

const PROVIDER: &str = "twilio";
const API_VERSION: &str = "2010-04-01";
/// Largest page the message list endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 1000;

pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";
pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://lookups.twilio.com";

/// Error document returned by the Twilio API on non-2xx responses.
#[derive(Debug, Clone, Deserialize, thiserror::Error)]
#[error("{message} (code {code}, status {status})")]
pub struct TwilioApiError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub more_info: Option<String>,
    #[serde(default)]
    pub status: u16,
}

/// Carrier information for a phone number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NumberLookup {
    pub phone_number: String,
    pub valid: bool,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub national_format: Option<String>,
    #[serde(default)]
    pub validation_errors: Vec<String>,
    #[serde(default)]
    pub line_type_intelligence: Option<LineTypeIntelligence>,
}

impl NumberLookup {
    pub fn carrier_name(&self) -> Option<&str> {
        self.line_type_intelligence
            .as_ref()
            .and_then(|lti| lti.carrier_name.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LineTypeIntelligence {
    #[serde(default)]
    pub carrier_name: Option<String>,
    #[serde(default, rename = "type")]
    pub line_type: Option<String>,
    #[serde(default)]
    pub mobile_country_code: Option<String>,
    #[serde(default)]
    pub mobile_network_code: Option<String>,
}

/// Twilio REST client.
#[derive(Clone)]
pub struct TwilioClient {
    /// Account SID, also the Basic auth user name.
    pub account_sid: String,
    auth_token: String,
    /// API base URL; override for testing/mocking.
    pub base_url: String,
    /// Lookup API base URL; override for testing/mocking.
    pub lookup_base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioClient")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("lookup_base_url", &self.lookup_base_url)
            .finish()
    }
}

impl TwilioClient {
    pub fn new<S: Into<String>>(account_sid: S, auth_token: S) -> Self {
        Self::with_base_urls(
            account_sid,
            auth_token,
            DEFAULT_BASE_URL.to_string(),
            DEFAULT_LOOKUP_BASE_URL.to_string(),
        )
    }

    pub fn with_base_urls<S: Into<String>>(
        account_sid: S,
        auth_token: S,
        base_url: String,
        lookup_base_url: String,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            base_url,
            lookup_base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Rebuild the HTTP client with a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, SmsError> {
        self.http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SmsError::Unexpected(format!("http client: {}", e)))?;
        Ok(self)
    }

    fn api_url(&self, tail: &[&str]) -> Result<Url, SmsError> {
        let mut segments = vec![API_VERSION, "Accounts", self.account_sid.as_str()];
        segments.extend_from_slice(tail);
        endpoint(&self.base_url, &segments)
    }

    fn message_url(&self, sid: &str) -> Result<Url, SmsError> {
        ensure_message_sid(sid)?;
        self.api_url(&["Messages", &format!("{}.json", sid)])
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.account_sid, Some(&self.auth_token))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, SmsError> {
        let res = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;
        check_status(res).await
    }

    async fn execute_json<T: for<'de> Deserialize<'de>>(
        &self,
        builder: RequestBuilder,
    ) -> Result<(T, serde_json::Value), SmsError> {
        let res = self.execute(builder).await?;
        let raw_text = res
            .text()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;
        let raw: serde_json::Value = serde_json::from_str(&raw_text)
            .map_err(|e| SmsError::Provider(format!("malformed response: {}", e)))?;
        let parsed = serde_json::from_value(raw.clone())
            .map_err(|e| SmsError::Provider(format!("unexpected response shape: {}", e)))?;
        Ok((parsed, raw))
    }

    /// Fetch one message resource by its `SM…` id.
    pub async fn fetch_message(&self, sid: &str) -> Result<MessageRecord, SmsError> {
        let url = self.message_url(sid)?;
        let (message, _): (TwilioMessage, _) = self.execute_json(self.http.get(url)).await?;
        let record = MessageRecord::try_from(message)?;
        debug!(sid, status = %record.status, "fetched message");
        Ok(record)
    }

    /// Most recent messages on the account, newest first.
    pub async fn list_messages(&self, limit: u32) -> Result<Vec<MessageRecord>, SmsError> {
        let page_size = limit.clamp(1, MAX_PAGE_SIZE);
        let url = self.api_url(&["Messages.json"])?;
        let request = self
            .http
            .get(url)
            .query(&[("PageSize", page_size.to_string())]);
        let (page, _): (MessagePage, _) = self.execute_json(request).await?;

        let mut records = Vec::with_capacity(page.messages.len());
        for message in page.messages {
            let sid = message.sid.clone();
            match MessageRecord::try_from(message) {
                Ok(record) => records.push(record),
                Err(e) => warn!(%sid, error = %e, "skipping unparseable message"),
            }
        }
        info!(count = records.len(), "extracted messages in account history");
        Ok(records)
    }

    /// Blank the message body. Returns true once the API reports an empty body.
    pub async fn redact_message(&self, sid: &str) -> Result<bool, SmsError> {
        let url = self.message_url(sid)?;
        let request = self.http.post(url).form(&[("Body", "")]);
        let (message, _): (TwilioMessage, _) = self.execute_json(request).await?;
        let redacted = message.body.is_empty();
        if redacted {
            info!(sid, "message body redacted");
        } else {
            error!(sid, "redaction did not clear the message body");
        }
        Ok(redacted)
    }

    /// Remove the whole message resource from the account.
    pub async fn delete_message(&self, sid: &str) -> Result<(), SmsError> {
        let url = self.message_url(sid)?;
        self.execute(self.http.delete(url)).await?;
        info!(sid, "message deleted");
        Ok(())
    }

    /// Query Lookup v2 for validity and carrier of `number`.
    pub async fn lookup_number(&self, number: &str) -> Result<NumberLookup, SmsError> {
        let url = endpoint(&self.lookup_base_url, &["v2", "PhoneNumbers", number])?;
        let request = self
            .http
            .get(url)
            .query(&[("Fields", "line_type_intelligence")]);
        let (lookup, _): (NumberLookup, _) = self.execute_json(request).await?;
        if lookup.valid {
            info!(number, carrier = ?lookup.carrier_name(), "number is valid");
        } else {
            warn!(number, errors = ?lookup.validation_errors, "number is not valid");
        }
        Ok(lookup)
    }
}

#[derive(Debug, Deserialize)]
struct CreatedMessage {
    sid: Option<String>,
    status: Option<String>,
}

#[async_trait]
impl SmsClient for TwilioClient {
    async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError> {
        let url = self.api_url(&["Messages.json"])?;
        let form = [("To", req.to), ("From", req.from), ("Body", req.text)];
        let (created, raw): (CreatedMessage, _) =
            self.execute_json(self.http.post(url).form(&form)).await?;

        let id = created.sid.unwrap_or_else(sms_core::fallback_id);
        let status = created
            .status
            .map(DeliveryStatus::from)
            .unwrap_or(DeliveryStatus::Queued);
        info!(sid = %id, %status, "message accepted");

        Ok(SendResponse {
            id,
            provider: PROVIDER,
            status,
            raw,
        })
    }
}

fn ensure_message_sid(sid: &str) -> Result<(), SmsError> {
    if is_message_sid(sid) {
        Ok(())
    } else {
        error!(sid, "invalid message sid format");
        Err(SmsError::Invalid(format!("invalid message sid: {:?}", sid)))
    }
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url, SmsError> {
    let mut url =
        Url::parse(base).map_err(|e| SmsError::Invalid(format!("base url {:?}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| SmsError::Invalid(format!("base url {:?} cannot carry a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn check_status(res: Response) -> Result<Response, SmsError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<TwilioApiError>(&body) {
        Ok(api_error) => api_error.to_string(),
        Err(_) => format!("HTTP {}: {}", status, body),
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SmsError::Auth(detail)),
        _ => Err(SmsError::Provider(detail)),
    }
}
