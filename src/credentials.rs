//! Credential selection for the active environment.

use crate::config::{TwilioTable, ACCOUNT_SID, AUTH_TOKEN};
use crate::environment::Environment;
use crate::error::CredentialError;
use serde::Serialize;
use sms_twilio::SID_LEN;
use std::fmt;
use tracing::debug;

const ACCOUNT_SID_PREFIX: &str = "AC";
const AUTH_TOKEN_LEN: usize = 32;

/// Account credentials for one environment.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBlock {
    account_sid: String,
    auth_token: String,
}

impl CredentialBlock {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }

    pub fn account_sid(&self) -> &str {
        &self.account_sid
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Token with everything but the last four characters masked.
    pub fn redacted_token(&self) -> String {
        let visible: String = self
            .auth_token
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{}", visible)
    }
}

impl fmt::Debug for CredentialBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBlock")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.redacted_token())
            .finish()
    }
}

/// Sending and receiving numbers in E.164 form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneNumberPair {
    from_number: String,
    to_number: String,
}

impl PhoneNumberPair {
    pub fn new(from_number: impl Into<String>, to_number: impl Into<String>) -> Self {
        Self {
            from_number: from_number.into(),
            to_number: to_number.into(),
        }
    }

    pub fn from_number(&self) -> &str {
        &self.from_number
    }

    pub fn to_number(&self) -> &str {
        &self.to_number
    }
}

/// Picks the `[twilio.<ENV>]` block and checks its shape. Never talks to the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialResolver {
    strict: bool,
}

impl CredentialResolver {
    /// Also require Twilio's exact formats: `AC` + 32 chars SID, 32 hex-digit token.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn resolve(
        &self,
        raw: &TwilioTable,
        environment: Environment,
    ) -> Result<CredentialBlock, CredentialError> {
        if !raw.has_section(environment.as_str()) {
            return Err(CredentialError::MissingBlock(environment));
        }
        let account_sid = raw
            .get(environment.as_str(), ACCOUNT_SID)
            .unwrap_or_default()
            .trim();
        let auth_token = raw
            .get(environment.as_str(), AUTH_TOKEN)
            .unwrap_or_default()
            .trim();

        if account_sid.is_empty() {
            return Err(CredentialError::EmptyAccountSid(environment));
        }
        if account_sid.chars().any(char::is_whitespace) {
            return Err(CredentialError::AccountSidWhitespace(environment));
        }
        if auth_token.is_empty() {
            return Err(CredentialError::EmptyAuthToken(environment));
        }

        if self.strict {
            if account_sid.len() != SID_LEN || !account_sid.starts_with(ACCOUNT_SID_PREFIX) {
                return Err(CredentialError::MalformedAccountSid(environment));
            }
            if auth_token.len() != AUTH_TOKEN_LEN
                || !auth_token.chars().all(|c| c.is_ascii_hexdigit())
            {
                return Err(CredentialError::MalformedAuthToken(environment));
            }
        }

        debug!(%environment, strict = self.strict, "credentials resolved");
        Ok(CredentialBlock::new(account_sid, auth_token))
    }
}

/// Resolve with the default (non-strict) shape checks.
pub fn resolve(
    raw: &TwilioTable,
    environment: Environment,
) -> Result<CredentialBlock, CredentialError> {
    CredentialResolver::default().resolve(raw, environment)
}
