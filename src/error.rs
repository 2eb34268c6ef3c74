//! Error taxonomy for configuration, credentials and message validation.

use crate::environment::Environment;
use sms_core::SmsError;
use std::path::PathBuf;
use thiserror::Error;

/// Missing, unreadable or incomplete configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },
    #[error("unknown environment {0:?} (expected LIVE or TEST)")]
    UnknownEnvironment(String),
    #[error("no [twilio.{0}] section in any configuration file")]
    MissingEnvironment(Environment),
    #[error("{field} for {environment} is {problem}")]
    UnfilledField {
        environment: Environment,
        field: &'static str,
        problem: &'static str,
    },
    #[error("invalid value at {key}: {message}")]
    Invalid { key: String, message: String },
    #[error("failed to decode settings: {0}")]
    Decode(#[from] config::ConfigError),
}

/// Credential block present but structurally unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("no credentials for environment {0}")]
    MissingBlock(Environment),
    #[error("account_sid for {0} is empty")]
    EmptyAccountSid(Environment),
    #[error("account_sid for {0} contains whitespace")]
    AccountSidWhitespace(Environment),
    #[error("account_sid for {0} must be 34 characters starting with 'AC'")]
    MalformedAccountSid(Environment),
    #[error("auth_token for {0} is empty")]
    EmptyAuthToken(Environment),
    #[error("auth_token for {0} must be 32 hexadecimal characters")]
    MalformedAuthToken(Environment),
}

impl CredentialError {
    /// Name of the offending configuration field, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingBlock(_) => None,
            Self::EmptyAccountSid(_) | Self::AccountSidWhitespace(_) | Self::MalformedAccountSid(_) => {
                Some("account_sid")
            }
            Self::EmptyAuthToken(_) | Self::MalformedAuthToken(_) => Some("auth_token"),
        }
    }
}

/// Outbound message that cannot be sent as built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} {value:?} is not an E.164 number ('+' followed by 7-15 digits)")]
    InvalidPhoneNumber { field: &'static str, value: String },
    #[error("message body required")]
    EmptyBody,
    #[error("message body is {length} characters, the limit is {max}")]
    BodyTooLong { length: usize, max: usize },
    #[error("{0} did not pass carrier lookup")]
    UnverifiedNumber(String),
}

/// Top-level error reported by the CLI.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Sms(#[from] SmsError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short label printed in front of the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Credential(_) => "credential",
            Self::Validation(_) => "validation",
            Self::Sms(_) => "transport",
            Self::Io(_) | Self::Json(_) => "io",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Credential(_) => 3,
            Self::Validation(_) => 4,
            Self::Sms(_) => 5,
            Self::Io(_) | Self::Json(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_exit_codes_are_distinct() {
        let errors: Vec<Error> = vec![
            ConfigError::UnknownEnvironment("STG".into()).into(),
            CredentialError::EmptyAuthToken(Environment::Test).into(),
            ValidationError::EmptyBody.into(),
            SmsError::Http("timeout".into()).into(),
        ];
        let kinds: Vec<_> = errors.iter().map(Error::kind).collect();
        assert_eq!(kinds, ["config", "credential", "validation", "transport"]);
        let codes: Vec<_> = errors.iter().map(Error::exit_code).collect();
        assert_eq!(codes, [2, 3, 4, 5]);
    }

    #[test]
    fn messages_name_the_field() {
        let err = ConfigError::UnfilledField {
            environment: Environment::Live,
            field: "auth_token",
            problem: "a placeholder",
        };
        assert_eq!(err.to_string(), "auth_token for LIVE is a placeholder");
        assert_eq!(
            CredentialError::AccountSidWhitespace(Environment::Test).field(),
            Some("account_sid")
        );
    }
}
