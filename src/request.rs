//! Outbound message assembly.

use crate::config::ResolvedSettings;
use crate::error::ValidationError;
use crate::phone::is_e164;
use serde::Serialize;
use sms_core::SendRequest;

/// Longest body the Messages API accepts, in characters.
pub const MAX_BODY_CHARS: usize = 1600;

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageOverrides {
    pub from: Option<String>,
    pub to: Option<String>,
    pub body: String,
}

/// A validated message, ready for a transport. Nothing is sent by building one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRequest {
    from_number: String,
    to_number: String,
    body: String,
}

impl MessageRequest {
    pub fn from_number(&self) -> &str {
        &self.from_number
    }

    pub fn to_number(&self) -> &str {
        &self.to_number
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn as_send_request(&self) -> SendRequest<'_> {
        SendRequest {
            to: &self.to_number,
            from: &self.from_number,
            text: &self.body,
        }
    }
}

/// Combines resolved settings with optional number overrides and a body.
#[derive(Debug, Clone)]
pub struct MessageRequestBuilder<'a> {
    settings: &'a ResolvedSettings,
    from: Option<String>,
    to: Option<String>,
    body: String,
}

impl<'a> MessageRequestBuilder<'a> {
    pub fn new(settings: &'a ResolvedSettings) -> Self {
        Self {
            settings,
            from: None,
            to: None,
            body: String::new(),
        }
    }

    pub fn from_number(mut self, number: Option<impl Into<String>>) -> Self {
        self.from = number.map(Into::into);
        self
    }

    pub fn to_number(mut self, number: Option<impl Into<String>>) -> Self {
        self.to = number.map(Into::into);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<MessageRequest, ValidationError> {
        let from_number = self
            .from
            .unwrap_or_else(|| self.settings.from_number().to_string());
        let to_number = self
            .to
            .unwrap_or_else(|| self.settings.to_number().to_string());
        check_number("from_number", &from_number)?;
        check_number("to_number", &to_number)?;

        if self.body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }
        let length = self.body.chars().count();
        if length > MAX_BODY_CHARS {
            return Err(ValidationError::BodyTooLong {
                length,
                max: MAX_BODY_CHARS,
            });
        }

        Ok(MessageRequest {
            from_number,
            to_number,
            body: self.body,
        })
    }
}

fn check_number(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if is_e164(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhoneNumber {
            field,
            value: value.to_string(),
        })
    }
}

/// Build a request from `settings`, letting `overrides` replace the configured numbers.
pub fn build(
    settings: &ResolvedSettings,
    overrides: &MessageOverrides,
) -> Result<MessageRequest, ValidationError> {
    MessageRequestBuilder::new(settings)
        .from_number(overrides.from.as_deref())
        .to_number(overrides.to.as_deref())
        .body(overrides.body.as_str())
        .build()
}
