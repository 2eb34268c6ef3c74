//! Construction of the Twilio transport from resolved settings.

use crate::config::{ClientConfig, ResolvedSettings};
use sms_core::SmsError;
use sms_twilio::TwilioClient;
use std::time::Duration;
use tracing::debug;

/// A client authenticated as the resolved account, pointed at `client`'s endpoints.
pub fn twilio_client(
    settings: &ResolvedSettings,
    client: &ClientConfig,
) -> Result<TwilioClient, SmsError> {
    if client.timeout_seconds == 0 {
        return Err(SmsError::Invalid("client.timeout_seconds must be positive".into()));
    }
    debug!(
        environment = %settings.environment(),
        base_url = %client.base_url,
        timeout_seconds = client.timeout_seconds,
        "building twilio client"
    );
    TwilioClient::with_base_urls(
        settings.account_sid(),
        settings.auth_token(),
        client.base_url.clone(),
        client.lookup_base_url.clone(),
    )
    .with_timeout(Duration::from_secs(client.timeout_seconds))
}
