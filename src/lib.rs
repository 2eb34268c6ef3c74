//! # twilio-sms
//!
//! Configuration-driven Twilio SMS client.
//!
//! ## Features
//!
//! - **Layered configuration**: base TOML template, optional secret overlay merged key by
//!   key, then `TWILIO_*` environment variables
//! - **Credential resolution**: per-environment (`LIVE` / `TEST`) account blocks with
//!   structural checks before any network call
//! - **Message building**: E.164 checks and body limits applied up front
//! - **Twilio transport**: send, fetch, list, redact, delete and carrier lookup through
//!   [`sms_twilio::TwilioClient`]
//! - **Observability**: structured logging with `tracing`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use twilio_sms::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), twilio_sms::Error> {
//!     let layers = ConfigLoader::new("config/twilio_sms.toml")
//!         .with_secret("config/twilio_sms_secret.toml")
//!         .read()?;
//!     let settings = layers.resolve(Environment::Test)?;
//!
//!     let request = MessageRequestBuilder::new(&settings)
//!         .body("Hello from twilio-sms!")
//!         .build()?;
//!
//!     let client = twilio_client(&settings, &layers.runtime().client)?;
//!     let response = client.send(request.as_send_request()).await?;
//!     println!("Message sent with ID: {}", response.id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credentials;
pub mod emoji;
pub mod environment;
pub mod error;
pub mod logging;
pub mod phone;
pub mod request;
pub mod transport;

pub use config::{ConfigLayers, ConfigLoader, ResolvedSettings, RuntimeSettings, TwilioTable};
pub use credentials::{CredentialBlock, CredentialResolver, PhoneNumberPair};
pub use environment::Environment;
pub use error::{ConfigError, CredentialError, Error, ValidationError};
pub use request::{MessageOverrides, MessageRequest, MessageRequestBuilder};

/// Common imports for twilio-sms usage
pub mod prelude {
    pub use crate::config::{
        ClientConfig, ConfigLayers, ConfigLoader, LogFormat, LoggingConfig, ResolvedSettings,
        RuntimeSettings,
    };
    pub use crate::credentials::{CredentialBlock, CredentialResolver, PhoneNumberPair};
    pub use crate::environment::Environment;
    pub use crate::error::{ConfigError, CredentialError, Error, ValidationError};
    pub use crate::request::{MessageOverrides, MessageRequest, MessageRequestBuilder};
    pub use crate::transport::twilio_client;
    pub use sms_core::*;
    pub use sms_twilio::{MessageExtract, MessageRecord, NumberLookup, TwilioClient};
}
