//! twilio-sms: send and manage Twilio SMS messages from layered configuration
//!
//! Reads a base TOML template, an optional secret overlay and `TWILIO_*` environment
//! variables, then talks to the Twilio REST API for the selected environment.

use std::process::ExitCode;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::run().await
}
