//! Send command implementation

use clap::Args;
use sms_core::SmsClient;
use tracing::{debug, info};
use twilio_sms::emoji::demo_body;
use twilio_sms::phone::normalize_nanp;
use twilio_sms::request::{build, MessageOverrides};
use twilio_sms::{Error, ValidationError};

use super::Context;

#[derive(Args)]
pub struct SendArgs {
    /// Message text
    #[arg(value_name = "BODY", conflicts_with = "random")]
    pub body: Option<String>,

    /// Sender number, replacing the configured from_number
    #[arg(long, value_name = "NUMBER")]
    pub from: Option<String>,

    /// Recipient number, replacing the configured to_number
    #[arg(long, value_name = "NUMBER")]
    pub to: Option<String>,

    /// Send a generated demo body with random emoji
    #[arg(long)]
    pub random: bool,

    /// Rewrite North American --from/--to numbers to +1 form
    #[arg(long)]
    pub nanp: bool,

    /// Check the recipient with a carrier lookup before sending
    #[arg(long)]
    pub verify: bool,

    /// Print the request as JSON instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(args: SendArgs, ctx: &Context) -> Result<(), Error> {
    let body = if args.random {
        demo_body(&ctx.settings, &mut rand::rng())
    } else {
        args.body.unwrap_or_default()
    };
    let overrides = MessageOverrides {
        from: override_number(args.from, args.nanp),
        to: override_number(args.to, args.nanp),
        body,
    };
    let request = build(&ctx.settings, &overrides)?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    let client = ctx.client()?;
    if args.verify {
        let lookup = client.lookup_number(request.to_number()).await?;
        if !lookup.valid {
            return Err(ValidationError::UnverifiedNumber(request.to_number().to_string()).into());
        }
        debug!(carrier = ?lookup.carrier_name(), "recipient verified");
    }

    let response = client.send(request.as_send_request()).await?;
    info!(sid = %response.id, environment = %ctx.settings.environment(), "sent");
    println!("{}\t{}", response.id, response.status);
    Ok(())
}

/// Unrecognised numbers are passed through so the builder reports them.
fn override_number(number: Option<String>, nanp: bool) -> Option<String> {
    match number {
        Some(raw) if nanp => Some(normalize_nanp(&raw).unwrap_or(raw)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanp_only_when_requested() {
        assert_eq!(
            override_number(Some("(222) 333-4444".into()), true).as_deref(),
            Some("+12223334444")
        );
        assert_eq!(
            override_number(Some("(222) 333-4444".into()), false).as_deref(),
            Some("(222) 333-4444")
        );
        assert_eq!(
            override_number(Some("NOT_A_NUMBER".into()), true).as_deref(),
            Some("NOT_A_NUMBER")
        );
        assert_eq!(override_number(None, true), None);
    }
}
