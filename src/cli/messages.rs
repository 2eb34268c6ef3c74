//! Messages command implementation

use clap::{Args, Subcommand};
use sms_twilio::{MessageExtract, MessageRecord, MAX_PAGE_SIZE};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use twilio_sms::Error;

use super::Context;

#[derive(Args)]
pub struct MessagesArgs {
    #[command(subcommand)]
    command: MessagesCommand,
}

#[derive(Subcommand)]
enum MessagesCommand {
    /// List the most recent messages
    List {
        /// Number of messages to fetch
        #[arg(
            long,
            default_value_t = 100,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGE_SIZE))
        )]
        limit: u32,

        /// Write a JSON extract here instead of printing it
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Fetch one message
    Show {
        /// Message SID (SM...)
        #[arg(value_name = "SID")]
        sid: String,

        /// Write a JSON extract here instead of printing it
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Clear the body of a message
    Redact {
        #[arg(value_name = "SID")]
        sid: String,
    },

    /// Delete a message
    Delete {
        #[arg(value_name = "SID")]
        sid: String,
    },
}

pub async fn run(args: MessagesArgs, ctx: &Context) -> Result<(), Error> {
    let client = ctx.client()?;
    match args.command {
        MessagesCommand::List { limit, output } => {
            let records = client.list_messages(limit).await?;
            emit(records, output.as_deref())
        }
        MessagesCommand::Show { sid, output } => {
            let record = client.fetch_message(&sid).await?;
            emit(vec![record], output.as_deref())
        }
        MessagesCommand::Redact { sid } => {
            if client.redact_message(&sid).await? {
                println!("{}\tredacted", sid);
            } else {
                warn!(%sid, "body still present after redaction");
                println!("{}\tnot redacted", sid);
            }
            Ok(())
        }
        MessagesCommand::Delete { sid } => {
            client.delete_message(&sid).await?;
            println!("{}\tdeleted", sid);
            Ok(())
        }
    }
}

fn emit(records: Vec<MessageRecord>, output: Option<&Path>) -> Result<(), Error> {
    let pending = in_flight(&records);
    if pending > 0 {
        info!(pending, "some messages have not reached a final status yet");
    }
    let extract = MessageExtract::new(records);
    match output {
        Some(path) => {
            extract.write_to(path)?;
            println!("{} record(s) written to {}", extract.count, path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&extract)?),
    }
    Ok(())
}

fn in_flight(records: &[MessageRecord]) -> usize {
    records.iter().filter(|r| !r.status.is_final()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sms_core::DeliveryStatus;

    fn record(status: DeliveryStatus) -> MessageRecord {
        MessageRecord {
            sid: "SM0123456789abcdef0123456789abcdef".into(),
            status,
            from_number: "+15557654321".into(),
            to_number: "+15551234567".into(),
            body: "hi".into(),
            date_created: None,
            date_sent: None,
            date_updated: None,
            direction: "outbound-api".into(),
            error_code: None,
            error_message: None,
            num_media: 0,
            num_segments: 1,
            price: None,
            price_unit: None,
            emoji_count: 0,
            is_redacted: false,
        }
    }

    #[test]
    fn counts_messages_still_in_flight() {
        let records = [
            record(DeliveryStatus::Queued),
            record(DeliveryStatus::Delivered),
            record(DeliveryStatus::Sending),
            record(DeliveryStatus::Failed),
        ];
        assert_eq!(in_flight(&records), 2);
    }
}
