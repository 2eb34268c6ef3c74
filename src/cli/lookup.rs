//! Lookup command implementation

use clap::Args;
use twilio_sms::Error;

use super::Context;

#[derive(Args)]
pub struct LookupArgs {
    /// Phone number in E.164 form
    #[arg(value_name = "NUMBER")]
    pub number: String,
}

pub async fn run(args: LookupArgs, ctx: &Context) -> Result<(), Error> {
    let lookup = ctx.client()?.lookup_number(&args.number).await?;
    println!("{}", serde_json::to_string_pretty(&lookup)?);
    Ok(())
}
