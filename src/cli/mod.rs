//! Command-line interface for twilio-sms
//!
//! Provides `send`, `check`, `messages` and `lookup` subcommands on top of the layered
//! configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use twilio_sms::config::{
    ConfigLayers, ConfigLoader, LoggingConfig, DEFAULT_BASE_PATH, DEFAULT_SECRET_PATH,
};
use sms_twilio::TwilioClient;
use twilio_sms::transport::twilio_client;
use twilio_sms::{logging, Environment, Error, ResolvedSettings};

mod check;
mod lookup;
mod messages;
mod send;

/// Send and manage Twilio SMS messages
#[derive(Parser)]
#[command(name = "twilio-sms")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base configuration file (non-secret template)
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_BASE_PATH)]
    config: PathBuf,

    /// Secret overlay merged over the base file; skipped when absent
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_SECRET_PATH)]
    secret: PathBuf,

    /// Account environment to use (LIVE or TEST)
    #[arg(
        short,
        long,
        global = true,
        value_name = "ENV",
        env = "TWILIO_SMS_ENV",
        default_value = "LIVE"
    )]
    environment: String,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Require exact Twilio account SID and auth token formats
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one SMS message
    Send(send::SendArgs),

    /// Load and validate configuration, then print it with secrets redacted
    Check,

    /// Fetch, list, redact or delete sent messages
    Messages(messages::MessagesArgs),

    /// Look up validity and carrier of a phone number
    Lookup(lookup::LookupArgs),
}

/// Everything a subcommand needs: the raw layers and the resolved environment.
pub(crate) struct Context {
    pub layers: ConfigLayers,
    pub settings: ResolvedSettings,
}

impl Context {
    pub fn client(&self) -> Result<TwilioClient, Error> {
        Ok(twilio_client(&self.settings, &self.layers.runtime().client)?)
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error[{}]: {}", err.kind(), err);
            ExitCode::from(err.exit_code())
        }
    }
}

async fn execute(cli: Cli) -> Result<(), Error> {
    let environment: Environment = cli.environment.parse()?;
    let layers = ConfigLoader::new(&cli.config)
        .with_secret(&cli.secret)
        .strict(cli.strict)
        .read();

    // Logging settings come from the files, so a read failure logs with defaults.
    let logging_config = match &layers {
        Ok(layers) => layers.runtime().logging.clone(),
        Err(_) => LoggingConfig::default(),
    };
    if let Err(err) = logging::init_logging(&logging_config, cli.verbose) {
        eprintln!("warning: logging disabled: {}", err);
    }

    let layers = layers?;
    if !layers.secret_loaded() {
        warn!(path = %cli.secret.display(), "running without secret overlay");
    }
    let settings = layers.resolve(environment)?;
    let ctx = Context { layers, settings };

    match cli.command {
        Commands::Send(args) => send::run(args, &ctx).await,
        Commands::Check => check::run(&ctx),
        Commands::Messages(args) => messages::run(args, &ctx).await,
        Commands::Lookup(args) => lookup::run(args, &ctx).await,
    }
}
