//! Check command implementation

use twilio_sms::{Environment, Error};

use super::Context;

pub fn run(ctx: &Context) -> Result<(), Error> {
    let settings = &ctx.settings;
    let runtime = ctx.layers.runtime();

    println!("Environment: {}", settings.environment());
    println!("Project: {}", settings.project_name());
    println!("Account SID: {}", settings.account_sid());
    println!("Auth token: {}", settings.credentials().redacted_token());
    println!("From: {}", settings.from_number());
    println!("To: {}", settings.to_number());
    println!(
        "Secret overlay: {}",
        if ctx.layers.secret_loaded() {
            "loaded"
        } else {
            "not found"
        }
    );
    println!(
        "Strict credentials: {}",
        if ctx.layers.is_strict() { "yes" } else { "no" }
    );
    let declared: Vec<&str> = ctx
        .layers
        .environments()
        .into_iter()
        .map(Environment::as_str)
        .collect();
    println!("Declared environments: {}", declared.join(", "));
    println!("API: {}", runtime.client.base_url);
    Ok(())
}
