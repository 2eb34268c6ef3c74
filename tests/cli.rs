//! Integration tests for CLI

use assert_cmd::Command;
use axum::extract::{Form, Path};
use axum::routing::{get, post};
use axum::{Json, Router};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SID: &str = "SM0123456789abcdef0123456789abcdef";
const TOKEN: &str = "0123456789abcdef0123456789abcdef";

const BASE: &str = r#"
[project]
name = "cli-test"

[twilio.LIVE]
account_sid = "<your live account sid>"
auth_token = "<your live auth token>"

[twilio.TEST]
account_sid = "<your test account sid>"
auth_token = "<your test auth token>"

[twilio.digits]
from_number = "+15557654321"
to_number = "+15551234567"
"#;

const SECRET: &str = r#"
[twilio.LIVE]
account_sid = "ACaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
auth_token = "0123456789abcdef0123456789abcdef"

[twilio.TEST]
account_sid = "ACbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
auth_token = "fedcba9876543210fedcba9876543210"
"#;

struct Fixture {
    _dir: TempDir,
    base: PathBuf,
    secret: PathBuf,
}

fn fixture(client_section: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("twilio_sms.toml");
    let secret = dir.path().join("twilio_sms_secret.toml");
    fs::write(&base, format!("{}\n{}", BASE, client_section)).unwrap();
    fs::write(&secret, SECRET).unwrap();
    Fixture {
        _dir: dir,
        base,
        secret,
    }
}

fn twilio_sms(fx: &Fixture) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("twilio-sms"));
    for var in [
        "TWILIO_ACCOUNT_SID",
        "TWILIO_AUTH_TOKEN",
        "TWILIO_FROM_NUMBER",
        "TWILIO_TO_NUMBER",
        "TWILIO_SMS_ENV",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--config").arg(&fx.base);
    cmd.arg("--secret").arg(&fx.secret);
    cmd
}

fn message_json(body: &str) -> Value {
    json!({
        "sid": SID,
        "status": "delivered",
        "from": "+15557654321",
        "to": "+15551234567",
        "body": body,
        "date_created": "Thu, 30 Jul 2015 20:12:31 +0000",
        "date_sent": "Thu, 30 Jul 2015 20:12:32 +0000",
        "date_updated": "Thu, 30 Jul 2015 20:12:33 +0000",
        "direction": "outbound-api",
        "error_code": null,
        "error_message": null,
        "num_media": "0",
        "num_segments": "1",
        "price": "-0.00750",
        "price_unit": "USD"
    })
}

/// Serve a minimal Messages + Lookup API on a background thread.
fn spawn_twilio() -> String {
    let router = Router::new()
        .route(
            "/2010-04-01/Accounts/{account}/Messages.json",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                Json(json!({"sid": SID, "status": "queued", "body": form["Body"]}))
            }),
        )
        .route(
            "/2010-04-01/Accounts/{account}/Messages/{file}",
            get(|| async { Json(message_json("hello 👋")) }),
        )
        .route(
            "/v2/PhoneNumbers/{number}",
            get(|Path(number): Path<String>| async move {
                Json(json!({
                    "phone_number": number,
                    "valid": number != "+15550000000",
                    "validation_errors": [],
                }))
            }),
        );

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });
    let base = format!("http://{}", addr);
    format!(
        "[client]\nbase_url = \"{}\"\nlookup_base_url = \"{}\"\n",
        base, base
    )
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("twilio-sms"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Send and manage Twilio SMS messages"))
        .stdout(predicate::str::contains("send"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("messages"))
        .stdout(predicate::str::contains("lookup"));
}

#[test]
fn test_check_redacts_token() {
    let fx = fixture("");
    twilio_sms(&fx)
        .args(["-e", "test", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment: TEST"))
        .stdout(predicate::str::contains("ACbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"))
        .stdout(predicate::str::contains("****3210"))
        .stdout(predicate::str::contains("Secret overlay: loaded"))
        .stdout(predicate::str::contains("Strict credentials: no"))
        .stdout(predicate::str::contains("Declared environments: LIVE, TEST"))
        .stdout(predicate::str::contains(TOKEN).not());
}

#[test]
fn test_strict_check_accepts_twilio_shapes() {
    let fx = fixture("");
    twilio_sms(&fx)
        .args(["--strict", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strict credentials: yes"));
}

#[test]
fn test_dry_run_prints_request() {
    let fx = fixture("");
    twilio_sms(&fx)
        .args(["send", "--dry-run", "hello 🚀"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""body": "hello 🚀""#))
        .stdout(predicate::str::contains(r#""to_number": "+15551234567""#))
        .stdout(predicate::str::contains(r#""from_number": "+15557654321""#));
}

#[test]
fn test_nanp_rewrites_override() {
    let fx = fixture("");
    twilio_sms(&fx)
        .args(["send", "--dry-run", "--nanp", "--to", "(222) 333-4444", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+12223334444"));
}

#[test]
fn test_random_body_names_project_and_environment() {
    let fx = fixture("");
    twilio_sms(&fx)
        .args(["-e", "TEST", "send", "--dry-run", "--random"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cli-test (TEST) "));
}

#[test]
fn test_invalid_number_exits_with_validation_code() {
    let fx = fixture("");
    twilio_sms(&fx)
        .args(["send", "--dry-run", "--to", "5551234567", "hello"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("error[validation]"))
        .stderr(predicate::str::contains("5551234567"));
}

#[test]
fn test_empty_body_exits_with_validation_code() {
    let fx = fixture("");
    twilio_sms(&fx)
        .args(["send", "--dry-run"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("message body required"));
}

#[test]
fn test_unknown_environment_is_config_error() {
    let fx = fixture("");
    twilio_sms(&fx)
        .args(["-e", "STG", "check"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[config]"))
        .stderr(predicate::str::contains("STG"));
}

#[test]
fn test_missing_secret_leaves_placeholders() {
    let fx = fixture("");
    fs::remove_file(&fx.secret).unwrap();
    twilio_sms(&fx)
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("placeholder"));
}

#[test]
fn test_strict_mode_rejects_short_sid() {
    let fx = fixture("");
    twilio_sms(&fx)
        .env("TWILIO_ACCOUNT_SID", "AC123")
        .args(["--strict", "check"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("error[credential]"));
}

#[test]
fn test_send_reports_sid_and_status() {
    let fx = fixture(&spawn_twilio());
    twilio_sms(&fx)
        .args(["send", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{}\tqueued", SID)));
}

#[test]
fn test_verify_rejects_invalid_recipient() {
    let fx = fixture(&spawn_twilio());
    twilio_sms(&fx)
        .args(["send", "--verify", "--to", "+15550000000", "hello"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("did not pass carrier lookup"));
}

#[test]
fn test_show_writes_extract() {
    let fx = fixture(&spawn_twilio());
    let output = fx.base.with_file_name("extracts").join("message.json");
    twilio_sms(&fx)
        .args(["messages", "show", SID, "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 record(s) written"));

    let extract: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(extract["count"], 1);
    assert_eq!(extract["records"][0]["sid"], SID);
    assert_eq!(extract["records"][0]["emoji_count"], 1);
    assert_eq!(extract["records"][0]["date_sent"], "2015-07-30 20:12:32");
}

#[test]
fn test_invalid_sid_is_transport_error() {
    let fx = fixture(&spawn_twilio());
    twilio_sms(&fx)
        .args(["messages", "delete", "not-a-sid"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("error[transport]"));
}
