//! Layered configuration loading.
//!
//! Three layers are merged, lowest precedence first:
//!
//! 1. the base file (non-secret template, must exist)
//! 2. the secret overlay (same schema, may be absent)
//! 3. process environment variables
//!
//! Credentials and phone numbers live under the `twilio` namespace:
//!
//! ```toml
//! [twilio.LIVE]
//! account_sid = "AC..."
//! auth_token = "..."
//!
//! [twilio.TEST]
//! account_sid = "AC..."
//! auth_token = "..."
//!
//! [twilio.digits]
//! from_number = "+15557654321"
//! to_number = "+15551234567"
//! ```
//!
//! That namespace is merged key by key as a two-level `(section, field)` mapping; an empty
//! overlay value never replaces a base value. The ambient `project`, `logging` and `client`
//! sections go through the regular `config` builder and may also be set with
//! `TWILIO_SMS__<SECTION>__<FIELD>` variables.

use crate::credentials::{CredentialResolver, PhoneNumberPair};
use crate::environment::Environment;
use crate::error::{ConfigError, Error};
use config::{Config, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use sms_twilio::{DEFAULT_BASE_URL, DEFAULT_LOOKUP_BASE_URL};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_PATH: &str = "config/twilio_sms.toml";
pub const DEFAULT_SECRET_PATH: &str = "config/twilio_sms_secret.toml";

pub const ACCOUNT_SID: &str = "account_sid";
pub const AUTH_TOKEN: &str = "auth_token";
pub const FROM_NUMBER: &str = "from_number";
pub const TO_NUMBER: &str = "to_number";

const TWILIO_NAMESPACE: &str = "twilio";
/// Section holding the phone numbers shared by every environment.
pub const NUMBERS_SECTION: &str = "DIGITS";

/// Prefix of `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_FROM_NUMBER`, `TWILIO_TO_NUMBER`.
const CREDENTIAL_ENV_PREFIX: &str = "TWILIO";
/// Prefix of `TWILIO_SMS__LOGGING__LEVEL` and friends.
const SETTINGS_ENV_PREFIX: &str = "TWILIO_SMS";

/// Ambient settings: everything outside the `twilio` namespace.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub project: ProjectConfig,
    pub logging: LoggingConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Shown in demo message bodies (default: twilio-sms)
    pub name: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (default: info)
    pub level: String,
    /// Log format (default: pretty)
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Twilio transport configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Messages API base URL
    pub base_url: String,
    /// Lookup API base URL
    pub lookup_base_url: String,
    /// Request timeout in seconds (default: 10)
    pub timeout_seconds: u64,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lookup_base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Two-level `(section, field) -> value` mapping of the `twilio` namespace.
///
/// Section names are stored upper-case (`LIVE`, `TEST`, `DIGITS`), field names lower-case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwilioTable {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl TwilioTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mainly for assembling tables by hand.
    pub fn with(mut self, section: &str, field: &str, value: &str) -> Self {
        self.insert(section, field, value);
        self
    }

    pub fn insert(&mut self, section: &str, field: &str, value: &str) {
        self.sections
            .entry(section_key(section))
            .or_default()
            .insert(field_key(field), value.to_string());
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&section_key(section))
    }

    pub fn get(&self, section: &str, field: &str) -> Option<&str> {
        self.sections
            .get(&section_key(section))
            .and_then(|fields| fields.get(&field_key(field)))
            .map(String::as_str)
    }

    /// Apply `overlay` on top of `self`, key by key. Empty overlay values are skipped.
    pub fn overlay(&mut self, overlay: &TwilioTable) {
        for (section, fields) in &overlay.sections {
            let target = self.sections.entry(section.clone()).or_default();
            for (field, value) in fields {
                if value.trim().is_empty() {
                    debug!(%section, %field, "empty overlay value ignored");
                    continue;
                }
                target.insert(field.clone(), value.clone());
            }
        }
    }

    fn from_config(config: &Config, origin: &Path) -> Result<Self, ConfigError> {
        let namespace = match config.get_table(TWILIO_NAMESPACE) {
            Ok(table) => table,
            Err(config::ConfigError::NotFound(_)) => {
                debug!(path = %origin.display(), "no twilio namespace");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: origin.to_path_buf(),
                    source,
                })
            }
        };

        let mut table = Self::default();
        for (section, value) in namespace {
            let fields = value.into_table().map_err(|e| ConfigError::Invalid {
                key: format!("{}.{}", TWILIO_NAMESPACE, section),
                message: e.to_string(),
            })?;
            // an empty section still declares the environment
            table.sections.entry(section_key(&section)).or_default();
            for (field, value) in fields {
                let value = value.into_string().map_err(|e| ConfigError::Invalid {
                    key: format!("{}.{}.{}", TWILIO_NAMESPACE, section, field),
                    message: e.to_string(),
                })?;
                table.insert(&section, &field, &value);
            }
        }
        Ok(table)
    }
}

fn section_key(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

fn field_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Credential and number overrides taken from `TWILIO_*` variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct EnvOverrides {
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
    to_number: Option<String>,
}

impl EnvOverrides {
    fn into_table(self, environment: Environment) -> TwilioTable {
        let mut table = TwilioTable::new();
        let pairs = [
            (ACCOUNT_SID, self.account_sid),
            (AUTH_TOKEN, self.auth_token),
            (FROM_NUMBER, self.from_number),
            (TO_NUMBER, self.to_number),
        ];
        for (field, value) in pairs {
            if let Some(value) = value {
                table.insert(environment.as_str(), field, &value);
            }
        }
        table
    }
}

/// Raw data read from every layer, owned by the loader.
#[derive(Debug, Clone)]
pub struct ConfigLayers {
    merged: TwilioTable,
    env_overrides: EnvOverrides,
    runtime: RuntimeSettings,
    secret_loaded: bool,
    resolver: CredentialResolver,
}

impl ConfigLayers {
    /// Base + secret `twilio` namespace, before environment variables.
    pub fn merged(&self) -> &TwilioTable {
        &self.merged
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub fn secret_loaded(&self) -> bool {
        self.secret_loaded
    }

    /// Whether credentials are checked against Twilio's exact formats.
    pub fn is_strict(&self) -> bool {
        self.resolver.is_strict()
    }

    /// Environments that have a `[twilio.<ENV>]` block in either file.
    pub fn environments(&self) -> Vec<Environment> {
        Environment::ALL
            .into_iter()
            .filter(|env| self.merged().has_section(env.as_str()))
            .collect()
    }

    /// Select `environment`, apply environment variables, and validate.
    pub fn resolve(&self, environment: Environment) -> Result<ResolvedSettings, Error> {
        if !self.merged.has_section(environment.as_str()) {
            return Err(ConfigError::MissingEnvironment(environment).into());
        }

        let mut table = self.merged.clone();
        table.overlay(&self.env_overrides.clone().into_table(environment));

        for field in [ACCOUNT_SID, AUTH_TOKEN] {
            required(&table, environment, environment.as_str(), field)?;
        }
        let from_number = required_number(&table, environment, FROM_NUMBER)?;
        let to_number = required_number(&table, environment, TO_NUMBER)?;
        debug!(%environment, from_number, to_number, "required fields present");

        let credentials = self.resolver.resolve(&table, environment)?;
        let numbers = PhoneNumberPair::new(from_number, to_number);
        info!(%environment, secret_loaded = self.secret_loaded, "configuration resolved");

        Ok(ResolvedSettings {
            environment,
            project_name: self.runtime.project.name.clone(),
            credentials,
            numbers,
        })
    }
}

fn required<'a>(
    table: &'a TwilioTable,
    environment: Environment,
    section: &str,
    field: &'static str,
) -> Result<&'a str, ConfigError> {
    let value = table.get(section, field).ok_or(ConfigError::UnfilledField {
        environment,
        field,
        problem: "missing",
    })?;
    check_filled(value, environment, field)
}

/// Numbers may be set per environment; otherwise the shared `digits` section applies.
fn required_number<'a>(
    table: &'a TwilioTable,
    environment: Environment,
    field: &'static str,
) -> Result<&'a str, ConfigError> {
    match table.get(environment.as_str(), field) {
        Some(value) if !value.trim().is_empty() => check_filled(value, environment, field),
        _ => required(table, environment, NUMBERS_SECTION, field),
    }
}

fn check_filled<'a>(
    value: &'a str,
    environment: Environment,
    field: &'static str,
) -> Result<&'a str, ConfigError> {
    let problem = if value.trim().is_empty() {
        "empty"
    } else if is_placeholder(value) {
        "a placeholder"
    } else {
        return Ok(value);
    };
    Err(ConfigError::UnfilledField {
        environment,
        field,
        problem,
    })
}

/// Template values shipped in example files: `<your sid>`, `YOUR_AUTH_TOKEN`.
pub fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    v.is_empty()
        || (v.starts_with('<') && v.ends_with('>'))
        || v.to_ascii_uppercase().starts_with("YOUR_")
}

/// Validated view of one environment. Constructed once per run, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    environment: Environment,
    project_name: String,
    credentials: crate::credentials::CredentialBlock,
    numbers: PhoneNumberPair,
}

impl ResolvedSettings {
    pub fn new(
        environment: Environment,
        credentials: crate::credentials::CredentialBlock,
        numbers: PhoneNumberPair,
    ) -> Self {
        Self {
            environment,
            project_name: ProjectConfig::default().name,
            credentials,
            numbers,
        }
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn credentials(&self) -> &crate::credentials::CredentialBlock {
        &self.credentials
    }

    pub fn numbers(&self) -> &PhoneNumberPair {
        &self.numbers
    }

    pub fn account_sid(&self) -> &str {
        self.credentials.account_sid()
    }

    pub fn auth_token(&self) -> &str {
        self.credentials.auth_token()
    }

    pub fn from_number(&self) -> &str {
        self.numbers.from_number()
    }

    pub fn to_number(&self) -> &str {
        self.numbers.to_number()
    }
}

/// Reads the base file, the secret overlay and environment variables.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_path: PathBuf,
    secret_path: Option<PathBuf>,
    env_vars: Option<Map<String, String>>,
    resolver: CredentialResolver,
}

impl ConfigLoader {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            secret_path: None,
            env_vars: None,
            resolver: CredentialResolver::default(),
        }
    }

    pub fn with_secret(mut self, secret_path: impl AsRef<Path>) -> Self {
        self.secret_path = Some(secret_path.as_ref().to_path_buf());
        self
    }

    /// Use `vars` instead of the process environment.
    pub fn with_env_vars(mut self, vars: Map<String, String>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Enforce Twilio's exact account SID and auth token shapes.
    pub fn strict(mut self, strict: bool) -> Self {
        self.resolver = if strict {
            CredentialResolver::strict()
        } else {
            CredentialResolver::default()
        };
        self
    }

    /// Load and validate `environment` from `base_path` and `secret_path`.
    ///
    /// Only the two files are read; `TWILIO_*` process variables are ignored. Use
    /// [`ConfigLoader::read`] for the environment-variable layer.
    pub fn load(
        base_path: impl AsRef<Path>,
        secret_path: impl AsRef<Path>,
        environment: &str,
    ) -> Result<ResolvedSettings, Error> {
        let environment: Environment = environment.parse()?;
        ConfigLoader::new(base_path)
            .with_secret(secret_path)
            .with_env_vars(Map::new())
            .read()?
            .resolve(environment)
    }

    /// Read every layer. Files are only read, never created.
    pub fn read(&self) -> Result<ConfigLayers, ConfigError> {
        let base = read_file(&self.base_path)?;
        let mut merged = TwilioTable::from_config(&base, &self.base_path)?;

        let mut builder = Config::builder()
            .add_source(Config::try_from(&RuntimeSettings::default())?)
            .add_source(base);

        let mut secret_loaded = false;
        match &self.secret_path {
            Some(path) if path.is_file() => {
                let secret = read_file(path)?;
                merged.overlay(&TwilioTable::from_config(&secret, path)?);
                builder = builder.add_source(secret);
                secret_loaded = true;
            }
            Some(path) => {
                warn!(
                    path = %path.display(),
                    "secret overlay not found; using base file only, unfilled fields will fail validation"
                );
            }
            None => debug!("no secret overlay configured"),
        }

        let runtime: RuntimeSettings = builder
            .add_source(
                config::Environment::with_prefix(SETTINGS_ENV_PREFIX)
                    .separator("__")
                    .source(self.env_vars.clone()),
            )
            .build()?
            .try_deserialize()?;

        let env_overrides: EnvOverrides = Config::builder()
            .add_source(
                config::Environment::with_prefix(CREDENTIAL_ENV_PREFIX)
                    .ignore_empty(true)
                    .source(self.env_vars.clone()),
            )
            .build()?
            .try_deserialize()?;

        info!(
            base = %self.base_path.display(),
            secret_loaded,
            "configuration layers read"
        );
        Ok(ConfigLayers {
            merged,
            env_overrides,
            runtime,
            secret_loaded,
            resolver: self.resolver,
        })
    }
}

fn read_file(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    debug!(path = %path.display(), "reading configuration file");
    Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(true))
        .build()
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })
}
