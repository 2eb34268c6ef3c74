//! Message resources returned by the Twilio Messages API.

use serde::{Deserialize, Serialize, Serializer};
use sms_core::{DeliveryStatus, SmsError};
use std::collections::BTreeSet;
use std::path::Path;
use time::format_description::well_known::Rfc2822;
use time::format_description;
use time::OffsetDateTime;
use tracing::info;

/// Length of every Twilio resource id (`AC…`, `SM…`, `MM…`).
pub const SID_LEN: usize = 34;

const EXTRACT_DATE_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";

/// True if `sid` looks like a message id (`SM` for SMS, `MM` for MMS).
pub fn is_message_sid(sid: &str) -> bool {
    sid.len() == SID_LEN
        && (sid.starts_with("SM") || sid.starts_with("MM"))
        && sid.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Message resource exactly as the API encodes it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TwilioMessage {
    pub sid: String,
    pub status: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub body: String,
    pub date_created: Option<String>,
    pub date_sent: Option<String>,
    pub date_updated: Option<String>,
    #[serde(default)]
    pub direction: String,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub num_media: Option<String>,
    #[serde(default)]
    pub num_segments: Option<String>,
    pub price: Option<String>,
    pub price_unit: Option<String>,
}

/// One page of the message list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct MessagePage {
    pub messages: Vec<TwilioMessage>,
}

/// Normalized view of a single message, as printed by the CLI and written to extracts.
///
/// Timestamps are UTC and serialize as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRecord {
    pub sid: String,
    pub status: DeliveryStatus,
    pub from_number: String,
    pub to_number: String,
    pub body: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub date_created: Option<OffsetDateTime>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub date_sent: Option<OffsetDateTime>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub date_updated: Option<OffsetDateTime>,
    pub direction: String,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    pub num_media: u32,
    pub num_segments: u32,
    pub price: Option<f64>,
    pub price_unit: Option<String>,
    pub emoji_count: usize,
    pub is_redacted: bool,
}

impl TryFrom<TwilioMessage> for MessageRecord {
    type Error = SmsError;

    fn try_from(m: TwilioMessage) -> Result<Self, Self::Error> {
        if !is_message_sid(&m.sid) {
            return Err(SmsError::Invalid(format!("malformed message sid: {:?}", m.sid)));
        }
        let body = sanitize_body(&m.body);
        Ok(MessageRecord {
            status: DeliveryStatus::from(m.status),
            from_number: m.from,
            to_number: m.to,
            date_created: parse_timestamp(m.date_created.as_deref())?,
            date_sent: parse_timestamp(m.date_sent.as_deref())?,
            date_updated: parse_timestamp(m.date_updated.as_deref())?,
            direction: m.direction,
            error_code: m.error_code,
            error_message: m.error_message,
            num_media: parse_count("num_media", m.num_media.as_deref())?,
            num_segments: parse_count("num_segments", m.num_segments.as_deref())?,
            price: parse_price(m.price.as_deref())?,
            price_unit: m.price_unit,
            emoji_count: emoji_count(&body),
            is_redacted: body.is_empty(),
            body,
            sid: m.sid,
        })
    }
}

/// Dated collection of records written to disk by `messages list/show --output`.
#[derive(Debug, Clone, Serialize)]
pub struct MessageExtract {
    pub extract_date: String,
    pub count: usize,
    pub records: Vec<MessageRecord>,
}

impl MessageExtract {
    pub fn new(records: Vec<MessageRecord>) -> Self {
        let extract_date =
            format_timestamp(OffsetDateTime::now_utc()).unwrap_or_else(|_| String::new());
        Self {
            extract_date,
            count: records.len(),
            records,
        }
    }

    /// Write the extract as pretty JSON, replacing any previous file at `path`.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), count = self.count, "saved message extract");
        Ok(())
    }
}

/// Collapse tabs, newlines and runs of spaces, then trim.
fn sanitize_body(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of distinct emoji code points in `text`.
pub fn emoji_count(text: &str) -> usize {
    text.chars()
        .filter(|c| is_emoji(*c))
        .collect::<BTreeSet<char>>()
        .len()
}

fn is_emoji(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1FAFF // pictographs, emoticons, transport, supplemental symbols
        | 0x2600..=0x27BF // misc symbols and dingbats
        | 0x2B00..=0x2BFF // arrows and stars
    )
}

fn parse_timestamp(raw: Option<&str>) -> Result<Option<OffsetDateTime>, SmsError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => OffsetDateTime::parse(s, &Rfc2822)
            .map(|dt| Some(dt.to_offset(time::UtcOffset::UTC)))
            .map_err(|e| SmsError::Invalid(format!("bad timestamp {:?}: {}", s, e))),
    }
}

fn parse_count(field: &str, raw: Option<&str>) -> Result<u32, SmsError> {
    match raw {
        None => Ok(0),
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| SmsError::Invalid(format!("bad {}: {:?}", field, s))),
    }
}

fn parse_price(raw: Option<&str>) -> Result<Option<f64>, SmsError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| SmsError::Invalid(format!("bad price: {:?}", s))),
    }
}

fn format_timestamp(dt: OffsetDateTime) -> Result<String, String> {
    let format = format_description::parse(EXTRACT_DATE_FORMAT).map_err(|e| e.to_string())?;
    dt.format(&format).map_err(|e| e.to_string())
}

fn serialize_timestamp<S: Serializer>(
    value: &Option<OffsetDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        None => serializer.serialize_none(),
        Some(dt) => {
            let formatted = format_timestamp(*dt).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&formatted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SID: &str = "SM0123456789abcdef0123456789abcdef";

    fn wire(body: &str) -> TwilioMessage {
        serde_json::from_value(json!({
            "sid": SID,
            "status": "delivered",
            "from": "+15557654321",
            "to": "+15551234567",
            "body": body,
            "date_created": "Thu, 30 Jul 2015 20:12:31 +0000",
            "date_sent": "Thu, 30 Jul 2015 20:12:33 +0000",
            "date_updated": "Thu, 30 Jul 2015 20:12:33 +0000",
            "direction": "outbound-api",
            "error_code": null,
            "error_message": null,
            "num_media": "0",
            "num_segments": "1",
            "price": "-0.00750",
            "price_unit": "USD",
            "account_sid": "ACaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        }))
        .unwrap()
    }

    #[test]
    fn converts_wire_message() {
        let record = MessageRecord::try_from(wire("hi\tthere\n  👍 👍 🎉")).unwrap();
        assert_eq!(record.status, DeliveryStatus::Delivered);
        assert_eq!(record.body, "hi there 👍 👍 🎉");
        assert_eq!(record.emoji_count, 2);
        assert!(!record.is_redacted);
        assert_eq!(record.num_segments, 1);
        assert_eq!(record.price, Some(-0.0075));
        assert_eq!(record.date_created.unwrap().unix_timestamp(), 1438287151);
    }

    #[test]
    fn empty_body_is_redacted() {
        let record = MessageRecord::try_from(wire("")).unwrap();
        assert!(record.is_redacted);
        assert_eq!(record.emoji_count, 0);
    }

    #[test]
    fn serializes_timestamps_as_plain_utc() {
        let record = MessageRecord::try_from(wire("x")).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["date_created"], "2015-07-30 20:12:31");
        assert_eq!(value["status"], "delivered");
    }

    #[test]
    fn rejects_malformed_sid() {
        let mut m = wire("x");
        m.sid = "AC0123456789abcdef0123456789abcdef".into();
        assert!(matches!(MessageRecord::try_from(m), Err(SmsError::Invalid(_))));
    }

    #[test]
    fn message_sid_shape() {
        assert!(is_message_sid(SID));
        assert!(is_message_sid("MM0123456789abcdef0123456789abcdef"));
        assert!(!is_message_sid("SM123"));
        assert!(!is_message_sid(""));
    }

    #[test]
    fn extract_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("history.json");
        let extract = MessageExtract::new(vec![MessageRecord::try_from(wire("a")).unwrap()]);
        extract.write_to(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["count"], 1);
        assert_eq!(written["records"][0]["sid"], SID);
        assert_eq!(written["extract_date"].as_str().unwrap().len(), 19);
    }
}
