use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::ContentMetrics;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    #[serde(alias = "youtube#video")]
    Video,
    #[serde(alias = "youtube#channel")]
    Channel,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Video => "video",
            ItemKind::Channel => "channel",
        }
    }
}

/// Duration as delivered by the metadata layer: whole or fractional seconds,
/// or an ISO-8601 `PT#H#M#S` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Fractional(f64),
    Iso(String),
}

impl Default for DurationValue {
    fn default() -> Self {
        DurationValue::Seconds(0)
    }
}

impl DurationValue {
    pub fn seconds(&self) -> u64 {
        match self {
            DurationValue::Seconds(value) => *value,
            DurationValue::Fractional(value) => {
                if value.is_finite() && *value > 0.0 {
                    value.round() as u64
                } else {
                    0
                }
            }
            DurationValue::Iso(value) => parse_iso_duration(value),
        }
    }
}

/// Normalized metadata record for one video or channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoRecord {
    #[serde(deserialize_with = "lenient_value")]
    pub kind: ItemKind,
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(alias = "channel", deserialize_with = "lenient_string")]
    pub channel_title: String,
    #[serde(
        alias = "upload_date",
        alias = "publishedAt",
        deserialize_with = "lenient_string"
    )]
    pub published_at: String,
    #[serde(deserialize_with = "lenient_count")]
    pub view_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub comment_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub subscriber_count: u64,
    #[serde(deserialize_with = "lenient_value")]
    pub duration: DurationValue,
    #[serde(deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(alias = "caption", deserialize_with = "lenient_bool")]
    pub caption_present: bool,
}

impl VideoRecord {
    pub fn metrics(&self) -> ContentMetrics {
        ContentMetrics {
            view_count: self.view_count,
            like_count: self.like_count,
            comment_count: self.comment_count,
            duration_seconds: self.duration.seconds(),
            description: self.description.clone(),
            tags: self.tags.iter().cloned().collect(),
            caption_present: self.caption_present,
            published_at: self.published_at.clone(),
        }
    }

    /// `id` when present, otherwise a stable id hashed from title and
    /// description.
    pub fn record_id(&self) -> String {
        if !self.id.trim().is_empty() {
            return self.id.trim().to_string();
        }
        let payload = format!("{}\n{}", self.title, self.description);
        format!("rec_{:x}", stable_hash64(&payload))
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            self.id.as_str()
        } else {
            self.title.as_str()
        }
    }
}

const WRAPPER_KEYS: [&str; 3] = ["items", "videos", "records"];

/// Parses a JSON array of records, or an object holding one under `items`,
/// `videos` or `records`.
pub fn parse_records(json: &str) -> Result<Vec<VideoRecord>> {
    let items = match serde_json::from_str::<serde_json::Value>(json)? {
        list @ serde_json::Value::Array(_) => list,
        serde_json::Value::Object(mut object) => WRAPPER_KEYS
            .iter()
            .find_map(|key| object.remove(*key))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "record object needs one of: {}",
                    WRAPPER_KEYS.join(", ")
                ))
            })?,
        _ => {
            return Err(Error::InvalidInput(
                "records must be a JSON array or object".to_string(),
            ))
        }
    };
    Ok(serde_json::from_value(items)?)
}

pub fn load_records(path: &Path) -> Result<Vec<VideoRecord>> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        Error::InvalidInput(format!("failed to read {}: {}", path.display(), err))
    })?;
    parse_records(&contents)
}

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("valid duration pattern")
});

/// Seconds in an ISO-8601 `PT#H#M#S` duration; 0 when it does not parse.
pub fn parse_iso_duration(value: &str) -> u64 {
    let Some(caps) = ISO_DURATION.captures(value.trim()) else {
        return 0;
    };
    let part = |idx: usize| -> u64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    part(1)
        .saturating_mul(3600)
        .saturating_add(part(2).saturating_mul(60))
        .saturating_add(part(3))
}

pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` and yt-dlp style `YYYYMMDD`.
pub fn parse_publish_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d", "%Y%m%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseCount {
    Int(u64),
    Float(f64),
    Text(String),
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<LooseCount> = Option::deserialize(deserializer).unwrap_or(None);
    Ok(match value {
        Some(LooseCount::Int(value)) => value,
        Some(LooseCount::Float(value)) if value.is_finite() && value > 0.0 => value as u64,
        Some(LooseCount::Text(text)) => text.trim().replace(',', "").parse::<u64>().unwrap_or(0),
        _ => 0,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseBool {
    Flag(bool),
    Text(String),
    Number(i64),
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<LooseBool> = Option::deserialize(deserializer).unwrap_or(None);
    Ok(match value {
        Some(LooseBool::Flag(flag)) => flag,
        Some(LooseBool::Text(text)) => text.trim().eq_ignore_ascii_case("true"),
        Some(LooseBool::Number(number)) => number != 0,
        None => false,
    })
}

fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer).unwrap_or(None);
    let Some(serde_json::Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(tag) => Some(tag),
            _ => None,
        })
        .collect())
}

/// `null` and non-text values other than numbers become an empty string.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => text,
        Some(serde_json::Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

/// Falls back to `T::default()` for `null` or any shape `T` rejects.
fn lenient_value<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| T::deserialize(value).ok())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_duration_parses_components() {
        assert_eq!(parse_iso_duration("PT1H30M15S"), 5415);
        assert_eq!(parse_iso_duration("PT4M"), 240);
        assert_eq!(parse_iso_duration("P1D"), 0);
        assert_eq!(parse_iso_duration(""), 0);
    }

    #[test]
    fn duration_formats_with_and_without_hours() {
        assert_eq!(format_duration(5415), "1:30:15");
        assert_eq!(format_duration(75), "1:15");
        assert_eq!(format_duration(0), "0:00");
    }

    #[test]
    fn publish_date_accepts_known_shapes() {
        assert!(parse_publish_date("2024-03-01T10:00:00Z").is_some());
        assert!(parse_publish_date("2024-03-01").is_some());
        assert!(parse_publish_date("20240301").is_some());
        assert!(parse_publish_date("last tuesday").is_none());
        assert!(parse_publish_date("").is_none());
    }

    #[test]
    fn records_parse_from_list_or_wrapper() {
        let list = r#"[{"id": "a", "view_count": "1,200", "caption": "true"}]"#;
        let records = parse_records(list).unwrap();
        assert_eq!(records[0].view_count, 1200);
        assert!(records[0].caption_present);

        let wrapped = r#"{"videos": [{"id": "b", "duration": "PT2M", "tags": null}]}"#;
        let records = parse_records(wrapped).unwrap();
        assert_eq!(records[0].duration.seconds(), 120);
        assert!(records[0].tags.is_empty());
    }

    #[test]
    fn record_id_is_stable_when_missing() {
        let record = VideoRecord {
            title: "clip".to_string(),
            ..VideoRecord::default()
        };
        assert_eq!(record.record_id(), record.clone().record_id());
        assert!(record.record_id().starts_with("rec_"));
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let json = r#"[{"id": null, "title": null, "description": null, "channel_title": null,
            "published_at": null, "duration": null, "kind": null, "view_count": null}]"#;
        let records = parse_records(json).unwrap();
        let record = &records[0];
        assert_eq!(record.kind, ItemKind::Video);
        assert!(record.id.is_empty());
        assert!(record.title.is_empty());
        assert!(record.description.is_empty());
        assert!(record.channel_title.is_empty());
        assert!(record.published_at.is_empty());
        assert_eq!(record.duration.seconds(), 0);
        assert_eq!(record.view_count, 0);
    }

    #[test]
    fn odd_shapes_fall_back_per_field() {
        let json = r#"{"records": [{"id": 42, "description": {"text": "x"},
            "duration": [1, 2], "kind": "youtube#playlist", "like_count": 7}]}"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records[0].id, "42");
        assert!(records[0].description.is_empty());
        assert_eq!(records[0].duration.seconds(), 0);
        assert_eq!(records[0].kind, ItemKind::Video);
        assert_eq!(records[0].like_count, 7);
    }

    #[test]
    fn fractional_and_iso_durations_survive_lenient_parsing() {
        let json = r#"[{"duration": 212.6}, {"duration": "PT1M5S"}, {"duration": 90}]"#;
        let seconds: Vec<u64> = parse_records(json)
            .unwrap()
            .iter()
            .map(|record| record.duration.seconds())
            .collect();
        assert_eq!(seconds, vec![213, 65, 90]);
    }

    #[test]
    fn api_kinds_map_to_item_kinds() {
        let json = r#"[{"kind": "youtube#channel", "title": "Jane"},
            {"kind": "youtube#video"}, {"kind": "channel"}]"#;
        let kinds: Vec<ItemKind> = parse_records(json)
            .unwrap()
            .iter()
            .map(|record| record.kind)
            .collect();
        assert_eq!(kinds, vec![ItemKind::Channel, ItemKind::Video, ItemKind::Channel]);
    }

    #[test]
    fn malformed_record_files_report_what_is_wrong() {
        let err = parse_records(r#"{"entries": []}"#).unwrap_err();
        assert!(err.to_string().contains("items, videos, records"));
        assert!(parse_records("42").is_err());
        assert!(parse_records("not json").is_err());
    }
}
