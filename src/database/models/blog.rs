use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub featured: bool,
    /// Title, body, author and whatever else the author submitted
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

impl Blog {
    pub fn new(date: DateTime<Utc>, featured: bool, content: Map<String, Value>) -> Blog {
        Blog {
            id: Uuid::new_v4(),
            date,
            featured,
            content,
        }
    }
}

/// Reads a date the way clients send it: RFC 3339, a date and time without
/// an offset, or a bare `YYYY-MM-DD`. The last two are taken as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// `deserialize_with` helper for an optional client supplied date
pub fn deserialize_client_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date `{}`", raw)))
        })
        .transpose()
}

/// Newest first, at most `limit` entries
pub fn most_recent(mut blogs: Vec<Blog>, limit: usize) -> Vec<Blog> {
    blogs.sort_by(|a, b| b.date.cmp(&a.date));
    blogs.truncate(limit);
    blogs
}
