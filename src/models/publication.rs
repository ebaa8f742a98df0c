//! Rows in the `publications` table.

use super::RowId;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Map, Value};

/// A published file together with its description.
///
/// `created_at` is assigned by the database and is the listing sort key; both
/// `timestamptz` and plain `timestamp` (read as UTC) columns are accepted.
/// `users` is only present when the row was selected with the
/// `users(username)` embedding. Columns not named here are kept in `extra`
/// and written back out unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Publication {
    pub id: RowId,

    /// Owning account. Never checked before the insert.
    pub user_id: RowId,

    pub category: Option<String>,

    pub description: Option<String>,

    /// Public URL of the stored file.
    pub file_path: Option<String>,

    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Owner>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Username of the account that owns a publication.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Owner {
    pub username: String,
}

/// Insert payload for `publications`.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NewPublication {
    pub user_id: String,
    pub category: String,
    pub description: String,
    pub file_path: String,
}

/// Parse a PostgREST timestamp, with or without an offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_timestamp(&raw)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{}`", raw)))
        })
        .transpose()
}
