use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use url::{ParseError, Url};

/// Identifier of a bar or bookmark.
///
/// Freshly minted ids combine the current time in milliseconds with a random
/// tiebreaker. Older configurations stored ids as JSON numbers, so both numbers
/// and strings deserialize; the canonical form is always a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Mints a new id that is unique even for two calls within the same millisecond.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let tiebreak: u32 = rand::thread_rng().gen();
        Self(format!("{}-{:08x}", millis, tiebreak))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct EntityIdVisitor;

impl<'de> Visitor<'de> for EntityIdVisitor {
    type Value = EntityId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or numeric id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
        Ok(EntityId(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
        Ok(EntityId(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
        Ok(EntityId(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<EntityId, E> {
        // serde_json renders integral floats as "1.0"; keep "1" so it matches the u64 form
        if v.fract() == 0.0 && v.abs() < 9.0e15 {
            Ok(EntityId(format!("{}", v as i64)))
        } else {
            Ok(EntityId(v.to_string()))
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntityIdVisitor)
    }
}

/// A single link entry on a bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: EntityId,
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub is_custom_title: bool,
}

impl Bookmark {
    /// Builds a bookmark for `url`, deriving a favicon service URL and, when
    /// `fallback_title` is empty or just repeats the URL, a title from the host name.
    ///
    /// Input with no scheme at all gets `https://` prepended; any other
    /// scheme is kept as written, so [`is_valid_url`] still rejects it.
    pub fn from_url(url: &str, fallback_title: Option<&str>) -> Self {
        let url = url.trim();
        let normalized = match Url::parse(url) {
            Err(ParseError::RelativeUrlWithoutBase) => format!("https://{}", url),
            _ => url.to_string(),
        };

        let mut title = fallback_title.unwrap_or("").trim().to_string();
        let mut favicon = None;

        if let Ok(parsed) = Url::parse(&normalized) {
            if let Some(host) = parsed.host_str() {
                favicon = Some(format!(
                    "https://www.google.com/s2/favicons?domain={}&sz=16",
                    host
                ));
                if title.is_empty() || title == url || title == normalized {
                    title = title_from_host(host);
                }
            }
        } else if title.is_empty() {
            title = url.to_string();
        }

        Self {
            id: EntityId::generate(),
            title,
            url: normalized,
            favicon,
            is_custom_title: false,
        }
    }
}

/// `www.example.co.uk` becomes `Example`.
fn title_from_host(host: &str) -> String {
    let label = host
        .strip_prefix("www.")
        .unwrap_or(host)
        .split('.')
        .next()
        .unwrap_or(host);
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A named, ordered strip of bookmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

impl Bar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            name: name.into(),
            bookmarks: Vec::new(),
        }
    }

    /// The configuration used when storage holds no bars.
    pub fn default_bar() -> Self {
        Self {
            id: EntityId::from(1u64),
            name: "Bar 1".to_string(),
            bookmarks: Vec::new(),
        }
    }

    pub fn position_of(&self, bookmark_id: &EntityId) -> Option<usize> {
        self.bookmarks.iter().position(|b| &b.id == bookmark_id)
    }
}

/// Returns true for absolute http/https URLs.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}
