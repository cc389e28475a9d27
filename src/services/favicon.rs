//! Icon selection for rendered bookmarks.
//!
//! Precedence: a leading emoji/symbol run in the title, then an icon found by
//! a probe, then the stored favicon URL (unless it failed to load), then a
//! coloured initial-letter badge. Nothing here touches the network; probing
//! goes through [`IconProbe`] so hosts decide when and where it happens.

use url::Url;

use crate::types::bar::Bookmark;

const BADGE_COLORS: [&str; 10] = [
    "#4285f4", "#34a853", "#fbbc05", "#ea4335", "#673ab7", "#ff5722", "#009688", "#795548",
    "#607d8b", "#9c27b0",
];

/// What to draw in a bookmark's icon slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconDisplay {
    /// Emoji or symbol taken from the start of the title.
    Glyph(String),
    /// An image URL.
    Image(String),
    /// Generated letter badge.
    Badge { letter: String, color: &'static str },
}

/// Icon plus the title text left to display next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIcon {
    pub display: IconDisplay,
    pub title: String,
}

/// Per-bookmark icon knowledge gathered after the first render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconState {
    /// The stored favicon failed to load in the page.
    Failed,
    /// A probe found a working icon at this URL.
    Resolved(String),
    /// Every candidate was tried and none loaded.
    Exhausted,
}

fn is_symbol(c: char) -> bool {
    matches!(c as u32,
        0x00A9 | 0x00AE | 0x2122
        | 0x2190..=0x21FF
        | 0x2300..=0x23FF
        | 0x25A0..=0x27BF
        | 0x2900..=0x297F
        | 0x2B00..=0x2BFF
        | 0x3030 | 0x303D | 0x3297 | 0x3299
        | 0x1F000..=0x1FAFF)
}

/// Joiners, variation selectors and tags that extend the preceding symbol.
fn is_symbol_continuation(c: char) -> bool {
    matches!(c as u32, 0x200D | 0xFE0E | 0xFE0F | 0x20E3 | 0xE0020..=0xE007F)
}

/// Splits a leading run of emoji/symbols (with interleaved whitespace) off `title`.
///
/// Returns `(glyphs, remaining_title)`, both trimmed, or `None` when the title
/// does not start with a symbol.
pub fn split_glyph_prefix(title: &str) -> Option<(String, String)> {
    let mut end = 0;
    let mut seen_symbol = false;
    for (offset, c) in title.char_indices() {
        let accepted = is_symbol(c)
            || (seen_symbol && (is_symbol_continuation(c) || c.is_whitespace()));
        if !accepted {
            break;
        }
        seen_symbol |= is_symbol(c);
        end = offset + c.len_utf8();
    }
    if !seen_symbol {
        return None;
    }
    let glyphs = title[..end].trim().to_string();
    let rest = title[end..].trim().to_string();
    Some((glyphs, rest))
}

/// Letter badge from the title, or from the host name for untitled bookmarks.
pub fn initial_badge(title: &str, url: &str) -> IconDisplay {
    let source = match title.trim() {
        "" => Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default(),
        t => t.to_string(),
    };
    let first = source.chars().next().unwrap_or('?');
    let letter: String = first.to_uppercase().collect();
    let code = letter.chars().next().map(|c| c as u32).unwrap_or(0);
    IconDisplay::Badge {
        letter,
        color: BADGE_COLORS[(code as usize) % BADGE_COLORS.len()],
    }
}

/// Picks the icon for `bookmark` given what is known about its icon URLs.
pub fn resolve_icon(bookmark: &Bookmark, state: Option<&IconState>) -> ResolvedIcon {
    if let Some((glyphs, rest)) = split_glyph_prefix(&bookmark.title) {
        return ResolvedIcon {
            display: IconDisplay::Glyph(glyphs),
            title: rest,
        };
    }

    let title = bookmark.title.trim().to_string();
    let display = match (state, bookmark.favicon.as_deref()) {
        (Some(IconState::Resolved(src)), _) => IconDisplay::Image(src.clone()),
        (None, Some(src)) if !src.is_empty() => IconDisplay::Image(src.to_string()),
        _ => initial_badge(&title, &bookmark.url),
    };
    ResolvedIcon { display, title }
}

/// True when a probe could still upgrade this bookmark's badge.
pub fn needs_probe(bookmark: &Bookmark, state: Option<&IconState>) -> bool {
    if split_glyph_prefix(&bookmark.title).is_some() {
        return false;
    }
    match state {
        Some(IconState::Failed) => true,
        Some(IconState::Resolved(_)) | Some(IconState::Exhausted) => false,
        None => bookmark.favicon.as_deref().map_or(true, str::is_empty),
    }
}

/// Finite, restartable sequence of places an icon for a site may live.
///
/// Nothing is computed until iterated; calling [`FaviconCandidates::iter`]
/// again starts over from the first candidate.
#[derive(Debug, Clone)]
pub struct FaviconCandidates {
    scheme: String,
    host: String,
}

impl FaviconCandidates {
    /// Returns `None` for URLs without a host.
    pub fn for_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_string();
        let scheme = parsed.scheme().to_string();
        Some(Self {
            scheme,
            host: match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            },
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        let bare_host = self.host.split(':').next().unwrap_or(&self.host);
        let with_www = if bare_host.starts_with("www.") {
            None
        } else {
            Some(format!("https://www.{}/favicon.ico", bare_host))
        };
        (0..6).filter_map(move |step| match step {
            0 => Some(format!(
                "https://www.google.com/s2/favicons?domain={}&sz=32",
                bare_host
            )),
            1 => Some(format!("{}://{}/favicon.ico", self.scheme, self.host)),
            2 => Some(format!("{}://{}/favicon.png", self.scheme, self.host)),
            3 => Some(format!("{}://{}/apple-touch-icon.png", self.scheme, self.host)),
            4 => with_www.clone(),
            _ => Some(format!("https://api.faviconkit.com/{}/32", bare_host)),
        })
    }
}

/// Checks whether an icon URL actually serves an image.
pub trait IconProbe {
    fn probe(&self, candidate: &str) -> bool;
}

impl<F: Fn(&str) -> bool> IconProbe for F {
    fn probe(&self, candidate: &str) -> bool {
        self(candidate)
    }
}

/// Consumes `candidates` until `probe` accepts one.
pub fn first_resolved<P: IconProbe + ?Sized>(candidates: &FaviconCandidates, probe: &P) -> Option<String> {
    candidates.iter().find(|c| probe.probe(c))
}

/// Probes candidates over HTTP, accepting non-empty `image/*` responses.
#[cfg(feature = "network")]
pub struct HttpIconProbe {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "network")]
impl HttpIconProbe {
    pub fn new(timeout_ms: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self { client })
    }
}

#[cfg(feature = "network")]
impl IconProbe for HttpIconProbe {
    fn probe(&self, candidate: &str) -> bool {
        let response = match self.client.get(candidate).send() {
            Ok(r) => r,
            Err(e) => {
                tracing::trace!(candidate, error = %e, "icon probe failed");
                return false;
            }
        };
        let is_image = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| ct.starts_with("image/"));
        response.status().is_success()
            && is_image
            && response.bytes().map_or(false, |b| !b.is_empty())
    }
}
