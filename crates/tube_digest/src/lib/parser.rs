//! # Yt Parser
//!
//! Extracts caption metadata from a YouTube watch page and turns the timed text
//! caption format into plain transcript segments.

use std::{borrow::Cow, ops::Deref, sync::LazyLock};

use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{CaptionTrack, VideoDetails};

static YT_PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+ytInitialPlayerResponse\s*=\s*(\{.*?\});\s*(?:var\s+meta\b|</script>)")
        .unwrap()
});

static TIMED_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").unwrap());

static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).unwrap());

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);").unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to extract ytInitialPlayerResponse from the watch page")]
    MissingPlayerResponse,
    #[error("Unexpected player response structure: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct WatchPage(String);

impl Deref for WatchPage {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl WatchPage {
    pub fn new(doc: String) -> Self {
        WatchPage(doc)
    }

    /// Deserializes the first `ytInitialPlayerResponse` object embedded in the page.
    pub fn player_response<T>(&self) -> Result<T, ParseError>
    where
        T: DeserializeOwned,
    {
        let raw = YT_PLAYER_RESPONSE_RE
            .captures(self)
            .and_then(|cap| cap.get(1))
            .ok_or(ParseError::MissingPlayerResponse)?;

        Ok(serde_json::from_str(raw.as_str())?)
    }
}

impl From<String> for WatchPage {
    fn from(value: String) -> Self {
        WatchPage(value)
    }
}

/// Lists the caption tracks of a player response. Videos without captions yield an empty list.
pub fn parse_caption_tracks(json: &Value) -> Result<Vec<CaptionTrack>, ParseError> {
    let tracks = &json["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"];
    if tracks.is_null() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_value(tracks.clone())?)
}

pub fn parse_video_details(json: &Value) -> Option<VideoDetails> {
    serde_json::from_value(json["videoDetails"].clone()).ok()
}

/// Picks a track for the first language that has one, preferring manually
/// created captions over generated ones for the same language.
pub fn select_caption_track<'a>(
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|language| {
        let mut candidates = tracks.iter().filter(|t| &t.language_code == language);
        let manual = candidates.clone().find(|t| !t.is_generated());
        manual.or_else(|| candidates.next())
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedTextSegment {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

/// Parses the `<transcript><text start=".." dur="..">..</text></transcript>` caption format.
pub fn parse_timed_text(xml: &str) -> Vec<TimedTextSegment> {
    TIMED_TEXT_RE
        .captures_iter(xml)
        .filter_map(|cap| {
            let attributes = cap.get(1).map_or("", |m| m.as_str());
            let (mut start, mut duration) = (0.0_f64, 0.0_f64);
            for attr in ATTRIBUTE_RE.captures_iter(attributes) {
                match &attr[1] {
                    "start" => start = attr[2].parse().unwrap_or_default(),
                    "dur" => duration = attr[2].parse().unwrap_or_default(),
                    _ => {}
                }
            }

            // the payload is escaped once as XML and once more as HTML
            let body = cap.get(2).map_or("", |m| m.as_str());
            let body = unescape_entities(&unescape_entities(body)).into_owned();
            let text = TAG_RE
                .replace_all(&body, "")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            (!text.is_empty()).then_some(TimedTextSegment {
                start,
                duration,
                text,
            })
        })
        .collect()
}

pub fn unescape_entities(text: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(text, |cap: &Captures| {
        let entity = &cap[1];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
            }
            _ => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
        };
        decoded.map_or_else(|| cap[0].to_string(), String::from)
    })
}

#[cfg(test)]
pub(crate) const WATCH_PAGE: &str = r#"
    <html>
        <head>
            <script nonce="gZTn8MILMQFuWon1rDk2VA">
                var ytInitialPlayerResponse = {"videoDetails": {"videoId": "dQw4w9WgXcQ", "title": "Fresh pasta {from scratch}; part 2", "author": "Kitchen Basics", "lengthSeconds": "212", "viewCount": "1500"}, "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                    {"baseUrl": "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en&kind=asr", "languageCode": "en", "kind": "asr", "name": {"simpleText": "English (auto-generated)"}},
                    {"baseUrl": "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en", "languageCode": "en", "name": {"runs": [{"text": "English"}]}},
                    {"baseUrl": "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=sw", "languageCode": "sw", "kind": "asr"}
                ]}}};var meta = document.createElement('meta');
            </script>
        </head>
    </html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn languages(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_player_response_extraction() {
        let page = WatchPage::from(WATCH_PAGE.to_string());
        let json = page.player_response::<Value>().expect("player response");
        assert_eq!(json["videoDetails"]["videoId"], json!("dQw4w9WgXcQ"));
        assert_eq!(
            json["videoDetails"]["title"],
            json!("Fresh pasta {from scratch}; part 2")
        );
    }

    #[test]
    fn test_player_response_terminated_by_script_tag() {
        let html = r#"<script>var ytInitialPlayerResponse = {"captions": null};</script>"#;
        let json = WatchPage::new(html.to_string())
            .player_response::<Value>()
            .unwrap();
        assert!(parse_caption_tracks(&json).unwrap().is_empty());
    }

    #[test]
    fn test_missing_player_response() {
        let page = WatchPage::new("<html><body>consent required</body></html>".into());
        assert!(matches!(
            page.player_response::<Value>(),
            Err(ParseError::MissingPlayerResponse)
        ));
    }

    #[test]
    fn test_invalid_player_response_json() {
        let page = WatchPage::new(
            "<script>var ytInitialPlayerResponse = {invalid: json};</script>".into(),
        );
        assert!(matches!(
            page.player_response::<Value>(),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_caption_track_selection() {
        let json = WatchPage::new(WATCH_PAGE.to_string())
            .player_response::<Value>()
            .unwrap();
        let tracks = parse_caption_tracks(&json).unwrap();
        assert_eq!(tracks.len(), 3);

        let english = select_caption_track(&tracks, &languages(&["en"])).unwrap();
        assert!(!english.is_generated(), "manual track should win");
        assert_eq!(
            english.name.as_ref().and_then(|n| n.text()).as_deref(),
            Some("English")
        );

        let swahili = select_caption_track(&tracks, &languages(&["sw", "en"])).unwrap();
        assert_eq!(swahili.language_code, "sw");
        assert!(swahili.is_generated());

        assert!(select_caption_track(&tracks, &languages(&["fr"])).is_none());
    }

    #[test]
    fn test_video_details() {
        let json = WatchPage::new(WATCH_PAGE.to_string())
            .player_response::<Value>()
            .unwrap();
        let details = parse_video_details(&json).unwrap();
        assert_eq!(details.author.as_deref(), Some("Kitchen Basics"));
        assert_eq!(details.length_seconds.as_deref(), Some("212"));
    }

    #[test]
    fn test_timed_text_parsing() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0.24" dur="3.1">welcome back
to the channel</text>
            <text start="3.34" dur="2.5">today&amp;#39;s recipe is &lt;b&gt;pasta&lt;/b&gt; dough</text>
            <text start="5.84" dur="1.0">   </text>
            <text start="6.84" dur="1.2">[Music] &amp;amp; intro</text>
        </transcript>"#;

        let segments = parse_timed_text(xml);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text, "welcome back to the channel");
        assert_eq!(segments[0].start, 0.24);
        assert_eq!(segments[0].duration, 3.1);
        assert_eq!(segments[1].text, "today's recipe is pasta dough");
        assert_eq!(segments[2].text, "[Music] & intro");
    }

    #[test]
    fn test_unescape_numeric_entities() {
        assert_eq!(unescape_entities("caf&#233; &#x2014; &#X41;"), "café — A");
        assert_eq!(unescape_entities("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
        assert!(matches!(unescape_entities("plain"), Cow::Borrowed(_)));
    }
}
