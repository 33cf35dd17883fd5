//! YouTube transcript extraction.
//!
//! The watch page embeds the player response, whose `captionTracks` list
//! points at timed-text XML for each available language.

use crate::scraper::{first_text, meta_content};
use scraper::{Html, Selector};
use serde::Deserialize;

/// Title used when the watch page has none
pub const DEFAULT_TITLE: &str = "YouTube Video";

const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

/// URL prefixes after which the video id starts
const ID_MARKERS: [&str; 3] = ["youtube.com/watch?v=", "youtu.be/", "youtube.com/embed/"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    /// "asr" for auto-generated captions
    #[serde(default)]
    pub kind: Option<String>,
}

/// Video id from a watch, short or embed URL
pub fn video_id(url: &str) -> Option<&str> {
    ID_MARKERS.iter().find_map(|marker| {
        let start = url.find(marker)? + marker.len();
        let rest = &url[start..];
        let end = rest
            .find(|c: char| matches!(c, '&' | '?' | '#' | '/' | '\n'))
            .unwrap_or(rest.len());
        let id = &rest[..end];
        (!id.is_empty()).then_some(id)
    })
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Caption tracks listed in a watch page, in page order
pub fn caption_tracks(html: &str) -> Vec<CaptionTrack> {
    let Some(start) = html.find(CAPTION_TRACKS_KEY) else {
        return Vec::new();
    };
    let rest = &html[start + CAPTION_TRACKS_KEY.len()..];
    serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .and_then(Result::ok)
        .unwrap_or_default()
}

/// Prefer English, then manual over auto-generated, then the first listed track
pub fn pick_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    let english = |t: &&CaptionTrack| t.language_code.starts_with("en");
    let manual = |t: &&CaptionTrack| t.kind.as_deref() != Some("asr");

    tracks
        .iter()
        .filter(english)
        .find(manual)
        .or_else(|| tracks.iter().find(english))
        .or_else(|| tracks.first())
}

/// Video title from the watch page
pub fn page_title(html: &str) -> String {
    let document = Html::parse_document(html);
    meta_content(&document, "og:title")
        .or_else(|| {
            first_text(&document, "title")
                .map(|title| title.trim_end_matches(" - YouTube").trim().to_string())
        })
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Join the caption lines of a timed-text document into one transcript.
///
/// Handles both the legacy `<text>` format and the `<p>` based format 3.
pub fn parse_transcript(xml: &str) -> String {
    let document = Html::parse_fragment(xml);
    let Ok(selector) = Selector::parse("text, p") else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|line| decode_entities(&line.text().collect::<String>()))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Caption text is escaped twice; the parser undoes one level, this the other
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    Html::parse_fragment(text)
        .root_element()
        .text()
        .collect()
}
