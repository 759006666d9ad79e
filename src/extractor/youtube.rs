use crate::error::ExtractError;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

static CAPTION_TEXT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b(?:[^>]*[^/>])?>(.*?)</text>").unwrap());

/// One entry of a video's caption track listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub language_code: String,
    /// "asr" marks an automatically generated track
    #[serde(default)]
    pub kind: Option<String>,
}

/// Parse the video id out of a YouTube link.
///
/// Accepted shapes: `youtu.be/<id>`, `youtube.com/watch?v=<id>`,
/// `youtube.com/embed/<id>` and `youtube.com/v/<id>`, with or without `www.`.
pub fn parse_video_id(link: &str) -> Result<String, ExtractError> {
    let parsed = Url::parse(link).map_err(|_| ExtractError::InvalidLink(link.to_string()))?;
    let host = parsed.host_str().unwrap_or("");

    let id = match host {
        "youtu.be" => parsed
            .path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or("")
            .to_string(),
        "youtube.com" | "www.youtube.com" => {
            let path = parsed.path();
            if path == "/watch" {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())
                    .unwrap_or_default()
            } else if let Some(rest) = path.strip_prefix("/embed/") {
                rest.split('/').next().unwrap_or("").to_string()
            } else if let Some(rest) = path.strip_prefix("/v/") {
                rest.split('/').next().unwrap_or("").to_string()
            } else {
                return Err(ExtractError::InvalidLink(link.to_string()));
            }
        }
        _ => return Err(ExtractError::InvalidLink(link.to_string())),
    };

    if id.is_empty() {
        return Err(ExtractError::InvalidLink(link.to_string()));
    }

    Ok(id)
}

/// Fetch the transcript of a YouTube video, preferring English captions
pub async fn fetch_transcript(
    client: &reqwest::Client,
    link: &str,
) -> Result<String, ExtractError> {
    fetch_transcript_from(client, "https://www.youtube.com", link).await
}

async fn fetch_transcript_from(
    client: &reqwest::Client,
    watch_base: &str,
    link: &str,
) -> Result<String, ExtractError> {
    let video_id = parse_video_id(link)?;
    debug!(%video_id, "fetching video transcript");

    let watch_url = format!("{}/watch?v={}", watch_base, video_id);
    let response = client
        .get(&watch_url)
        .send()
        .await
        .map_err(|e| ExtractError::transport(&watch_url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::http_status(status.as_u16(), &watch_url));
    }

    let watch_html = response
        .text()
        .await
        .map_err(|e| ExtractError::transport(&watch_url, e))?;

    let tracks = parse_caption_tracks(&watch_html);
    let track =
        select_track(&tracks).ok_or_else(|| ExtractError::NoTranscript(video_id.clone()))?;
    debug!(
        language = %track.language_code,
        generated = track.kind.as_deref() == Some("asr"),
        "selected caption track"
    );

    let response = client
        .get(&track.base_url)
        .send()
        .await
        .map_err(|e| ExtractError::transport(&track.base_url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::http_status(status.as_u16(), &track.base_url));
    }

    let caption_xml = response
        .text()
        .await
        .map_err(|e| ExtractError::transport(&track.base_url, e))?;

    let transcript = parse_caption_xml(&caption_xml);
    if transcript.is_empty() {
        return Err(ExtractError::NoTranscript(video_id));
    }

    Ok(transcript)
}

/// Pull the caption track listing out of a watch page.
///
/// Returns an empty list when the page advertises no captions.
pub fn parse_caption_tracks(watch_html: &str) -> Vec<CaptionTrack> {
    let Some(json) = caption_tracks_json(watch_html) else {
        return Vec::new();
    };

    match serde_json::from_str(json) {
        Ok(tracks) => tracks,
        Err(e) => {
            warn!("failed to parse caption track listing: {}", e);
            Vec::new()
        }
    }
}

/// Slice the balanced `captionTracks` JSON array out of the player response blob
fn caption_tracks_json(html: &str) -> Option<&str> {
    let marker = "\"captionTracks\":";
    let start = html.find(marker)? + marker.len();
    let rest = &html[start..];
    let open = rest.find('[')?;

    let bytes = rest.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[open..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Pick the track to use: English first, then any generated track, then whatever is left
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code == "en" || t.language_code == "en-US")
        .or_else(|| tracks.iter().find(|t| t.kind.as_deref() == Some("asr")))
        .or_else(|| tracks.first())
}

/// Join the `<text>` segments of a timedtext document into one transcript string
pub fn parse_caption_xml(xml: &str) -> String {
    let mut segments = Vec::new();

    for capture in CAPTION_TEXT_PATTERN.captures_iter(xml) {
        // A raw '<' means an unclosed element swallowed the next tag
        if capture[1].contains('<') {
            continue;
        }
        let decoded = html_escape::decode_html_entities(&capture[1]);
        // Caption payloads are double-escaped ("&amp;#39;")
        let decoded = html_escape::decode_html_entities(decoded.as_ref());
        let cleaned = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
        if !cleaned.is_empty() {
            segments.push(cleaned);
        }
    }

    segments.join(" ")
}
