use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE};
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;

use super::parser::parse_timed_text;
use super::{ProviderError, Segment, TrackInfo, TranscriptProvider};
use crate::config::TranscriptSettings;
use crate::resolver::VideoReference;

const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";
const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";

fn innertube_key_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid API key regex")
    })
}

fn consent_value_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"name="v" value="(.*?)""#).expect("valid consent regex"))
}

/// Transcript provider that reads caption tracks straight from YouTube
pub struct YoutubeTranscriptProvider {
    client: reqwest::Client,
    timeout: Duration,
}

impl YoutubeTranscriptProvider {
    pub fn new(settings: &TranscriptSettings) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        let accept_language = HeaderValue::from_str(&settings.accept_language)
            .map_err(|e| ProviderError::Http(format!("invalid Accept-Language header: {}", e)))?;
        headers.insert(ACCEPT_LANGUAGE, accept_language);

        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    async fn fetch_watch_page(&self, video: &VideoReference) -> Result<String, ProviderError> {
        let url = video.watch_url();
        tracing::debug!("Fetching watch page: {}", url);

        let html = self.get_page(&url, video, None).await?;
        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        // EU visitors get a consent form instead of the player page
        let cookie = consent_cookie(&html, video)?;
        tracing::debug!("Accepting cookie consent for {}", video);

        let html = self.get_page(&url, video, Some(&cookie)).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(ProviderError::ConsentRequired(video.to_string()));
        }
        Ok(html)
    }

    async fn get_page(
        &self,
        url: &str,
        video: &VideoReference,
        cookie: Option<&str>,
    ) -> Result<String, ProviderError> {
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        check_status(&response, video)?;

        response.text().await.map_err(|e| self.transport_error(e))
    }

    async fn fetch_player_data(
        &self,
        video: &VideoReference,
        api_key: &str,
    ) -> Result<Value, ProviderError> {
        let url = format!("{}?key={}", INNERTUBE_PLAYER_URL, urlencoding::encode(api_key));
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video.as_str(),
        });

        tracing::debug!("Requesting InnerTube player data for {}", video);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        check_status(&response, video)?;

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Unparsable(format!("InnerTube response: {}", e)))
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout.as_secs())
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptProvider {
    async fn list_transcripts(&self, video: &VideoReference) -> Result<Vec<TrackInfo>, ProviderError> {
        let html = self.fetch_watch_page(video).await?;
        let api_key = extract_innertube_api_key(&html, video)?;
        let player = self.fetch_player_data(video, &api_key).await?;
        extract_caption_tracks(&player, video)
    }

    async fn fetch_track(&self, track: &TrackInfo) -> Result<Vec<Segment>, ProviderError> {
        if track.base_url.contains("&exp=xpe") {
            return Err(ProviderError::PoTokenRequired(track.language_code.clone()));
        }

        tracing::debug!("Fetching {} timed text", track.language_code);

        let response = self
            .client
            .get(&track.base_url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match response.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(ProviderError::RequestBlocked(track.language_code.clone()))
            }
            reqwest::StatusCode::NOT_FOUND => {
                return Err(ProviderError::NoTranscriptFound(track.language_code.clone()))
            }
            _ => {}
        }
        if !response.status().is_success() {
            return Err(ProviderError::Http(format!(
                "timed text request returned HTTP {}",
                response.status()
            )));
        }

        let xml = response.text().await.map_err(|e| self.transport_error(e))?;
        parse_timed_text(&xml)
    }
}

fn check_status(response: &reqwest::Response, video: &VideoReference) -> Result<(), ProviderError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RequestBlocked(video.to_string()));
    }
    if !status.is_success() {
        return Err(ProviderError::Http(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        )));
    }
    Ok(())
}

fn extract_innertube_api_key(html: &str, video: &VideoReference) -> Result<String, ProviderError> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(ProviderError::RequestBlocked(video.to_string()));
    }

    innertube_key_pattern()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ProviderError::Unparsable(format!("no InnerTube API key on watch page of {}", video))
        })
}

/// Cookie header that accepts the consent form found in `html`
fn consent_cookie(html: &str, video: &VideoReference) -> Result<String, ProviderError> {
    consent_value_pattern()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("CONSENT=YES+{}", m.as_str()))
        .ok_or_else(|| ProviderError::ConsentRequired(video.to_string()))
}

fn assert_playability(player: &Value, video: &VideoReference) -> Result<(), ProviderError> {
    let Some(playability) = player.get("playabilityStatus") else {
        return Ok(());
    };

    let status = playability["status"].as_str().unwrap_or("");
    if status == "OK" {
        return Ok(());
    }

    let reason = playability["reason"].as_str().unwrap_or("");
    match status {
        "LOGIN_REQUIRED" if reason.contains("not a bot") => {
            Err(ProviderError::RequestBlocked(video.to_string()))
        }
        "LOGIN_REQUIRED" if reason.contains("inappropriate") => {
            Err(ProviderError::AgeRestricted(video.to_string()))
        }
        "ERROR" if reason.contains("unavailable") => {
            Err(ProviderError::VideoUnavailable(video.to_string()))
        }
        _ => Err(ProviderError::VideoUnplayable(
            video.to_string(),
            reason.to_string(),
        )),
    }
}

fn extract_caption_tracks(player: &Value, video: &VideoReference) -> Result<Vec<TrackInfo>, ProviderError> {
    assert_playability(player, video)?;

    let Some(renderer) = player
        .get("captions")
        .and_then(|c| c.get("playerCaptionsTracklistRenderer"))
    else {
        return Err(ProviderError::TranscriptsDisabled(video.to_string()));
    };

    let tracks: Vec<TrackInfo> = renderer["captionTracks"]
        .as_array()
        .map(|tracks| tracks.iter().filter_map(track_from_json).collect())
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(ProviderError::TranscriptsDisabled(video.to_string()));
    }

    Ok(tracks)
}

fn track_from_json(caption: &Value) -> Option<TrackInfo> {
    let language_code = caption["languageCode"].as_str()?.to_string();
    let base_url = caption["baseUrl"].as_str()?.replace("&fmt=srv3", "");

    let language_name = caption["name"]["runs"][0]["text"]
        .as_str()
        .or_else(|| caption["name"]["simpleText"].as_str())
        .unwrap_or(&language_code)
        .to_string();

    Some(TrackInfo {
        is_generated: caption["kind"].as_str() == Some("asr"),
        language_code,
        language_name,
        base_url,
    })
}
