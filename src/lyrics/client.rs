//! Genius API client
//!
//! Search goes through the authenticated REST API (`GET /search?q=`);
//! lyrics are scraped from the public song page the hit points to.
//!
//! HTTP support is behind the `genius` feature. Without it the client
//! reports itself unavailable instead of failing at link time, so the
//! tool can still distinguish "cannot fetch lyrics" from other errors.

use log::debug;
use serde::Deserialize;

use crate::config::GeniusConfig;
use crate::error::{Result, TrackscanError};
use crate::lyrics::html::{extract_lyrics, remove_section_headers};
use crate::lyrics::{LyricsSource, SongHit};

/// Body of a `/search` response; only the hit list is used
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    response: Option<SearchBody>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Option<Vec<SearchHit>>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    result: SongHit,
}

/// Parse a `/search` response body into its hits.
///
/// A missing `response` or `hits` field yields no hits.
pub fn parse_search_response(endpoint: &str, body: &str) -> Result<Vec<SongHit>> {
    let envelope: SearchEnvelope =
        serde_json::from_str(body).map_err(|e| TrackscanError::UnexpectedResponse {
            endpoint: endpoint.to_string(),
            reason: format!("invalid search JSON: {}", e),
        })?;

    Ok(envelope
        .response
        .and_then(|body| body.hits)
        .unwrap_or_default()
        .into_iter()
        .map(|hit| hit.result)
        .collect())
}

/// Status and body of a completed request
#[derive(Debug)]
struct HttpResponse {
    status: u16,
    body: String,
}

/// Client for the Genius API and song pages
pub struct GeniusClient {
    config: GeniusConfig,
    #[cfg(feature = "genius")]
    http: reqwest::blocking::Client,
}

impl std::fmt::Debug for GeniusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeniusClient")
            .field("api_url", &self.config.api_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl GeniusClient {
    /// Build a client from the given config
    #[cfg(feature = "genius")]
    pub fn new(config: GeniusConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("trackscan/", env!("CARGO_PKG_VERSION")));

        // reqwest's blocking client defaults to a 30s timeout; none unless configured
        builder = builder.timeout(config.timeout);

        let http = builder.build().map_err(|e| TrackscanError::Http {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self { config, http })
    }

    /// Build a client from the given config
    #[cfg(not(feature = "genius"))]
    pub fn new(_config: GeniusConfig) -> Result<Self> {
        Err(TrackscanError::LyricsUnavailable {
            reason: "built without the `genius` feature (rebuild with --features genius)"
                .to_string(),
        })
    }

    pub fn config(&self) -> &GeniusConfig {
        &self.config
    }

    #[cfg(feature = "genius")]
    fn get(&self, url: &str, query: Option<(&str, &str)>, authorized: bool) -> Result<HttpResponse> {
        let mut request = self.http.get(url);
        if let Some((key, value)) = query {
            request = request.query(&[(key, value)]);
        }
        if authorized {
            request = request.bearer_auth(&self.config.access_token);
        }

        let response = request.send().map_err(|e| TrackscanError::Http {
            message: if e.is_timeout() {
                format!("request to {} timed out", url)
            } else {
                e.to_string()
            },
        })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| TrackscanError::Http {
            message: format!("failed to read response from {}: {}", url, e),
        })?;

        Ok(HttpResponse { status, body })
    }

    #[cfg(not(feature = "genius"))]
    fn get(&self, _url: &str, _query: Option<(&str, &str)>, _authorized: bool) -> Result<HttpResponse> {
        Err(TrackscanError::LyricsUnavailable {
            reason: "built without the `genius` feature".to_string(),
        })
    }
}

impl LyricsSource for GeniusClient {
    fn search_songs(&self, query: &str) -> Result<Vec<SongHit>> {
        let endpoint = format!("{}/search", self.config.api_url);
        debug!("Searching Genius for '{}'", query);

        let response = self.get(&endpoint, Some(("q", query)), true)?;
        if !(200..300).contains(&response.status) {
            return Err(TrackscanError::UnexpectedResponse {
                endpoint,
                reason: format!("HTTP status {}", response.status),
            });
        }

        let hits = parse_search_response(&endpoint, &response.body)?;
        debug!("Genius returned {} hits", hits.len());
        Ok(hits)
    }

    fn fetch_lyrics(&self, song_url: &str) -> Result<Option<String>> {
        debug!("Fetching lyrics page {}", song_url);

        let response = self.get(song_url, None, false)?;
        if response.status == 404 {
            return Ok(None);
        }
        if !(200..300).contains(&response.status) {
            return Err(TrackscanError::UnexpectedResponse {
                endpoint: song_url.to_string(),
                reason: format!("HTTP status {}", response.status),
            });
        }

        let lyrics = extract_lyrics(&response.body).map(|text| {
            if self.config.remove_section_headers {
                remove_section_headers(&text)
            } else {
                text
            }
        });
        Ok(lyrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://api.genius.com/search";

    #[test]
    fn test_parse_hits() {
        let body = r#"{
            "meta": {"status": 200},
            "response": {"hits": [
                {"type": "song", "result": {
                    "url": "https://genius.com/Queen-bohemian-rhapsody-lyrics",
                    "title": "Bohemian Rhapsody",
                    "full_title": "Bohemian Rhapsody by Queen",
                    "primary_artist": {"name": "Queen", "id": 563}
                }},
                {"type": "song", "result": {"url": "https://genius.com/other"}}
            ]}
        }"#;

        let hits = parse_search_response(ENDPOINT, body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://genius.com/Queen-bohemian-rhapsody-lyrics");
        assert_eq!(hits[0].artist_name(), Some("Queen"));
        assert_eq!(hits[1].title, None);
    }

    #[test]
    fn test_empty_or_missing_hits() {
        assert!(parse_search_response(ENDPOINT, r#"{"response": {"hits": []}}"#)
            .unwrap()
            .is_empty());
        assert!(parse_search_response(ENDPOINT, r#"{"response": {}}"#).unwrap().is_empty());
        assert!(parse_search_response(ENDPOINT, r#"{"response": {"hits": null}}"#)
            .unwrap()
            .is_empty());
        assert!(parse_search_response(ENDPOINT, r#"{}"#).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_search_response(ENDPOINT, "<html>rate limited</html>").unwrap_err();
        assert_eq!(err.error_code(), "UNEXPECTED_RESPONSE");
    }

    #[cfg(feature = "genius")]
    #[test]
    fn test_client_builds() {
        let client = GeniusClient::new(GeniusConfig::new("token")).unwrap();
        assert_eq!(client.config().api_url, crate::config::DEFAULT_API_URL);
    }

    #[cfg(not(feature = "genius"))]
    #[test]
    fn test_client_unavailable() {
        let err = GeniusClient::new(GeniusConfig::new("token")).unwrap_err();
        assert_eq!(err.error_code(), "LYRICS_UNAVAILABLE");
    }
}
