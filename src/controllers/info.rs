// external song details lookup
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum MusicInfoError {
    #[error("invalid music info url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported music info url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("music info service answered {0}")]
    Status(u16),

    #[error("unparseable release date: {0}")]
    ReleaseDate(String),

    #[error("invalid song link: {0}")]
    InvalidLink(String),
}

/// Response of `GET /info`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongDetail {
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Accepts `16.07.2006` as well as ISO `2006-07-16`.
pub fn parse_release_date(value: &str) -> Result<NaiveDate, MusicInfoError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| MusicInfoError::ReleaseDate(value.to_string()))
}

pub struct MusicInfoClient {
    client: reqwest::Client,
    info_url: url::Url,
}

impl MusicInfoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MusicInfoError> {
        let base = url::Url::parse(base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(MusicInfoError::UnsupportedScheme(base.scheme().to_string()));
        }
        let info_url = base.join(&format!("{}/info", base.path().trim_end_matches('/')))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("song-library/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(3))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, info_url })
    }

    pub fn info_url(&self) -> &str {
        self.info_url.as_str()
    }

    pub async fn fetch(&self, group: &str, song: &str) -> Result<SongDetail, MusicInfoError> {
        let response = self
            .client
            .get(self.info_url.clone())
            .query(&[("group", group), ("song", song)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MusicInfoError::Status(response.status().as_u16()));
        }

        let detail: SongDetail = response.json().await?;
        debug!(
            group,
            song,
            lyrics_len = detail.text.as_deref().map_or(0, str::len),
            "fetched song details"
        );
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn parses_both_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2006, 7, 16).unwrap();
        assert_eq!(parse_release_date("16.07.2006").unwrap(), expected);
        assert_eq!(parse_release_date(" 2006-07-16 ").unwrap(), expected);
        assert!(matches!(
            parse_release_date("July 16th"),
            Err(MusicInfoError::ReleaseDate(_))
        ));
    }

    #[test]
    fn rejects_non_http_urls() {
        let timeout = Duration::from_secs(1);
        assert!(matches!(
            MusicInfoClient::new("ftp://example.com", timeout),
            Err(MusicInfoError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            MusicInfoClient::new("not a url", timeout),
            Err(MusicInfoError::InvalidUrl(_))
        ));
    }

    #[test]
    fn info_url_keeps_base_path() {
        let timeout = Duration::from_secs(1);
        let client = MusicInfoClient::new("http://localhost:9000/api/", timeout).unwrap();
        assert_eq!(client.info_url(), "http://localhost:9000/api/info");
        let client = MusicInfoClient::new("http://localhost:9000", timeout).unwrap();
        assert_eq!(client.info_url(), "http://localhost:9000/info");
    }

    #[tokio::test]
    async fn fetches_song_details() {
        let app = Router::new().route(
            "/info",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("group").map(String::as_str), Some("Muse"));
                assert_eq!(
                    q.get("song").map(String::as_str),
                    Some("Supermassive Black Hole")
                );
                Json(serde_json::json!({
                    "releaseDate": "16.07.2006",
                    "text": "Ooh baby, don't you know I suffer?\n\nOoh",
                    "link": "https://www.youtube.com/watch?v=Xsp3_a-PMTw"
                }))
            }),
        );
        let base = serve(app).await;

        let client = MusicInfoClient::new(&base, Duration::from_secs(5)).unwrap();
        let detail = client.fetch("Muse", "Supermassive Black Hole").await.unwrap();

        assert_eq!(detail.release_date.as_deref(), Some("16.07.2006"));
        assert!(detail.text.unwrap().starts_with("Ooh baby"));
        assert_eq!(
            detail.link.as_deref(),
            Some("https://www.youtube.com/watch?v=Xsp3_a-PMTw")
        );
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let app = Router::new().route("/info", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let base = serve(app).await;

        let client = MusicInfoClient::new(&base, Duration::from_secs(5)).unwrap();
        let result = client.fetch("Muse", "Uprising").await;

        assert!(matches!(result, Err(MusicInfoError::Status(500))));
    }
}
