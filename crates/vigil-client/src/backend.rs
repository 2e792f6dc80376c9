//! HTTP access to the recognition backend.

use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;
use vigil_core::protocol::{
    CaptureResponse, LogsResponse, OutcomeResponse, ReloadResponse, SaveResponse, StartResponse,
    StatusResponse, ToggleResponse,
};

const TOGGLE_RECOGNITION: &str = "/api/toggle_recognition";
const RELOAD_FACES: &str = "/api/reload_faces";
const STATUS: &str = "/api/status";
const LOGS: &str = "/api/logs";
const TEST_HOMEASSISTANT: &str = "/api/test_homeassistant";
const START_REGISTRATION: &str = "/api/start_registration";
const AUTO_CAPTURE: &str = "/api/auto_capture";
const CANCEL_REGISTRATION: &str = "/api/cancel_registration";
const SAVE_REGISTRATION: &str = "/api/save_registration";
const REGISTRATION_FEED: &str = "/registration_feed";
const VIDEO_FEED: &str = "/video_feed";

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        source: reqwest::Error,
    },
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        source: serde_json::Error,
    },
}

/// Handle to the backend REST API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Backend {
    http: reqwest::Client,
    base: Url,
}

impl Backend {
    pub fn new(base: &str) -> Result<Self, BackendError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(base)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Enable or disable recognition; the server returns the new state.
    pub async fn toggle_recognition(&self) -> Result<ToggleResponse, BackendError> {
        self.post(TOGGLE_RECOGNITION).await
    }

    /// Reload the face database from disk.
    pub async fn reload_faces(&self) -> Result<ReloadResponse, BackendError> {
        self.post(RELOAD_FACES).await
    }

    pub async fn status(&self) -> Result<StatusResponse, BackendError> {
        self.get(STATUS).await
    }

    pub async fn logs(&self) -> Result<LogsResponse, BackendError> {
        self.get(LOGS).await
    }

    /// Ask the backend to exercise its Home Assistant integration.
    pub async fn test_home_assistant(&self) -> Result<OutcomeResponse, BackendError> {
        self.post(TEST_HOMEASSISTANT).await
    }

    /// Open a registration session for `name`.
    pub async fn start_registration(&self, name: &str) -> Result<StartResponse, BackendError> {
        let url = self.base.join(START_REGISTRATION)?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: START_REGISTRATION,
                source,
            })?;
        Self::decode(START_REGISTRATION, response).await
    }

    /// Request one capture attempt. The server validates that exactly one
    /// face is visible and reports the session's running count.
    pub async fn capture(&self) -> Result<CaptureResponse, BackendError> {
        self.post(AUTO_CAPTURE).await
    }

    pub async fn cancel_registration(&self) -> Result<OutcomeResponse, BackendError> {
        self.post(CANCEL_REGISTRATION).await
    }

    pub async fn save_registration(&self) -> Result<SaveResponse, BackendError> {
        self.post(SAVE_REGISTRATION).await
    }

    /// MJPEG preview for a registration session. Carries a cache-busting
    /// millisecond timestamp as the bare query string.
    pub fn registration_feed_url(&self) -> Result<Url, BackendError> {
        let mut url = self.base.join(REGISTRATION_FEED)?;
        url.set_query(Some(&chrono::Utc::now().timestamp_millis().to_string()));
        Ok(url)
    }

    /// MJPEG stream the dashboard page embeds.
    pub fn video_feed_url(&self) -> Result<Url, BackendError> {
        Ok(self.base.join(VIDEO_FEED)?)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, BackendError> {
        let url = self.base.join(endpoint)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| BackendError::Transport { endpoint, source })?;
        Self::decode(endpoint, response).await
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, BackendError> {
        let url = self.base.join(endpoint)?;
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|source| BackendError::Transport { endpoint, source })?;
        Self::decode(endpoint, response).await
    }

    /// Decode the JSON body without consulting the HTTP status: the backend
    /// pairs domain failures with 4xx statuses but still describes them in
    /// the body.
    async fn decode<T: DeserializeOwned>(
        endpoint: &'static str,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| BackendError::Transport { endpoint, source })?;
        if !status.is_success() {
            tracing::debug!(endpoint, %status, "backend reported failure status");
        }
        serde_json::from_str(&body).map_err(|source| BackendError::Decode { endpoint, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve one canned HTTP response on a loopback listener; the request
    /// (head plus body) is forwarded on the returned channel.
    fn serve_once(response: String) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let request = read_request(&mut stream);
                let _ = tx.send(request);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{addr}"), rx)
    }

    /// Read the request head and, when Content-Length says so, the body.
    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap_or(0);
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            let Some(head_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let body_len = text
                .lines()
                .find_map(|line| {
                    line.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .map(str::to_string)
                })
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= head_end + 4 + body_len {
                break;
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn json_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn test_toggle_decodes_payload() {
        let body = r#"{"active": true, "message": "Reconnaissance activée"}"#;
        let (base, requests) = serve_once(json_response("200 OK", body));

        let backend = Backend::new(&base).unwrap();
        let toggled = backend.toggle_recognition().await.unwrap();
        assert!(toggled.active);
        assert_eq!(toggled.message, "Reconnaissance activée");

        let request = requests.recv().unwrap();
        assert!(request.starts_with("POST /api/toggle_recognition"));
    }

    #[tokio::test]
    async fn test_domain_failure_body_decoded_despite_400() {
        let body = r#"{"success": false, "message": "Un seul visage requis"}"#;
        let (base, _requests) = serve_once(json_response("400 BAD REQUEST", body));

        let backend = Backend::new(&base).unwrap();
        let capture = backend.capture().await.unwrap();
        assert!(!capture.success);
        assert_eq!(capture.message.as_deref(), Some("Un seul visage requis"));
    }

    #[tokio::test]
    async fn test_start_registration_posts_name() {
        let body = r#"{"success": true, "message": "started", "total_needed": 5}"#;
        let (base, requests) = serve_once(json_response("200 OK", body));

        let backend = Backend::new(&base).unwrap();
        let started = backend.start_registration("Alice").await.unwrap();
        assert!(started.success);
        assert_eq!(started.total_needed, Some(5));

        let request = requests.recv().unwrap();
        assert!(request.starts_with("POST /api/start_registration"));
        assert!(request.ends_with(r#"{"name":"Alice"}"#));
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_decode_error() {
        let (base, _requests) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\nConnection: close\r\n\r\n<html></html>"
                .to_string(),
        );

        let backend = Backend::new(&base).unwrap();
        let error = backend.status().await.unwrap_err();
        assert!(matches!(
            error,
            BackendError::Decode {
                endpoint: "/api/status",
                ..
            }
        ));
    }

    #[test]
    fn test_feed_urls() {
        let backend = Backend::new("http://127.0.0.1:5000").unwrap();

        let video = backend.video_feed_url().unwrap();
        assert_eq!(video.path(), "/video_feed");

        let feed = backend.registration_feed_url().unwrap();
        assert_eq!(feed.path(), "/registration_feed");
        // Cache-busting query is a bare millisecond timestamp.
        let query = feed.query().unwrap();
        assert!(query.parse::<i64>().is_ok());
    }
}
