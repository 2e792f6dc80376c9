//! Serde mirrors of the backend REST payloads.
//!
//! The backend reports domain failures inside the JSON body, frequently
//! alongside a 4xx status, so most response types carry a `success` flag
//! plus whichever fields the success path fills in. Fields absent on the
//! failure path default.

use serde::Deserialize;

/// `POST /api/toggle_recognition`
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleResponse {
    pub active: bool,
    pub message: String,
}

/// `POST /api/reload_faces`
#[derive(Debug, Clone, Deserialize)]
pub struct ReloadResponse {
    pub success: bool,
    #[serde(default)]
    pub count: u32,
    pub message: String,
}

/// The `last_recognition` record inside a status payload. All fields are
/// null until the backend has recognized someone at least once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LastRecognition {
    pub name: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    pub timestamp: Option<String>,
}

/// `GET /api/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub recognition_active: bool,
    pub known_faces_count: u32,
    #[serde(default)]
    pub last_recognition: LastRecognition,
}

/// `GET /api/logs` — either a list of log lines or an error string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/test_homeassistant` and `POST /api/cancel_registration`
#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeResponse {
    pub success: bool,
    pub message: String,
}

/// `POST /api/start_registration`
#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub total_needed: Option<u32>,
}

/// `POST /api/auto_capture` — the success path carries counters and no
/// message; the failure path carries a message and no counters.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureResponse {
    pub success: bool,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/save_registration`
#[derive(Debug, Clone, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub filename: Option<String>,
}
