//! Dashboard view state: a local mirror of the backend status, refreshed
//! by the poll loops and by direct operation responses.

use chrono::NaiveDateTime;

use crate::protocol::{LogsResponse, StatusResponse, ToggleResponse};

/// Backend timestamps are naive local ISO-8601, with or without
/// fractional seconds.
const BACKEND_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A recognition event as reported by the status endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub name: String,
    pub confidence: f64,
    /// Raw backend timestamp, kept verbatim for change detection.
    pub timestamp: Option<String>,
}

impl Recognition {
    /// Confidence rendered as a percentage, one decimal.
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }

    /// Timestamp rendered as `dd/mm/YYYY HH:MM:SS`, if it parses.
    pub fn timestamp_display(&self) -> Option<String> {
        let raw = self.timestamp.as_deref()?;
        let parsed = NaiveDateTime::parse_from_str(raw, BACKEND_TIMESTAMP_FORMAT).ok()?;
        Some(parsed.format("%d/%m/%Y %H:%M:%S").to_string())
    }
}

/// Local mirror of the dashboard, fully server-driven.
#[derive(Debug, Default)]
pub struct DashboardState {
    recognition_active: bool,
    known_faces: u32,
    last_recognition: Option<Recognition>,
    /// Newest-first log lines, replaced wholesale by each non-empty poll.
    logs: Vec<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recognition_active(&self) -> bool {
        self.recognition_active
    }

    pub fn known_faces(&self) -> u32 {
        self.known_faces
    }

    pub fn last_recognition(&self) -> Option<&Recognition> {
        self.last_recognition.as_ref()
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Adopt the server-returned active flag after a toggle.
    pub fn apply_toggle(&mut self, response: &ToggleResponse) {
        self.recognition_active = response.active;
    }

    /// Adopt a status snapshot. Returns the recognition when it differs
    /// from the previously displayed one, so the caller can announce it.
    pub fn apply_status(&mut self, response: &StatusResponse) -> Option<Recognition> {
        self.recognition_active = response.recognition_active;
        self.known_faces = response.known_faces_count;

        let name = response.last_recognition.name.clone()?;
        let recognition = Recognition {
            name,
            confidence: response.last_recognition.confidence,
            timestamp: response.last_recognition.timestamp.clone(),
        };
        let changed = self.last_recognition.as_ref() != Some(&recognition);
        self.last_recognition = Some(recognition.clone());
        changed.then_some(recognition)
    }

    /// Replace the log buffer, newest line first. An empty or failed poll
    /// keeps the previous buffer. Returns the backend error text, if any.
    pub fn apply_logs(&mut self, response: LogsResponse) -> Option<String> {
        if response.error.is_some() {
            return response.error;
        }
        if !response.logs.is_empty() {
            self.logs = response
                .logs
                .into_iter()
                .rev()
                .map(|line| line.trim_end().to_string())
                .collect();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::LastRecognition;

    fn status(active: bool, count: u32, last: LastRecognition) -> StatusResponse {
        StatusResponse {
            recognition_active: active,
            known_faces_count: count,
            last_recognition: last,
        }
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut state = DashboardState::new();
        let initial = state.recognition_active();

        state.apply_toggle(&ToggleResponse {
            active: !initial,
            message: "on".into(),
        });
        state.apply_toggle(&ToggleResponse {
            active: initial,
            message: "off".into(),
        });
        assert_eq!(state.recognition_active(), initial);
    }

    #[test]
    fn test_status_without_recognition_announces_nothing() {
        let mut state = DashboardState::new();
        let announced = state.apply_status(&status(true, 2, LastRecognition::default()));
        assert!(announced.is_none());
        assert!(state.recognition_active());
        assert_eq!(state.known_faces(), 2);
        assert!(state.last_recognition().is_none());
    }

    #[test]
    fn test_status_announces_each_new_recognition_once() {
        let mut state = DashboardState::new();
        let seen = LastRecognition {
            name: Some("Alice".into()),
            confidence: 0.873,
            timestamp: Some("2025-11-02T14:30:12.123456".into()),
        };

        let first = state.apply_status(&status(true, 2, seen.clone()));
        assert_eq!(first.map(|r| r.name), Some("Alice".into()));

        // Same recognition on the next poll: no announcement.
        assert!(state.apply_status(&status(true, 2, seen)).is_none());

        // A later sighting of the same person announces again.
        let later = LastRecognition {
            name: Some("Alice".into()),
            confidence: 0.910,
            timestamp: Some("2025-11-02T14:31:02.000001".into()),
        };
        assert!(state.apply_status(&status(true, 2, later)).is_some());
    }

    #[test]
    fn test_recognition_display_formats() {
        let recognition = Recognition {
            name: "Alice".into(),
            confidence: 0.873,
            timestamp: Some("2025-11-02T14:30:12.123456".into()),
        };
        assert_eq!(recognition.confidence_percent(), "87.3%");
        assert_eq!(
            recognition.timestamp_display().as_deref(),
            Some("02/11/2025 14:30:12")
        );

        let bare = Recognition {
            name: "Alice".into(),
            confidence: 0.5,
            timestamp: Some("2025-11-02T14:30:12".into()),
        };
        assert_eq!(
            bare.timestamp_display().as_deref(),
            Some("02/11/2025 14:30:12")
        );
    }

    #[test]
    fn test_logs_replaced_newest_first() {
        let mut state = DashboardState::new();
        let error = state.apply_logs(LogsResponse {
            logs: vec!["first\n".into(), "second\n".into()],
            error: None,
        });
        assert!(error.is_none());
        assert_eq!(state.logs(), ["second", "first"]);
    }

    #[test]
    fn test_empty_or_failed_log_poll_keeps_buffer() {
        let mut state = DashboardState::new();
        assert!(state
            .apply_logs(LogsResponse {
                logs: vec!["only\n".into()],
                error: None,
            })
            .is_none());

        assert!(state.apply_logs(LogsResponse::default()).is_none());
        assert_eq!(state.logs(), ["only"]);

        let error = state.apply_logs(LogsResponse {
            logs: Vec::new(),
            error: Some("log file unreadable".into()),
        });
        assert_eq!(error.as_deref(), Some("log file unreadable"));
        assert_eq!(state.logs(), ["only"]);
    }
}
