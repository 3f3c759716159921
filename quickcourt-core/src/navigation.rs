use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Receives route changes requested by the booking flow
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Profile route with a cache-busting timestamp so bookings are refetched
pub fn profile_refresh_path(now: DateTime<Utc>) -> String {
    format!("/profile?refresh={}", now.timestamp_millis())
}

/// Keeps every requested path
#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path.to_string());
        }
    }
}
