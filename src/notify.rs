use std::fmt;
use std::sync::Mutex;

use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Shows transient notices. Implemented by the embedding UI.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Pages the form can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Attendance { session_id: i64 },
    PastSessions { class_id: i64 },
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Attendance { session_id } => write!(f, "/attendance/{session_id}"),
            Route::PastSessions { class_id } => write!(f, "/classes/past-sessions/{class_id}"),
        }
    }
}

pub trait Navigator: Send + Sync {
    fn push(&self, route: Route);
    /// Reloads the page so server-derived data (sessions) is fetched again.
    fn reload(&self);
}

/// Writes notices to the log. Useful when there is no UI attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => error!(%message, "notice"),
            NoticeLevel::Success | NoticeLevel::Info => info!(%message, "notice"),
        }
    }
}

/// Keeps every notice and navigation in memory, in order.
#[derive(Debug, Default)]
pub struct Recorder {
    notices: Mutex<Vec<Notice>>,
    routes: Mutex<Vec<Route>>,
    reloads: Mutex<usize>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notices.lock().ok()?.last().cloned()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.lock().map(|r| *r).unwrap_or_default()
    }
}

impl Notifier for Recorder {
    fn notify(&self, level: NoticeLevel, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(Notice {
                level,
                message: message.to_string(),
            });
        }
    }
}

impl Navigator for Recorder {
    fn push(&self, route: Route) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }

    fn reload(&self) {
        if let Ok(mut reloads) = self.reloads.lock() {
            *reloads += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_render_paths() {
        assert_eq!(Route::Attendance { session_id: 41 }.to_string(), "/attendance/41");
        assert_eq!(
            Route::PastSessions { class_id: 7 }.to_string(),
            "/classes/past-sessions/7"
        );
    }

    #[test]
    fn test_recorder_keeps_order() {
        let recorder = Recorder::new();
        recorder.notify(NoticeLevel::Info, "one");
        recorder.notify(NoticeLevel::Error, "two");
        recorder.reload();
        assert_eq!(recorder.notices().len(), 2);
        assert_eq!(recorder.last_notice().unwrap().message, "two");
        assert_eq!(recorder.reloads(), 1);
    }
}
