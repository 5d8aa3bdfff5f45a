use crate::types::*;

/// Interval between two live status fetches.
pub const STATUS_POLL_INTERVAL_MS: u64 = 2000;

/// State of the periodic status fetch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingState {
    pub active: bool,
    pub interval_ms: u64,
    /// Id of the one timer whose expiry is honored; older timers are stale.
    pub timer_id: u64,
    /// Number of status fetches issued so far.
    pub ticks: u64,
}

impl Default for PollingState {
    fn default() -> Self {
        Self {
            active: false,
            interval_ms: STATUS_POLL_INTERVAL_MS,
            timer_id: 0,
            ticks: 0,
        }
    }
}

/// Application Model - the complete state
///
/// Constructed once by the Core and handed to every handler; there is one
/// store per concern and no other shared state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Model {
    // Router
    pub view: View,

    // Device state
    pub device_info: DeviceInfo,
    pub live_status: LiveStatus,
    pub config: ConfigModel,

    // Firmware upload state
    pub upload: UploadController,

    // Background polling
    pub polling: PollingState,

    // Messages shown to the user
    pub log: ActivityLog,
}

impl Model {
    /// Report a completed operation; the device's response text is the message.
    pub fn log_success(&mut self, action: &str, body: &str) {
        self.log.info(success_message(action, body));
    }

    /// Report a failed operation through the log sink with its own severity.
    pub fn log_failure(&mut self, action: &str, error: &ConsoleError) {
        self.log.push(error.severity(), failure_message(action, error));
    }

    /// Report a finished device request at the severity of its outcome.
    pub fn log_outcome(&mut self, action: &str, outcome: TransportOutcome) {
        let severity = outcome.severity();
        let message = match outcome.into_result() {
            Ok(text) => success_message(action, &text),
            Err(e) => failure_message(action, &e),
        };
        self.log.push(severity, message);
    }

    pub fn is_visible(&self, view: View) -> bool {
        self.view == view
    }
}

fn success_message(action: &str, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("{action} done")
    } else {
        body.to_string()
    }
}

fn failure_message(action: &str, error: &ConsoleError) -> String {
    match error {
        ConsoleError::UserAbort => format!("{action} canceled"),
        ConsoleError::Network(e) => format!("{action} error: {e}"),
        ConsoleError::Http { .. } | ConsoleError::Parse(_) => format!("{action} failed: {error}"),
    }
}
