use serde::{Deserialize, Serialize};

use super::{ConsoleError, TransportOutcome};

/// Firmware image picked by the user. The bytes stay with the shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirmwareFile {
    pub name: String,
    pub size: u64,
}

/// Upload lifecycle
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    Selected,
    Uploading {
        session: u32,
    },
    Done,
    Failed {
        reason: String,
    },
}

/// Enabled flags of the select/upload/reset buttons
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadControls {
    pub select: bool,
    pub upload: bool,
    pub reset: bool,
}

impl Default for UploadControls {
    fn default() -> Self {
        Self {
            select: true,
            upload: false,
            reset: false,
        }
    }
}

impl UploadControls {
    fn set_all(&mut self, enabled: bool) {
        self.select = enabled;
        self.upload = enabled;
        self.reset = enabled;
    }
}

/// Firmware upload state machine.
///
/// `Idle -> Selected -> Uploading -> Done | Failed`. At most one session is
/// uploading at a time; requests that do not fit the current state are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadController {
    pub state: UploadState,
    pub file: Option<FirmwareFile>,
    /// Percent complete of the current or last session.
    pub progress: u8,
    pub controls: UploadControls,
    last_session: u32,
}

impl UploadController {
    /// Take the result of a file pick. Only a pick of exactly one file while
    /// selection is enabled moves to `Selected`.
    pub fn select(&mut self, mut files: Vec<FirmwareFile>) -> bool {
        if !self.controls.select || files.len() != 1 {
            return false;
        }

        self.file = files.pop();
        self.progress = 0;
        self.state = UploadState::Selected;
        self.controls.upload = true;
        true
    }

    /// Start a new session for the selected file and lock all controls.
    pub fn begin(&mut self) -> Option<(u32, &FirmwareFile)> {
        if !self.controls.upload || self.is_uploading() {
            return None;
        }
        let file = self.file.as_ref()?;

        self.last_session = self.last_session.wrapping_add(1);
        self.state = UploadState::Uploading {
            session: self.last_session,
        };
        self.progress = 0;
        self.controls.set_all(false);
        Some((self.last_session, file))
    }

    pub fn active_session(&self) -> Option<u32> {
        match self.state {
            UploadState::Uploading { session } => Some(session),
            _ => None,
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.active_session().is_some()
    }

    /// Record transfer progress. Returns true when the displayed percentage
    /// changed; it never goes down within a session.
    pub fn report_progress(&mut self, session: u32, loaded: u64, total: u64) -> bool {
        if self.active_session() != Some(session) || total == 0 {
            return false;
        }

        let percent = (loaded.min(total).saturating_mul(100) / total) as u8;
        if percent <= self.progress {
            return false;
        }
        self.progress = percent;
        true
    }

    /// Close the session with the transport's verdict and unlock all
    /// controls. Returns `None` for outcomes of a session that is no longer
    /// active.
    pub fn finish(
        &mut self,
        session: u32,
        outcome: TransportOutcome,
    ) -> Option<Result<String, ConsoleError>> {
        if self.active_session() != Some(session) {
            return None;
        }

        let result = outcome.into_result();
        self.state = match &result {
            Ok(_) => {
                self.progress = 100;
                UploadState::Done
            }
            Err(e) => UploadState::Failed {
                reason: e.to_string(),
            },
        };
        self.controls.set_all(true);
        Some(result)
    }

    /// `"<name>, size: <n> bytes"` for the selected file.
    pub fn file_label(&self) -> Option<String> {
        self.file
            .as_ref()
            .map(|f| format!("{}, size: {} bytes", f.name, f.size))
    }
}
