use serde::{Deserialize, Serialize};

use crate::commands::firmware::FirmwareOutput;
use crate::types::*;

/// Events that can happen in the app
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Event {
    /// Page load: fetch device info and configuration, start polling
    Initialize,

    /// Location fragment changed
    Navigate {
        token: String,
    },

    Device(DeviceEvent),
    Config(ConfigEvent),
    Firmware(FirmwareEvent),
    Poll(PollEvent),
    Ui(UiEvent),
}

/// Board identity and device commands
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    LoadInfo,
    SendCommand {
        command: DeviceCommand,
        data_hex: String,
    },
    ResetBoard,

    #[serde(skip)]
    InfoResponse(TransportOutcome),
    #[serde(skip)]
    CommandResponse(TransportOutcome),
    #[serde(skip)]
    ResetResponse(TransportOutcome),
}

/// Configuration form and round-trip
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    Reload,
    FieldChanged {
        key: ConfigKey,
        value: String,
    },
    TogglePasswordVisibility {
        key: ConfigKey,
    },
    Save,

    #[serde(skip)]
    LoadResponse(TransportOutcome),
    #[serde(skip)]
    SaveResponse(TransportOutcome),
}

/// Firmware selection and upload
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum FirmwareEvent {
    FilesPicked {
        files: Vec<FirmwareFile>,
    },
    StartUpload,
    Abort,

    #[serde(skip)]
    Transfer {
        session: u32,
        output: FirmwareOutput,
    },
}

/// Background status polling
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Start,
    Stop,

    #[serde(skip)]
    Elapsed {
        timer: u64,
    },
    #[serde(skip)]
    StatusResponse {
        tick: u64,
        outcome: TransportOutcome,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ClearLog,
}
