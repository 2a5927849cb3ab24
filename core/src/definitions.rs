// Copyright 2025 HEM Sp. z o.o.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

/// Platform device id of a TV source (tuner, AV, HDMI1..HDMI4, ...).
pub type DeviceId = i32;

/// Per-tune-session identifier handed out by the platform.
pub type SessionId = i32;

/// CEC logical address (0..=15).
pub type LogicalAddress = u8;

/// Physical HDMI input number used by port select.
pub type PortId = i32;

/// Platform key code forwarded to the CEC client.
pub type KeyCode = i32;

/// Logical address of the TV itself; selecting it routes back to the internal tuner.
pub const ADDR_INTERNAL: LogicalAddress = 0;

/// First and last device ids of the HDMI source block.
pub const DEVICE_ID_HDMI1: DeviceId = 5;
pub const DEVICE_ID_HDMI2: DeviceId = 6;
pub const DEVICE_ID_HDMI3: DeviceId = 7;
pub const DEVICE_ID_HDMI4: DeviceId = 8;

/// Time during which a fresh select is protected from a fallback to internal.
pub const DEVICE_SELECT_PROTECTION_TIME_MS: u64 = 1500;

/// Global setting toggling CEC control on the whole device.
pub const HDMI_CONTROL_ENABLED: &str = "hdmi_control_enabled";

/// Value of an enabled boolean setting.
pub const ENABLED: i32 = 1;

pub const KEYCODE_MEDIA_PLAY_PAUSE: KeyCode = 85;
pub const KEYCODE_MEDIA_PLAY: KeyCode = 126;
pub const KEYCODE_MEDIA_PAUSE: KeyCode = 127;

/// Completion code reported by the CEC client for a device/port select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectResult {
    Success,
    Timeout,
    SourceNotAvailable,
    TargetNotAvailable,
    AlreadyInProgress,
    Exception,
    IncorrectMode,
    CommunicationFailed,
    /// A code this host does not know about.
    Unknown(i32),
}

impl SelectResult {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::Timeout,
            2 => Self::SourceNotAvailable,
            3 => Self::TargetNotAvailable,
            4 => Self::AlreadyInProgress,
            5 => Self::Exception,
            6 => Self::IncorrectMode,
            7 => Self::CommunicationFailed,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Timeout => 1,
            Self::SourceNotAvailable => 2,
            Self::TargetNotAvailable => 3,
            Self::AlreadyInProgress => 4,
            Self::Exception => 5,
            Self::IncorrectMode => 6,
            Self::CommunicationFailed => 7,
            Self::Unknown(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for SelectResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Timeout => write!(f, "timeout"),
            Self::SourceNotAvailable => write!(f, "source not available"),
            Self::TargetNotAvailable => write!(f, "target not available"),
            Self::AlreadyInProgress => write!(f, "already in progress"),
            Self::Exception => write!(f, "exception"),
            Self::IncorrectMode => write!(f, "incorrect mode"),
            Self::CommunicationFailed => write!(f, "communication failed"),
            Self::Unknown(code) => write!(f, "unknown result {}", code),
        }
    }
}
