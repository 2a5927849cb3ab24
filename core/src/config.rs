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

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::Deserialize;

use crate::definitions::{
    DeviceId, DEVICE_ID_HDMI1, DEVICE_ID_HDMI4, DEVICE_SELECT_PROTECTION_TIME_MS,
};
use crate::error::CecError;

/// Tunables of the selection state machine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CecConfig {
    /// How long a fresh device/port select suppresses the fallback to internal.
    pub protection_window_ms: u64,
    /// Delay before a fallback device select to the internal address is sent.
    pub internal_fallback_delay_ms: u64,
    pub hdmi_device_id_first: DeviceId,
    pub hdmi_device_id_last: DeviceId,
}

impl Default for CecConfig {
    fn default() -> Self {
        Self {
            protection_window_ms: DEVICE_SELECT_PROTECTION_TIME_MS,
            internal_fallback_delay_ms: DEVICE_SELECT_PROTECTION_TIME_MS,
            hdmi_device_id_first: DEVICE_ID_HDMI1,
            hdmi_device_id_last: DEVICE_ID_HDMI4,
        }
    }
}

impl CecConfig {
    pub fn protection_window(&self) -> Duration {
        Duration::from_millis(self.protection_window_ms)
    }

    pub fn internal_fallback_delay(&self) -> Duration {
        Duration::from_millis(self.internal_fallback_delay_ms)
    }

    pub fn hdmi_device_ids(&self) -> RangeInclusive<DeviceId> {
        self.hdmi_device_id_first..=self.hdmi_device_id_last
    }

    pub fn is_hdmi_device_id(&self, device_id: DeviceId) -> bool {
        self.hdmi_device_ids().contains(&device_id)
    }

    pub fn validate(&self) -> Result<(), CecError> {
        if self.hdmi_device_id_first > self.hdmi_device_id_last {
            return Err(CecError::Config(format!(
                "HDMI device id range {}..={} is empty",
                self.hdmi_device_id_first, self.hdmi_device_id_last
            )));
        }
        if self.protection_window_ms == 0 {
            return Err(CecError::Config("protection window must be non-zero".to_string()));
        }
        Ok(())
    }
}
