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

use std::sync::Arc;

use log::{debug, info, trace};

use crate::config::CecConfig;
use crate::definitions::{DeviceId, ENABLED, HDMI_CONTROL_ENABLED};
use crate::platform::SettingsStore;
use crate::selection::SelectionRequest;

/// Last path segment of a settings URI, or the key itself.
pub fn setting_key(uri_or_key: &str) -> &str {
    uri_or_key.rsplit('/').next().unwrap_or(uri_or_key)
}

/// Watches the CEC master switch and repairs routing when it is turned back on.
pub struct SettingsWatcher {
    settings: Arc<dyn SettingsStore>,
}

impl SettingsWatcher {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    pub fn hdmi_control_enabled(&self) -> bool {
        self.settings.get_int(HDMI_CONTROL_ENABLED, ENABLED) == ENABLED
    }

    /// React to a change of `uri_or_key`.
    ///
    /// Returns the selection that has to be sent again: the current one, if CEC was enabled
    /// while the TV is still tuned to that HDMI device.
    pub fn on_change(
        &self,
        uri_or_key: &str,
        current: Option<&SelectionRequest>,
        config: &CecConfig,
        live_device_id: DeviceId,
    ) -> Option<SelectionRequest> {
        let option = setting_key(uri_or_key);
        if option != HDMI_CONTROL_ENABLED {
            trace!("Ignoring change of {}", option);
            return None;
        }
        if !self.hdmi_control_enabled() {
            debug!("HDMI control disabled");
            return None;
        }
        let Some(current) = current else {
            debug!("HDMI control enabled with nothing selected");
            return None;
        };
        if config.is_hdmi_device_id(current.device_id) && live_device_id == current.device_id {
            info!("HDMI control enabled, current {}", current);
            return Some(current.clone());
        }
        debug!(
            "HDMI control enabled, current device {} is not the tuned device {}",
            current.device_id, live_device_id
        );
        None
    }
}
