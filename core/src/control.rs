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

use async_trait::async_trait;

use crate::definitions::{DeviceId, KeyCode, PortId, SessionId};
use crate::error::CecError;
use crate::router::{RouterClient, RouterCommand};

/// Entry points the TV framework calls into. Backed in-process by a [`RouterClient`].
///
/// Notifications are fire-and-forget; queries wait for the router's answer. Every call fails
/// with [`CecError::RouterStopped`] once the router task is gone.
#[async_trait]
pub trait CecControl: Send + Sync {
    // --- Notifications ---
    async fn on_main_source_changed(
        &self,
        is_main: bool,
        input_id: &str,
        device_id: DeviceId,
        session_id: SessionId,
    ) -> Result<(), CecError>;

    /// `key` may be a bare setting key or a settings URI ending in one.
    async fn on_setting_changed(&self, key: &str) -> Result<(), CecError>;

    async fn set_device_id_for_cec(&self, device_id: DeviceId) -> Result<(), CecError>;

    // --- Key forwarding ---
    /// Returns `false` when CEC is unavailable and the key was not queued.
    async fn send_key_event(&self, key_code: KeyCode, is_pressed: bool) -> Result<bool, CecError>;

    // --- Queries ---
    async fn get_current_input(&self) -> Result<String, CecError>;
    async fn get_port_id_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> Result<Option<PortId>, CecError>;
    async fn live_device_id(&self) -> Result<DeviceId, CecError>;

    fn is_hdmi_device_id(&self, device_id: DeviceId) -> bool;
}

#[async_trait]
impl CecControl for RouterClient {
    async fn on_main_source_changed(
        &self,
        is_main: bool,
        input_id: &str,
        device_id: DeviceId,
        session_id: SessionId,
    ) -> Result<(), CecError> {
        self.send(RouterCommand::MainSourceChanged {
            is_main,
            input_id: input_id.to_string(),
            device_id,
            session_id,
        })
    }

    async fn on_setting_changed(&self, key: &str) -> Result<(), CecError> {
        self.send(RouterCommand::SettingChanged { key: key.to_string() })
    }

    async fn set_device_id_for_cec(&self, device_id: DeviceId) -> Result<(), CecError> {
        self.send(RouterCommand::SetDeviceIdForCec { device_id })
    }

    async fn send_key_event(&self, key_code: KeyCode, is_pressed: bool) -> Result<bool, CecError> {
        self.request(|reply| RouterCommand::SendKeyEvent {
            key_code,
            is_pressed,
            reply,
        })
        .await
    }

    async fn get_current_input(&self) -> Result<String, CecError> {
        self.request(|reply| RouterCommand::GetCurrentInput { reply }).await
    }

    async fn get_port_id_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> Result<Option<PortId>, CecError> {
        self.request(|reply| RouterCommand::GetPortIdByDeviceId { device_id, reply })
            .await
    }

    async fn live_device_id(&self) -> Result<DeviceId, CecError> {
        self.request(|reply| RouterCommand::GetLiveDeviceId { reply }).await
    }

    fn is_hdmi_device_id(&self, device_id: DeviceId) -> bool {
        self.config().is_hdmi_device_id(device_id)
    }
}
