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
use std::sync::Arc;

use log::trace;
use serde::Deserialize;

use crate::definitions::{DeviceId, LogicalAddress, PortId};

/// CEC facts the platform knows about a connected HDMI device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HdmiDeviceInfo {
    pub logical_address: LogicalAddress,
    pub physical_address: u16,
    pub port_id: PortId,
    #[serde(default)]
    pub display_name: String,
}

impl fmt::Display for HdmiDeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (logical {:#x}, physical {:#06x}, port {})",
            self.display_name, self.logical_address, self.physical_address, self.port_id
        )
    }
}

/// One TV input as registered on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputInfo {
    pub id: String,
    /// Hardware input this one hangs off; HDMI-CEC device inputs are children of a port input.
    pub parent_id: Option<String>,
    pub hdmi_device: Option<HdmiDeviceInfo>,
}

/// One piece of TV input hardware.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HardwareInfo {
    pub device_id: DeviceId,
    pub hdmi_port_id: PortId,
}

/// Platform registry of TV inputs and hardware.
///
/// Lists may be empty or incomplete while the platform is still populating them.
pub trait InputRegistry: Send + Sync {
    fn list_inputs(&self) -> Vec<InputInfo>;

    fn list_hardware(&self) -> Vec<HardwareInfo>;
}

/// Resolves CEC addressing for inputs and devices.
///
/// Every lookup goes to the registry again; nothing is cached between calls.
#[derive(Clone)]
pub struct DeviceDirectory {
    registry: Arc<dyn InputRegistry>,
}

impl DeviceDirectory {
    pub fn new(registry: Arc<dyn InputRegistry>) -> Self {
        Self { registry }
    }

    /// Find the HDMI device behind `input_id`.
    ///
    /// The input's own device info wins; otherwise the first input with that id or with it as
    /// parent that carries device info.
    pub fn resolve_hdmi_device(&self, input_id: &str) -> Option<HdmiDeviceInfo> {
        let inputs = self.registry.list_inputs();
        let own = inputs
            .iter()
            .find(|info| info.id == input_id)
            .and_then(|info| info.hdmi_device.clone());
        let found = own.or_else(|| {
            inputs.into_iter().find_map(|info| {
                let matches = info.id == input_id || info.parent_id.as_deref() == Some(input_id);
                match info.hdmi_device {
                    Some(device) if matches => Some(device),
                    _ => None,
                }
            })
        });
        if found.is_none() {
            trace!("No HDMI device info for input {}", input_id);
        }
        found
    }

    /// HDMI port of the hardware with `device_id`.
    pub fn resolve_port(&self, device_id: DeviceId) -> Option<PortId> {
        let port = self
            .registry
            .list_hardware()
            .into_iter()
            .find(|hardware| hardware.device_id == device_id)
            .map(|hardware| hardware.hdmi_port_id);
        if port.is_none() {
            trace!("No hardware registered for device id {}", device_id);
        }
        port
    }
}
