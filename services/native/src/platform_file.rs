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

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use cec_router_core::definitions::DeviceId;
use cec_router_core::device_directory::{HardwareInfo, InputInfo};
use cec_router_core::simulated::SimulatedPlatform;
use cec_router_core::CecConfig;
use log::info;
use serde::Deserialize;

/// Simulated platform as described in a `--platform` JSON file.
///
/// ```json
/// {
///   "inputs": [{ "id": "HDMI1", "hdmi_device": { "logical_address": 4, "physical_address": 4096, "port_id": 1 } }],
///   "hardware": [{ "device_id": 5, "hdmi_port_id": 1 }],
///   "settings": { "hdmi_control_enabled": 1 },
///   "config": { "protection_window_ms": 1500 }
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlatformDescription {
    pub has_cec_feature: bool,
    pub client_present: bool,
    pub inputs: Vec<InputInfo>,
    pub hardware: Vec<HardwareInfo>,
    pub settings: HashMap<String, i32>,
    pub live_device_id: DeviceId,
    pub config: CecConfig,
}

impl Default for PlatformDescription {
    fn default() -> Self {
        Self {
            has_cec_feature: true,
            client_present: true,
            inputs: Vec::new(),
            hardware: Vec::new(),
            settings: HashMap::new(),
            live_device_id: 0,
            config: CecConfig::default(),
        }
    }
}

impl PlatformDescription {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Reading platform description {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("Parsing platform description {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let description: Self = serde_json::from_str(text)?;
        description.config.validate()?;
        Ok(description)
    }

    /// Populate the simulated collaborators. Settings are stored before anyone subscribes.
    pub fn build(self) -> (SimulatedPlatform, CecConfig) {
        let sim = SimulatedPlatform {
            has_cec_feature: self.has_cec_feature,
            client_present: self.client_present,
            ..SimulatedPlatform::default()
        };
        info!(
            "Simulated platform: {} inputs, {} hardware entries, CEC feature {}, client {}",
            self.inputs.len(),
            self.hardware.len(),
            self.has_cec_feature,
            if self.client_present { "present" } else { "absent" }
        );
        for input in self.inputs {
            sim.registry.add_input(input);
        }
        for hardware in self.hardware {
            sim.registry.add_hardware(hardware);
        }
        for (key, value) in &self.settings {
            sim.settings.put_int(key, *value);
        }
        sim.tuner.set_live_device_id(self.live_device_id);
        (sim, self.config)
    }
}
