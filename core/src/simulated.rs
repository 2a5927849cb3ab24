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

//! In-memory platform collaborators.
//!
//! Used to bring the router up without TV hardware and as test doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;
use tokio::sync::broadcast;

use crate::definitions::{DeviceId, KeyCode, LogicalAddress, PortId, SelectResult};
use crate::device_directory::{HardwareInfo, InputInfo, InputRegistry};
use crate::platform::{CecClient, Platform, SelectCallback, SettingsStore, TunerState};

/// Registry whose contents are set by hand.
#[derive(Default)]
pub struct StaticInputRegistry {
    inputs: Mutex<Vec<InputInfo>>,
    hardware: Mutex<Vec<HardwareInfo>>,
}

impl StaticInputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(inputs: Vec<InputInfo>, hardware: Vec<HardwareInfo>) -> Self {
        Self {
            inputs: Mutex::new(inputs),
            hardware: Mutex::new(hardware),
        }
    }

    pub fn add_input(&self, input: InputInfo) {
        self.inputs.lock().unwrap_or_else(|e| e.into_inner()).push(input);
    }

    pub fn add_hardware(&self, hardware: HardwareInfo) {
        self.hardware.lock().unwrap_or_else(|e| e.into_inner()).push(hardware);
    }
}

impl InputRegistry for StaticInputRegistry {
    fn list_inputs(&self) -> Vec<InputInfo> {
        self.inputs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn list_hardware(&self) -> Vec<HardwareInfo> {
        self.hardware.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// A command as seen by the CEC client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CecCommand {
    DeviceSelect(LogicalAddress),
    PortSelect(PortId),
    KeyEvent { key_code: KeyCode, is_pressed: bool },
}

/// CEC client that records commands and completes selects with a preset result.
pub struct RecordingCecClient {
    commands: Mutex<Vec<CecCommand>>,
    result: Mutex<SelectResult>,
}

impl Default for RecordingCecClient {
    fn default() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            result: Mutex::new(SelectResult::Success),
        }
    }
}

impl RecordingCecClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result reported to the completion callback of later selects.
    pub fn set_result(&self, result: SelectResult) {
        *self.result.lock().unwrap_or_else(|e| e.into_inner()) = result;
    }

    /// Commands recorded so far, clearing the record.
    pub fn take(&self) -> Vec<CecCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn commands(&self) -> Vec<CecCommand> {
        self.commands.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, command: CecCommand) {
        debug!("CEC <- {:?}", command);
        self.commands.lock().unwrap_or_else(|e| e.into_inner()).push(command);
    }

    fn result(&self) -> SelectResult {
        *self.result.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CecClient for RecordingCecClient {
    fn device_select(&self, logical_address: LogicalAddress, on_complete: SelectCallback) {
        self.record(CecCommand::DeviceSelect(logical_address));
        on_complete(self.result());
    }

    fn port_select(&self, port_id: PortId, on_complete: SelectCallback) {
        self.record(CecCommand::PortSelect(port_id));
        on_complete(self.result());
    }

    fn send_key_event(&self, key_code: KeyCode, is_pressed: bool) {
        self.record(CecCommand::KeyEvent { key_code, is_pressed });
    }
}

/// Settings kept in a map; every write is announced on a broadcast channel.
pub struct MemorySettings {
    values: Mutex<HashMap<String, i32>>,
    changes: broadcast::Sender<String>,
}

impl Default for MemorySettings {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            values: Mutex::new(HashMap::new()),
            changes,
        }
    }
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` and notify subscribers with the key.
    pub fn put_int(&self, key: &str, value: i32) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
        // No subscribers is fine.
        let _ = self.changes.send(key.to_string());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}

impl SettingsStore for MemorySettings {
    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
            .unwrap_or(default)
    }
}

/// Tuner state set by hand; remembers every CEC device id hint.
#[derive(Default)]
pub struct SimulatedTuner {
    live_device_id: AtomicI32,
    cec_hints: Mutex<Vec<DeviceId>>,
}

impl SimulatedTuner {
    pub fn new(live_device_id: DeviceId) -> Self {
        Self {
            live_device_id: AtomicI32::new(live_device_id),
            cec_hints: Mutex::new(Vec::new()),
        }
    }

    pub fn set_live_device_id(&self, device_id: DeviceId) {
        self.live_device_id.store(device_id, Ordering::SeqCst);
    }

    pub fn cec_hints(&self) -> Vec<DeviceId> {
        self.cec_hints.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl TunerState for SimulatedTuner {
    fn live_device_id(&self) -> DeviceId {
        self.live_device_id.load(Ordering::SeqCst)
    }

    fn set_device_id_for_cec(&self, device_id: DeviceId) {
        self.cec_hints.lock().unwrap_or_else(|e| e.into_inner()).push(device_id);
    }
}

/// All simulated collaborators, kept around so callers can poke at them after wiring.
#[derive(Clone)]
pub struct SimulatedPlatform {
    pub has_cec_feature: bool,
    pub client_present: bool,
    pub client: Arc<RecordingCecClient>,
    pub registry: Arc<StaticInputRegistry>,
    pub settings: Arc<MemorySettings>,
    pub tuner: Arc<SimulatedTuner>,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self {
            has_cec_feature: true,
            client_present: true,
            client: Arc::new(RecordingCecClient::new()),
            registry: Arc::new(StaticInputRegistry::new()),
            settings: Arc::new(MemorySettings::new()),
            tuner: Arc::new(SimulatedTuner::new(0)),
        }
    }
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collaborator bundle for the manager.
    pub fn platform(&self) -> Platform {
        let client: Option<Arc<dyn CecClient>> = if self.client_present {
            Some(self.client.clone() as Arc<dyn CecClient>)
        } else {
            None
        };
        Platform {
            has_cec_feature: self.has_cec_feature,
            client,
            registry: self.registry.clone(),
            settings: self.settings.clone(),
            tuner: self.tuner.clone(),
        }
    }
}
