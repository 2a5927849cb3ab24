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

use crate::definitions::{DeviceId, KeyCode, LogicalAddress, PortId, SelectResult};
use crate::device_directory::InputRegistry;

/// Completion callback of a device or port select.
pub type SelectCallback = Box<dyn FnOnce(SelectResult) + Send + 'static>;

/// Lower CEC layer that turns routing decisions into CEC frames.
///
/// Calls must not block; results come back through the callback, possibly from another thread.
pub trait CecClient: Send + Sync {
    fn device_select(&self, logical_address: LogicalAddress, on_complete: SelectCallback);

    fn port_select(&self, port_id: PortId, on_complete: SelectCallback);

    fn send_key_event(&self, key_code: KeyCode, is_pressed: bool);
}

/// Read access to global integer settings.
pub trait SettingsStore: Send + Sync {
    /// Value of `key`, or `default` when it was never written.
    fn get_int(&self, key: &str, default: i32) -> i32;
}

/// What the TV side tracks about the currently tuned source.
pub trait TunerState: Send + Sync {
    /// Device id of the source the TV application has tuned, 0 when unknown.
    fn live_device_id(&self) -> DeviceId;

    /// Tell the CEC HAL which device is on screen so it can filter unexpected <Active Source>.
    fn set_device_id_for_cec(&self, device_id: DeviceId);
}

/// Platform collaborators handed to the manager at construction.
#[derive(Clone)]
pub struct Platform {
    /// Whether the device has CEC hardware at all. Read once.
    pub has_cec_feature: bool,
    pub client: Option<Arc<dyn CecClient>>,
    pub registry: Arc<dyn InputRegistry>,
    pub settings: Arc<dyn SettingsStore>,
    pub tuner: Arc<dyn TunerState>,
}
