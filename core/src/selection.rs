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

use crate::definitions::{DeviceId, LogicalAddress, PortId, SessionId, ADDR_INTERNAL};

/// A request to route the TV to a source.
///
/// Requests are replaced wholesale on every accepted transition; the only in-place edits are the
/// addressing facts filled in while the request is still pending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionRequest {
    /// Platform input id, empty for the internal tuner.
    pub input_id: String,
    pub device_id: DeviceId,
    pub session_id: SessionId,
    /// Resolved CEC logical address, used by device select.
    pub logical_address: Option<LogicalAddress>,
    /// Resolved HDMI port, used by port select when no logical address is known.
    pub port_id: Option<PortId>,
}

impl SelectionRequest {
    pub fn new(input_id: impl Into<String>, device_id: DeviceId, session_id: SessionId) -> Self {
        Self {
            input_id: input_id.into(),
            device_id,
            session_id,
            logical_address: None,
            port_id: None,
        }
    }

    /// Route back to the tuner.
    pub fn internal() -> Self {
        Self {
            logical_address: Some(ADDR_INTERNAL),
            ..Default::default()
        }
    }

    pub fn is_internal(&self) -> bool {
        self.input_id.is_empty() && self.logical_address == Some(ADDR_INTERNAL)
    }

    pub fn set_logical_address(&mut self, logical_address: LogicalAddress) {
        self.logical_address = Some(logical_address);
    }

    pub fn set_port_id(&mut self, port_id: PortId) {
        self.port_id = Some(port_id);
    }
}

impl fmt::Display for SelectionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inputId: {} deviceId: {} sessionId: {} logicalAddress: {:?} portId: {:?}",
            self.input_id, self.device_id, self.session_id, self.logical_address, self.port_id
        )
    }
}
