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

pub mod config;
pub mod control;
pub mod definitions;
pub mod device_directory;
pub mod error;
pub mod key_forwarder;
pub mod manager;
pub mod message_queue;
pub mod platform;
pub mod router;
pub mod selection;
pub mod service;
pub mod settings_watcher;
pub mod simulated;

pub use config::CecConfig;
pub use control::CecControl;
pub use error::CecError;
pub use manager::{HdmiCecManager, SelectionPhase};
pub use platform::{CecClient, Platform, SettingsStore, TunerState};
pub use router::{CecRouter, RouterClient};
pub use selection::SelectionRequest;
pub use service::{spawn_service, MultiServiceHandle, ServiceHandle, StopHandle};
