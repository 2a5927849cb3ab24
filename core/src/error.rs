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

use thiserror::Error;

/// Error type for the CEC routing host.
///
/// Capability gaps, unresolved addresses, stale notifications and failed selects are part of
/// normal operation and never show up here; they are logged where they happen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CecError {
    /// The router task that serializes all routing work is gone.
    #[error("CEC router is not running")]
    RouterStopped,

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
