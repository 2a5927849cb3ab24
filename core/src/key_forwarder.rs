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

use log::trace;

use crate::definitions::{
    KeyCode, KEYCODE_MEDIA_PAUSE, KEYCODE_MEDIA_PLAY, KEYCODE_MEDIA_PLAY_PAUSE,
};

/// Turns the remote's single play/pause key into alternating play and pause.
///
/// CEC maps the combined key to a plain pause, so a TV remote could never resume playback on
/// the source. A press and its release always forward the same key; only the release advances
/// the toggle.
#[derive(Debug, Default, Clone)]
pub struct PlayPauseToggle {
    releases: u32,
}

impl PlayPauseToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key code to forward for `key_code`. Every key other than play/pause passes unchanged.
    pub fn translate(&mut self, key_code: KeyCode, is_pressed: bool) -> KeyCode {
        if key_code != KEYCODE_MEDIA_PLAY_PAUSE {
            return key_code;
        }
        let forwarded = if self.releases % 2 == 1 {
            KEYCODE_MEDIA_PAUSE
        } else {
            KEYCODE_MEDIA_PLAY
        };
        if !is_pressed {
            self.releases = self.releases.wrapping_add(1);
        }
        trace!("play/pause {} -> {}", if is_pressed { "down" } else { "up" }, forwarded);
        forwarded
    }

    /// Completed press/release cycles of the play/pause key.
    pub fn releases(&self) -> u32 {
        self.releases
    }
}
