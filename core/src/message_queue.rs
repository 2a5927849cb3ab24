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

//! Ordered, cancellable queue of delayed routing messages.
//!
//! The queue has no clock of its own: callers pass the current instant, which keeps it usable
//! both from the router task and from synchronous tests.

use std::collections::BTreeMap;
use std::time::Duration;

use log::trace;
use tokio::time::Instant;

use crate::definitions::{KeyCode, LogicalAddress, PortId};

/// Work items the selection state machine schedules for itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Send a CEC device select to the given logical address.
    DeviceSelect(LogicalAddress),
    /// Send a CEC port select to the given HDMI port.
    PortSelect(PortId),
    /// End of the select protection window.
    SelectProtection,
    /// Forward a key event to the CEC client.
    SendKeyEvent { key_code: KeyCode, is_pressed: bool },
}

/// Cancellation key of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    DeviceSelect,
    PortSelect,
    SelectProtection,
    SendKeyEvent,
}

impl Message {
    pub fn tag(&self) -> MessageTag {
        match self {
            Message::DeviceSelect(_) => MessageTag::DeviceSelect,
            Message::PortSelect(_) => MessageTag::PortSelect,
            Message::SelectProtection => MessageTag::SelectProtection,
            Message::SendKeyEvent { .. } => MessageTag::SendKeyEvent,
        }
    }
}

/// Messages keyed by (due time, insertion sequence), so equal due times pop in FIFO order.
#[derive(Debug, Default)]
pub struct MessageQueue {
    entries: BTreeMap<(Instant, u64), Message>,
    next_seq: u64,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `message` to be ready at `now`.
    pub fn post_now(&mut self, message: Message, now: Instant) {
        self.post_at(message, now);
    }

    /// Queue `message` to be ready once `delay` has elapsed after `now`.
    pub fn post_delayed(&mut self, message: Message, now: Instant, delay: Duration) {
        self.post_at(message, now + delay);
    }

    fn post_at(&mut self, message: Message, due: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!("Queue {:?} (seq {})", message, seq);
        self.entries.insert((due, seq), message);
    }

    /// Drop every queued message whose tag is in `tags`. Returns how many were removed.
    pub fn cancel(&mut self, tags: &[MessageTag]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, message| !tags.contains(&message.tag()));
        let removed = before - self.entries.len();
        if removed > 0 {
            trace!("Cancelled {} queued message(s) with tags {:?}", removed, tags);
        }
        removed
    }

    /// Remove and return the earliest message that is ready at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<Message> {
        let key = *self.entries.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.entries.remove(&key)
    }

    /// When the earliest queued message becomes ready.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    pub fn has_pending(&self, tag: MessageTag) -> bool {
        self.entries.values().any(|message| message.tag() == tag)
    }

    /// Queued messages with their due times, in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = (Instant, &Message)> {
        self.entries.iter().map(|((due, _), message)| (*due, message))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
