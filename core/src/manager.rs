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

//! HDMI-CEC selection state machine.
//!
//! Decides, whenever the main TV source changes, whether to send a device select, a port select
//! or a delayed fallback to the internal address, and keeps stale or racing notifications from
//! undoing a fresh selection.
//!
//! There are four cases in which an HDMI session stops being the main one:
//! 1. Tune from HDMI device A to HDMI device B: the select for B cancels everything queued.
//! 2. Tune from an HDMI device to a non-HDMI source: the fallback to internal goes out.
//! 3. Leave the TV application for a launcher without a TV view: same as 2.
//! 4. Tune the same HDMI device from another application: the old session's "not main"
//!    notification may arrive after the new session's "main" one. Same device with a different
//!    session id is dropped as stale, and the protection window covers the remaining races.

use std::sync::Arc;

use log::{debug, error, info, trace, warn};
use tokio::time::Instant;

use crate::config::CecConfig;
use crate::definitions::{DeviceId, KeyCode, PortId, SelectResult, SessionId};
use crate::device_directory::DeviceDirectory;
use crate::key_forwarder::PlayPauseToggle;
use crate::message_queue::{Message, MessageQueue, MessageTag};
use crate::platform::{CecClient, Platform, TunerState};
use crate::selection::SelectionRequest;
use crate::settings_watcher::SettingsWatcher;

/// Messages dropped whenever a new explicit select goes out.
const SELECT_MESSAGE_TAGS: [MessageTag; 3] = [
    MessageTag::DeviceSelect,
    MessageTag::PortSelect,
    MessageTag::SelectProtection,
];

/// Coarse view of where the state machine stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// Nothing queued and no protection window running.
    Idle,
    /// A device or port select is queued and not yet handed to the CEC client.
    AwaitingDispatch,
    /// A select went out recently; fallbacks to internal are being dropped.
    Protected,
}

/// Owns the routing state of the TV. Construct once at startup and hand it to the router.
pub struct HdmiCecManager {
    config: CecConfig,
    has_cec_feature: bool,
    client: Option<Arc<dyn CecClient>>,
    directory: DeviceDirectory,
    settings_watcher: SettingsWatcher,
    tuner: Arc<dyn TunerState>,
    queue: MessageQueue,
    /// Last selection handed to the queue for dispatch.
    current: Option<SelectionRequest>,
    /// Most recent request, dispatched or not.
    pending: Option<SelectionRequest>,
    in_select_protection: bool,
    play_pause: PlayPauseToggle,
}

impl HdmiCecManager {
    pub fn new(config: CecConfig, platform: Platform) -> Self {
        info!("CEC feature present: {}", platform.has_cec_feature);
        if platform.has_cec_feature && platform.client.is_none() {
            warn!("CEC feature present but no CEC client available");
        }
        Self {
            config,
            has_cec_feature: platform.has_cec_feature,
            client: platform.client,
            directory: DeviceDirectory::new(platform.registry),
            settings_watcher: SettingsWatcher::new(platform.settings),
            tuner: platform.tuner,
            queue: MessageQueue::new(),
            current: None,
            pending: None,
            in_select_protection: false,
            play_pause: PlayPauseToggle::default(),
        }
    }

    pub fn config(&self) -> &CecConfig {
        &self.config
    }

    /// True when both the CEC feature and a client are present.
    pub fn is_available(&self) -> bool {
        self.has_cec_feature && self.client.is_some()
    }

    /// Main TV source changed: `is_main` tells whether the session became or stopped being main.
    pub fn on_main_source_changed(
        &mut self,
        is_main: bool,
        input_id: &str,
        device_id: DeviceId,
        session_id: SessionId,
    ) {
        if !self.has_cec_feature {
            trace!("Main source changed without CEC feature, ignoring");
            return;
        }
        if self.client.is_none() {
            error!("Main source changed but there is no CEC client");
            return;
        }

        let selecting = SelectionRequest::new(input_id, device_id, session_id);
        self.pending = Some(selecting.clone());

        if !self.is_hdmi_device_id(device_id) {
            trace!("Device {} is not HDMI, no routing", device_id);
            return;
        }

        if is_main {
            self.select_hdmi(selecting);
        } else {
            self.leave_hdmi(&selecting);
        }
    }

    fn select_hdmi(&mut self, mut selecting: SelectionRequest) {
        // Prefer device select whenever the logical address of the source is known.
        if let Some(device) = self.directory.resolve_hdmi_device(&selecting.input_id) {
            debug!("Input {} resolves to {}", selecting.input_id, device);
            selecting.set_logical_address(device.logical_address);
            self.pending = Some(selecting.clone());
            self.select_now(selecting, Some(Message::DeviceSelect(device.logical_address)));
            return;
        }

        // The CEC device list is not there yet (e.g. CEC was just switched on), go by port.
        match self.directory.resolve_port(selecting.device_id) {
            Some(port_id) => {
                selecting.set_port_id(port_id);
                self.pending = Some(selecting.clone());
                self.select_now(selecting, Some(Message::PortSelect(port_id)));
            }
            None => {
                // Nothing to send yet, the new source still owns routing.
                warn!(
                    "No logical address or port for input {} (device {}), not sending a select",
                    selecting.input_id, selecting.device_id
                );
                self.select_now(selecting, None);
            }
        }
    }

    fn leave_hdmi(&mut self, leaving: &SelectionRequest) {
        if let Some(current) = &self.current {
            if leaving.device_id == current.device_id && leaving.session_id != current.session_id {
                debug!(
                    "Ignoring stale leave for device {} from session {} (current session {})",
                    leaving.device_id, leaving.session_id, current.session_id
                );
                return;
            }
        }
        self.pending = Some(SelectionRequest::internal());
        self.device_select_internal_delayed();
    }

    /// Promote `selecting` to current, drop queued selects, send `command` right away if there
    /// is one and arm the protection window.
    fn select_now(&mut self, selecting: SelectionRequest, command: Option<Message>) {
        debug!("{:?} {}", command, selecting);
        self.current = Some(selecting);
        self.remove_previous_messages();

        let now = Instant::now();
        if let Some(command) = command {
            self.queue.post_now(command, now);
        }

        self.in_select_protection = true;
        self.queue
            .post_delayed(Message::SelectProtection, now, self.config.protection_window());
    }

    /// Queued selects must not survive a new one: a tune from channel to HDMI produces a
    /// select of address 0 followed by the HDMI device, and only the latter should go out.
    fn remove_previous_messages(&mut self) {
        self.queue.cancel(&SELECT_MESSAGE_TAGS);
    }

    fn device_select_internal_delayed(&mut self) {
        if self.in_select_protection {
            warn!("Select protection time, not selecting internal address");
            return;
        }
        // Queued selects stay; a newer explicit select cancels this one instead.
        let Some(internal) = self.pending.clone() else {
            return;
        };
        let Some(logical_address) = internal.logical_address else {
            return;
        };
        debug!(
            "Falling back to internal in {:?}: {}",
            self.config.internal_fallback_delay(),
            internal
        );
        self.current = Some(internal);
        self.queue.post_delayed(
            Message::DeviceSelect(logical_address),
            Instant::now(),
            self.config.internal_fallback_delay(),
        );
    }

    /// Settings notification for `key`, which may be a full settings URI.
    pub fn on_setting_changed(&mut self, key: &str) {
        if !self.is_available() {
            trace!("Setting {} changed without CEC, ignoring", key);
            return;
        }
        let live_device_id = self.tuner.live_device_id();
        let reselect = self.settings_watcher.on_change(
            key,
            self.current.as_ref(),
            &self.config,
            live_device_id,
        );
        if let Some(selection) = reselect {
            match Self::select_command(&selection) {
                Some(command) => self.select_now(selection, Some(command)),
                None => warn!("Current selection has no address to re-send: {}", selection),
            }
        }
    }

    fn select_command(selection: &SelectionRequest) -> Option<Message> {
        match (selection.logical_address, selection.port_id) {
            (Some(logical_address), _) => Some(Message::DeviceSelect(logical_address)),
            (None, Some(port_id)) => Some(Message::PortSelect(port_id)),
            (None, None) => None,
        }
    }

    /// Queue a key event for the CEC client. Returns false when CEC is not usable.
    pub fn send_key_event(&mut self, key_code: KeyCode, is_pressed: bool) -> bool {
        if !self.has_cec_feature {
            trace!("Key event without CEC feature, dropped");
            return false;
        }
        if self.client.is_none() {
            error!("Key event dropped, no CEC client");
            return false;
        }
        let key_code = self.play_pause.translate(key_code, is_pressed);
        self.queue
            .post_now(Message::SendKeyEvent { key_code, is_pressed }, Instant::now());
        true
    }

    /// Input id of the current selection, empty when there is none.
    pub fn get_current_input(&self) -> String {
        self.current
            .as_ref()
            .map(|current| current.input_id.clone())
            .unwrap_or_default()
    }

    pub fn current_selection(&self) -> Option<&SelectionRequest> {
        self.current.as_ref()
    }

    pub fn pending_selection(&self) -> Option<&SelectionRequest> {
        self.pending.as_ref()
    }

    pub fn in_select_protection(&self) -> bool {
        self.in_select_protection
    }

    pub fn phase(&self) -> SelectionPhase {
        if self.queue.has_pending(MessageTag::DeviceSelect)
            || self.queue.has_pending(MessageTag::PortSelect)
        {
            SelectionPhase::AwaitingDispatch
        } else if self.in_select_protection {
            SelectionPhase::Protected
        } else {
            SelectionPhase::Idle
        }
    }

    pub fn get_port_id_by_device_id(&self, device_id: DeviceId) -> Option<PortId> {
        self.directory.resolve_port(device_id)
    }

    pub fn is_hdmi_device_id(&self, device_id: DeviceId) -> bool {
        self.config.is_hdmi_device_id(device_id)
    }

    pub fn set_device_id_for_cec(&self, device_id: DeviceId) {
        debug!("CEC device id hint {}", device_id);
        self.tuner.set_device_id_for_cec(device_id);
    }

    /// Device id the TV application reports as tuned.
    pub fn live_device_id(&self) -> DeviceId {
        self.tuner.live_device_id()
    }

    pub fn queue(&self) -> &MessageQueue {
        &self.queue
    }

    /// When the router has to wake up next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.next_due()
    }

    /// Handle every message that is ready at `now`, in order. Returns how many ran.
    pub fn dispatch_due(&mut self, now: Instant) -> usize {
        let mut handled = 0;
        while let Some(message) = self.queue.pop_due(now) {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    fn handle_message(&mut self, message: Message) {
        if let Message::SelectProtection = message {
            trace!("Select protection ended");
            self.in_select_protection = false;
            return;
        }
        let Some(client) = self.client.as_ref() else {
            error!("Dropping {:?}, no CEC client", message);
            return;
        };
        match message {
            Message::DeviceSelect(logical_address) => {
                client.device_select(
                    logical_address,
                    Box::new(move |result| {
                        log_select_result("deviceSelect", logical_address.into(), result)
                    }),
                );
            }
            Message::PortSelect(port_id) => {
                client.port_select(
                    port_id,
                    Box::new(move |result| log_select_result("portSelect", port_id, result)),
                );
            }
            Message::SendKeyEvent { key_code, is_pressed } => {
                client.send_key_event(key_code, is_pressed);
            }
            Message::SelectProtection => {}
        }
    }
}

/// Select failures are reported and not retried; the current selection stays as sent.
fn log_select_result(command: &str, target: i32, result: SelectResult) {
    if result.is_success() {
        debug!("{} {} completed: {}", command, target, result);
    } else {
        warn!("{} {} failed: {} (code {})", command, target, result, result.code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{
        ADDR_INTERNAL, DEVICE_ID_HDMI1, DEVICE_ID_HDMI2, DEVICE_ID_HDMI3, HDMI_CONTROL_ENABLED,
        KEYCODE_MEDIA_PAUSE, KEYCODE_MEDIA_PLAY, KEYCODE_MEDIA_PLAY_PAUSE,
    };
    use crate::device_directory::{HardwareInfo, HdmiDeviceInfo, InputInfo};
    use crate::simulated::{CecCommand, SimulatedPlatform};
    use std::time::Duration;
    use tokio::time::advance;

    const HDMI1: &str = "HDMI1";
    const HDMI2: &str = "HDMI2";

    fn simulated() -> SimulatedPlatform {
        let sim = SimulatedPlatform::new();
        sim.registry.add_input(InputInfo { id: HDMI1.into(), parent_id: None, hdmi_device: None });
        sim.registry.add_input(InputInfo {
            id: "HDMI1/cec/4".into(),
            parent_id: Some(HDMI1.into()),
            hdmi_device: Some(HdmiDeviceInfo {
                logical_address: 4,
                physical_address: 0x1000,
                port_id: 1,
                display_name: "Player".into(),
            }),
        });
        // HDMI2 has no CEC device list yet.
        sim.registry.add_input(InputInfo { id: HDMI2.into(), parent_id: None, hdmi_device: None });
        sim.registry.add_hardware(HardwareInfo { device_id: DEVICE_ID_HDMI1, hdmi_port_id: 1 });
        sim.registry.add_hardware(HardwareInfo { device_id: DEVICE_ID_HDMI2, hdmi_port_id: 2 });
        sim
    }

    fn setup() -> (SimulatedPlatform, HdmiCecManager) {
        let sim = simulated();
        let manager = HdmiCecManager::new(CecConfig::default(), sim.platform());
        (sim, manager)
    }

    fn run_due(manager: &mut HdmiCecManager) -> usize {
        manager.dispatch_due(Instant::now())
    }

    fn queued(manager: &HdmiCecManager) -> Vec<Message> {
        manager.queue().iter().map(|(_, message)| message.clone()).collect()
    }

    fn queued_selects(manager: &HdmiCecManager) -> usize {
        manager
            .queue()
            .iter()
            .filter(|(_, m)| matches!(m, Message::DeviceSelect(_) | Message::PortSelect(_)))
            .count()
    }

    /// Select HDMI1 and let the protection window run out.
    async fn settle_on_hdmi1(
        sim: &SimulatedPlatform,
        manager: &mut HdmiCecManager,
        session_id: SessionId,
    ) {
        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, session_id);
        run_due(manager);
        advance(Duration::from_millis(1600)).await;
        run_due(manager);
        sim.client.take();
    }

    #[tokio::test(start_paused = true)]
    async fn main_hdmi_with_logical_address_sends_device_select() {
        let (sim, mut manager) = setup();
        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, 1);

        assert_eq!(manager.phase(), SelectionPhase::AwaitingDispatch);
        assert_eq!(queued_selects(&manager), 1);
        assert_eq!(run_due(&mut manager), 1);
        assert_eq!(sim.client.take(), vec![CecCommand::DeviceSelect(4)]);

        let current = manager.current_selection().cloned();
        let mut expected = SelectionRequest::new(HDMI1, DEVICE_ID_HDMI1, 1);
        expected.set_logical_address(4);
        assert_eq!(current, Some(expected));
        assert_eq!(manager.get_current_input(), HDMI1);
        assert!(manager.in_select_protection());
        assert_eq!(manager.phase(), SelectionPhase::Protected);

        advance(Duration::from_millis(1499)).await;
        run_due(&mut manager);
        assert!(manager.in_select_protection());

        advance(Duration::from_millis(1)).await;
        run_due(&mut manager);
        assert!(!manager.in_select_protection());
        assert_eq!(manager.phase(), SelectionPhase::Idle);
        assert!(sim.client.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn leave_inside_protection_window_is_dropped() {
        let (sim, mut manager) = setup();
        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, 1);
        run_due(&mut manager);
        sim.client.take();

        manager.on_main_source_changed(false, HDMI1, DEVICE_ID_HDMI1, 1);
        assert_eq!(queued_selects(&manager), 0);
        assert_eq!(manager.get_current_input(), HDMI1);
        assert_eq!(manager.pending_selection(), Some(&SelectionRequest::internal()));

        advance(Duration::from_secs(5)).await;
        run_due(&mut manager);
        assert!(sim.client.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn leave_after_window_falls_back_to_internal() {
        let (sim, mut manager) = setup();
        settle_on_hdmi1(&sim, &mut manager, 1).await;

        let left_at = Instant::now();
        manager.on_main_source_changed(false, HDMI1, DEVICE_ID_HDMI1, 1);
        let due: Vec<_> = manager.queue().iter().map(|(due, m)| (due, m.clone())).collect();
        assert_eq!(
            due,
            vec![(left_at + Duration::from_millis(1500), Message::DeviceSelect(ADDR_INTERNAL))]
        );
        assert_eq!(manager.get_current_input(), "");

        advance(Duration::from_millis(1499)).await;
        run_due(&mut manager);
        assert!(sim.client.take().is_empty());

        advance(Duration::from_millis(1)).await;
        run_due(&mut manager);
        assert_eq!(sim.client.take(), vec![CecCommand::DeviceSelect(ADDR_INTERNAL)]);
        // The fallback does not arm the protection window.
        assert!(!manager.in_select_protection());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_leave_from_superseded_session_is_ignored() {
        let (sim, mut manager) = setup();
        settle_on_hdmi1(&sim, &mut manager, 2).await;
        let before = manager.current_selection().cloned();

        manager.on_main_source_changed(false, HDMI1, DEVICE_ID_HDMI1, 1);
        assert!(manager.queue().is_empty());
        assert_eq!(manager.current_selection().cloned(), before);

        advance(Duration::from_secs(5)).await;
        run_due(&mut manager);
        assert!(sim.client.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn new_select_replaces_queued_select() {
        let (sim, mut manager) = setup();
        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, 1);
        manager.on_main_source_changed(true, HDMI2, DEVICE_ID_HDMI2, 2);

        assert_eq!(queued(&manager), vec![Message::PortSelect(2), Message::SelectProtection]);
        run_due(&mut manager);
        assert_eq!(sim.client.take(), vec![CecCommand::PortSelect(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn new_select_cancels_pending_fallback() {
        let (sim, mut manager) = setup();
        settle_on_hdmi1(&sim, &mut manager, 1).await;

        manager.on_main_source_changed(false, HDMI1, DEVICE_ID_HDMI1, 1);
        advance(Duration::from_millis(500)).await;
        manager.on_main_source_changed(true, HDMI2, DEVICE_ID_HDMI2, 2);

        run_due(&mut manager);
        advance(Duration::from_secs(3)).await;
        run_due(&mut manager);
        assert_eq!(sim.client.take(), vec![CecCommand::PortSelect(2)]);
        assert_eq!(manager.get_current_input(), HDMI2);
    }

    #[tokio::test(start_paused = true)]
    async fn port_select_only_when_logical_address_unknown() {
        let (sim, mut manager) = setup();
        manager.on_main_source_changed(true, HDMI2, DEVICE_ID_HDMI2, 7);
        run_due(&mut manager);

        assert_eq!(sim.client.take(), vec![CecCommand::PortSelect(2)]);
        let current = manager.current_selection().cloned();
        assert_eq!(current.as_ref().and_then(|c| c.port_id), Some(2));
        assert_eq!(current.as_ref().and_then(|c| c.logical_address), None);
        assert!(manager.in_select_protection());
    }

    #[tokio::test(start_paused = true)]
    async fn unresolvable_source_sends_nothing_but_takes_over() {
        let sim = SimulatedPlatform::new();
        let mut manager = HdmiCecManager::new(CecConfig::default(), sim.platform());
        manager.on_main_source_changed(true, "HDMI3", DEVICE_ID_HDMI3, 1);

        assert_eq!(queued(&manager), vec![Message::SelectProtection]);
        assert_eq!(manager.get_current_input(), "HDMI3");
        assert_eq!(manager.pending_selection().map(|p| p.device_id), Some(DEVICE_ID_HDMI3));
        assert!(manager.in_select_protection());
        assert_eq!(manager.phase(), SelectionPhase::Protected);
        run_due(&mut manager);
        assert!(sim.client.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unresolvable_select_cancels_pending_fallback() {
        let (sim, mut manager) = setup();
        settle_on_hdmi1(&sim, &mut manager, 1).await;

        manager.on_main_source_changed(false, HDMI1, DEVICE_ID_HDMI1, 1);
        advance(Duration::from_millis(200)).await;
        run_due(&mut manager);
        // No input and no hardware record for HDMI3 yet.
        manager.on_main_source_changed(true, "HDMI3", DEVICE_ID_HDMI3, 2);

        advance(Duration::from_millis(2000)).await;
        run_due(&mut manager);
        assert!(sim.client.take().is_empty());
        assert_eq!(manager.get_current_input(), "HDMI3");
        assert!(manager.queue().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn leave_right_after_unresolvable_select_is_protected() {
        let sim = SimulatedPlatform::new();
        let mut manager = HdmiCecManager::new(CecConfig::default(), sim.platform());
        manager.on_main_source_changed(true, "HDMI3", DEVICE_ID_HDMI3, 1);
        manager.on_main_source_changed(false, "HDMI3", DEVICE_ID_HDMI3, 1);

        advance(Duration::from_secs(5)).await;
        run_due(&mut manager);
        assert!(sim.client.take().is_empty());
        assert_eq!(manager.get_current_input(), "HDMI3");
    }

    #[tokio::test(start_paused = true)]
    async fn non_hdmi_source_changes_are_not_routed() {
        let (sim, mut manager) = setup();
        manager.on_main_source_changed(true, "ATV", 0, 1);
        manager.on_main_source_changed(false, "ATV", 0, 1);
        run_due(&mut manager);
        assert!(manager.queue().is_empty());
        assert!(sim.client.take().is_empty());
        assert_eq!(manager.get_current_input(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_main_for_same_session_redispatches() {
        let (sim, mut manager) = setup();
        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, 1);
        run_due(&mut manager);
        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, 1);
        run_due(&mut manager);
        assert_eq!(
            sim.client.take(),
            vec![CecCommand::DeviceSelect(4), CecCommand::DeviceSelect(4)]
        );
        assert_eq!(queued(&manager), vec![Message::SelectProtection]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_select_is_not_retried() {
        let (sim, mut manager) = setup();
        sim.client.set_result(SelectResult::Timeout);
        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, 1);
        run_due(&mut manager);
        advance(Duration::from_secs(10)).await;
        run_due(&mut manager);
        assert_eq!(sim.client.take(), vec![CecCommand::DeviceSelect(4)]);
        assert_eq!(manager.get_current_input(), HDMI1);
    }

    #[tokio::test(start_paused = true)]
    async fn without_cec_feature_everything_is_a_no_op() {
        let mut sim = simulated();
        sim.has_cec_feature = false;
        let mut manager = HdmiCecManager::new(CecConfig::default(), sim.platform());

        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, 1);
        manager.on_setting_changed(HDMI_CONTROL_ENABLED);
        assert!(!manager.send_key_event(KEYCODE_MEDIA_PLAY_PAUSE, true));
        assert!(manager.queue().is_empty());
        assert_eq!(manager.pending_selection(), None);
        assert_eq!(manager.get_current_input(), "");
        assert!(!manager.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn without_client_everything_is_a_no_op() {
        let mut sim = simulated();
        sim.client_present = false;
        let mut manager = HdmiCecManager::new(CecConfig::default(), sim.platform());

        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, 1);
        assert!(!manager.send_key_event(19, true));
        assert!(manager.queue().is_empty());
        assert!(sim.client.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn enabling_cec_resends_current_when_still_tuned() {
        let (sim, mut manager) = setup();
        settle_on_hdmi1(&sim, &mut manager, 1).await;

        sim.tuner.set_live_device_id(DEVICE_ID_HDMI1);
        sim.settings.put_int(HDMI_CONTROL_ENABLED, 1);
        manager.on_setting_changed("content://settings/global/hdmi_control_enabled");
        run_due(&mut manager);
        assert_eq!(sim.client.take(), vec![CecCommand::DeviceSelect(4)]);
        assert!(manager.in_select_protection());
    }

    #[tokio::test(start_paused = true)]
    async fn enabling_cec_on_another_tuned_device_does_nothing() {
        let (sim, mut manager) = setup();
        settle_on_hdmi1(&sim, &mut manager, 1).await;

        sim.tuner.set_live_device_id(DEVICE_ID_HDMI2);
        sim.settings.put_int(HDMI_CONTROL_ENABLED, 1);
        manager.on_setting_changed(HDMI_CONTROL_ENABLED);
        run_due(&mut manager);
        assert!(sim.client.take().is_empty());

        sim.tuner.set_live_device_id(DEVICE_ID_HDMI1);
        sim.settings.put_int(HDMI_CONTROL_ENABLED, 0);
        manager.on_setting_changed(HDMI_CONTROL_ENABLED);
        run_due(&mut manager);
        assert!(sim.client.take().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn enabling_cec_resends_port_select_for_port_routed_source() {
        let (sim, mut manager) = setup();
        manager.on_main_source_changed(true, HDMI2, DEVICE_ID_HDMI2, 3);
        run_due(&mut manager);
        sim.client.take();

        sim.tuner.set_live_device_id(DEVICE_ID_HDMI2);
        manager.on_setting_changed(HDMI_CONTROL_ENABLED);
        run_due(&mut manager);
        assert_eq!(sim.client.take(), vec![CecCommand::PortSelect(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn play_pause_alternates_and_keeps_order_with_selects() {
        let (sim, mut manager) = setup();
        manager.on_main_source_changed(true, HDMI1, DEVICE_ID_HDMI1, 1);
        assert!(manager.send_key_event(KEYCODE_MEDIA_PLAY_PAUSE, true));
        assert!(manager.send_key_event(KEYCODE_MEDIA_PLAY_PAUSE, false));
        assert!(manager.send_key_event(KEYCODE_MEDIA_PLAY_PAUSE, true));
        assert!(manager.send_key_event(KEYCODE_MEDIA_PLAY_PAUSE, false));
        assert!(manager.send_key_event(19, true));
        run_due(&mut manager);

        assert_eq!(
            sim.client.take(),
            vec![
                CecCommand::DeviceSelect(4),
                CecCommand::KeyEvent { key_code: KEYCODE_MEDIA_PLAY, is_pressed: true },
                CecCommand::KeyEvent { key_code: KEYCODE_MEDIA_PLAY, is_pressed: false },
                CecCommand::KeyEvent { key_code: KEYCODE_MEDIA_PAUSE, is_pressed: true },
                CecCommand::KeyEvent { key_code: KEYCODE_MEDIA_PAUSE, is_pressed: false },
                CecCommand::KeyEvent { key_code: 19, is_pressed: true },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn lookups_and_hints() {
        let (sim, manager) = setup();
        assert_eq!(manager.get_port_id_by_device_id(DEVICE_ID_HDMI1), Some(1));
        assert_eq!(manager.get_port_id_by_device_id(99), None);
        assert!(manager.is_hdmi_device_id(DEVICE_ID_HDMI2));
        assert!(!manager.is_hdmi_device_id(0));

        manager.set_device_id_for_cec(DEVICE_ID_HDMI2);
        assert_eq!(sim.tuner.cec_hints(), vec![DEVICE_ID_HDMI2]);
        sim.tuner.set_live_device_id(DEVICE_ID_HDMI1);
        assert_eq!(manager.live_device_id(), DEVICE_ID_HDMI1);
    }
}
