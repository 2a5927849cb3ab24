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

use log::{debug, info, warn};
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

use crate::config::CecConfig;
use crate::definitions::{DeviceId, KeyCode, PortId, SessionId};
use crate::error::CecError;
use crate::manager::{HdmiCecManager, SelectionPhase};
use crate::service::{spawn_service, ServiceHandle};

/// Requests from [`RouterClient`]s to the router task.
#[derive(Debug)]
pub(crate) enum RouterCommand {
    MainSourceChanged {
        is_main: bool,
        input_id: String,
        device_id: DeviceId,
        session_id: SessionId,
    },
    SettingChanged { key: String },
    SendKeyEvent {
        key_code: KeyCode,
        is_pressed: bool,
        reply: oneshot::Sender<bool>,
    },
    GetCurrentInput { reply: oneshot::Sender<String> },
    GetPortIdByDeviceId {
        device_id: DeviceId,
        reply: oneshot::Sender<Option<PortId>>,
    },
    SetDeviceIdForCec { device_id: DeviceId },
    GetLiveDeviceId { reply: oneshot::Sender<DeviceId> },
    GetPhase { reply: oneshot::Sender<SelectionPhase> },
}

/// Runs the selection state machine on a single tokio task.
///
/// The task owns the [`HdmiCecManager`]; platform notifications reach it through
/// [`RouterClient`]s and, optionally, a broadcast of changed setting keys. Queued messages are
/// dispatched in order whenever they fall due.
pub struct CecRouter {
    manager: HdmiCecManager,
    command_rx: mpsc::UnboundedReceiver<RouterCommand>,
    settings_rx: Option<broadcast::Receiver<String>>,
}

impl CecRouter {
    /// Wrap `manager`; `settings_rx` carries the keys (or URIs) of changed settings.
    pub fn new(
        manager: HdmiCecManager,
        settings_rx: Option<broadcast::Receiver<String>>,
    ) -> (Self, RouterClient) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let client = RouterClient {
            command_tx,
            config: manager.config().clone(),
        };
        let router = Self {
            manager,
            command_rx,
            settings_rx,
        };
        (router, client)
    }

    /// Spawn the router loop and return its handle.
    ///
    /// The loop ends on shutdown, or once every [`RouterClient`] is gone.
    pub fn run(mut self) -> ServiceHandle {
        spawn_service(move |mut stop| async move {
            info!("CEC router started");
            loop {
                self.manager.dispatch_due(Instant::now());
                let deadline = self.manager.next_deadline();
                select! {
                    biased;
                    _ = stop.signaled() => {
                        info!("CEC router shutdown requested");
                        break;
                    }
                    command = self.command_rx.recv() => {
                        match command {
                            Some(command) => self.on_command(command),
                            None => {
                                info!("All router clients dropped; stopping CEC router");
                                break;
                            }
                        }
                    }
                    change = next_setting_change(&mut self.settings_rx) => {
                        match change {
                            Ok(key) => self.manager.on_setting_changed(&key),
                            Err(RecvError::Lagged(n)) => {
                                warn!("Settings notifications lagged by {} messages", n);
                            }
                            Err(RecvError::Closed) => {
                                info!("Settings notification channel closed");
                                self.settings_rx = None;
                            }
                        }
                    }
                    _ = wait_until(deadline) => {}
                }
            }
        })
    }

    fn on_command(&mut self, command: RouterCommand) {
        debug!("Router command {:?}", command);
        match command {
            RouterCommand::MainSourceChanged {
                is_main,
                input_id,
                device_id,
                session_id,
            } => {
                self.manager
                    .on_main_source_changed(is_main, &input_id, device_id, session_id);
            }
            RouterCommand::SettingChanged { key } => {
                self.manager.on_setting_changed(&key);
            }
            RouterCommand::SendKeyEvent {
                key_code,
                is_pressed,
                reply,
            } => {
                let _ = reply.send(self.manager.send_key_event(key_code, is_pressed));
            }
            RouterCommand::GetCurrentInput { reply } => {
                let _ = reply.send(self.manager.get_current_input());
            }
            RouterCommand::GetPortIdByDeviceId { device_id, reply } => {
                let _ = reply.send(self.manager.get_port_id_by_device_id(device_id));
            }
            RouterCommand::SetDeviceIdForCec { device_id } => {
                self.manager.set_device_id_for_cec(device_id);
            }
            RouterCommand::GetLiveDeviceId { reply } => {
                let _ = reply.send(self.manager.live_device_id());
            }
            RouterCommand::GetPhase { reply } => {
                let _ = reply.send(self.manager.phase());
            }
        }
    }
}

async fn next_setting_change(
    settings_rx: &mut Option<broadcast::Receiver<String>>,
) -> Result<String, RecvError> {
    match settings_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Cheap, cloneable access to a running [`CecRouter`].
#[derive(Clone)]
pub struct RouterClient {
    command_tx: mpsc::UnboundedSender<RouterCommand>,
    config: CecConfig,
}

impl RouterClient {
    pub(crate) fn config(&self) -> &CecConfig {
        &self.config
    }

    pub(crate) fn send(&self, command: RouterCommand) -> Result<(), CecError> {
        self.command_tx
            .send(command)
            .map_err(|_| CecError::RouterStopped)
    }

    pub(crate) async fn request<T, F>(&self, make: F) -> Result<T, CecError>
    where
        T: Send,
        F: FnOnce(oneshot::Sender<T>) -> RouterCommand + Send,
    {
        let (reply, response) = oneshot::channel();
        self.send(make(reply))?;
        response.await.map_err(|_| CecError::RouterStopped)
    }

    /// Where the state machine stands right now.
    pub async fn phase(&self) -> Result<SelectionPhase, CecError> {
        self.request(|reply| RouterCommand::GetPhase { reply }).await
    }
}
