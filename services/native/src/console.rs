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

use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use cec_router_core::definitions::{DeviceId, SelectResult};
use cec_router_core::simulated::SimulatedPlatform;
use cec_router_core::{CecControl, RouterClient};

pub const HELP: &str = "\
commands:
  main <input> <device_id> [session]   input became the main source
  leave <input> <device_id> [session]  input stopped being the main source
  setting <key> <value>                store an integer setting and notify
  live <device_id>                     set the tuned device id
  key <code> down|up                   forward a key event
  current                              print the current input id
  port <device_id>                     print the HDMI port of a device
  hint <device_id>                     pass a CEC device id hint to the tuner
  is-hdmi <device_id>                  tell whether the id is an HDMI input
  phase                                print the selection phase
  result <code>                        completion code for the next selects
  bus                                  print and clear recorded CEC traffic
  quit";

/// What the console loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleOutcome {
    Reply(String),
    Quit,
}

/// Line commands against a running router and its simulated platform.
pub struct Console {
    client: RouterClient,
    sim: SimulatedPlatform,
}

impl Console {
    pub fn new(client: RouterClient, sim: SimulatedPlatform) -> Self {
        Self { client, sim }
    }

    pub async fn execute(&self, line: &str) -> anyhow::Result<ConsoleOutcome> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(ConsoleOutcome::Reply(String::new()));
        };
        let args: Vec<&str> = words.collect();
        let reply = match command {
            "main" | "leave" => {
                let input_id = arg(&args, 0, "input")?;
                let device_id: DeviceId = parse_arg(&args, 1, "device_id")?;
                let session_id = match args.get(2) {
                    Some(_) => parse_arg(&args, 2, "session")?,
                    None => 0,
                };
                self.client
                    .on_main_source_changed(command == "main", input_id, device_id, session_id)
                    .await?;
                "ok".to_string()
            }
            "setting" => {
                let key = arg(&args, 0, "key")?;
                let value: i32 = parse_arg(&args, 1, "value")?;
                self.sim.settings.put_int(key, value);
                "ok".to_string()
            }
            "live" => {
                self.sim.tuner.set_live_device_id(parse_arg(&args, 0, "device_id")?);
                "ok".to_string()
            }
            "key" => {
                let key_code = parse_arg(&args, 0, "code")?;
                let is_pressed = match arg(&args, 1, "down|up")? {
                    "down" => true,
                    "up" => false,
                    other => bail!("Expected down or up, got {:?}", other),
                };
                match self.client.send_key_event(key_code, is_pressed).await? {
                    true => "queued".to_string(),
                    false => "dropped (CEC unavailable)".to_string(),
                }
            }
            "current" => format!("{:?}", self.client.get_current_input().await?),
            "port" => {
                let device_id = parse_arg(&args, 0, "device_id")?;
                match self.client.get_port_id_by_device_id(device_id).await? {
                    Some(port_id) => port_id.to_string(),
                    None => "none".to_string(),
                }
            }
            "hint" => {
                self.client.set_device_id_for_cec(parse_arg(&args, 0, "device_id")?).await?;
                "ok".to_string()
            }
            "is-hdmi" => {
                let device_id = parse_arg(&args, 0, "device_id")?;
                self.client.is_hdmi_device_id(device_id).to_string()
            }
            "phase" => format!("{:?}", self.client.phase().await?),
            "result" => {
                let result = SelectResult::from_code(parse_arg(&args, 0, "code")?);
                self.sim.client.set_result(result);
                result.to_string()
            }
            "bus" => {
                let commands = self.sim.client.take();
                if commands.is_empty() {
                    "(no traffic)".to_string()
                } else {
                    commands
                        .iter()
                        .map(|command| format!("{:?}", command))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            "help" => HELP.to_string(),
            "quit" | "exit" => return Ok(ConsoleOutcome::Quit),
            other => bail!("Unknown command {:?}; try help", other),
        };
        Ok(ConsoleOutcome::Reply(reply))
    }
}

fn arg<'a>(args: &[&'a str], index: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(index).copied().ok_or_else(|| anyhow!("Missing argument <{}>", name))
}

fn parse_arg<T>(args: &[&str], index: usize, name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = arg(args, index, name)?;
    raw.parse().with_context(|| format!("Invalid <{}>: {:?}", name, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cec_router_core::definitions::{
        DEVICE_ID_HDMI1, HDMI_CONTROL_ENABLED, KEYCODE_MEDIA_PLAY_PAUSE,
    };
    use cec_router_core::device_directory::{HardwareInfo, HdmiDeviceInfo, InputInfo};
    use cec_router_core::simulated::CecCommand;
    use cec_router_core::{CecConfig, CecRouter, HdmiCecManager, ServiceHandle};
    use std::time::Duration;

    fn console() -> (Console, SimulatedPlatform, ServiceHandle) {
        let sim = SimulatedPlatform::new();
        sim.registry.add_input(InputInfo {
            id: "HDMI1".into(),
            parent_id: None,
            hdmi_device: Some(HdmiDeviceInfo {
                logical_address: 4,
                physical_address: 0x1000,
                port_id: 1,
                display_name: "Player".into(),
            }),
        });
        sim.registry.add_hardware(HardwareInfo { device_id: DEVICE_ID_HDMI1, hdmi_port_id: 1 });
        let manager = HdmiCecManager::new(CecConfig::default(), sim.platform());
        let (router, client) = CecRouter::new(manager, Some(sim.settings.subscribe()));
        let handle = router.run();
        (Console::new(client, sim.clone()), sim, handle)
    }

    fn reply(text: &str) -> ConsoleOutcome {
        ConsoleOutcome::Reply(text.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn main_then_current_reports_input() {
        let (console, sim, handle) = console();
        assert_eq!(console.execute("main HDMI1 5 1").await.unwrap(), reply("ok"));
        assert_eq!(console.execute("current").await.unwrap(), reply("\"HDMI1\""));
        assert_eq!(console.execute("phase").await.unwrap(), reply("Protected"));
        assert_eq!(sim.client.commands(), vec![CecCommand::DeviceSelect(4)]);
        assert_eq!(console.execute("bus").await.unwrap(), reply("DeviceSelect(4)"));
        assert_eq!(console.execute("bus").await.unwrap(), reply("(no traffic)"));
        let _ = handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn leave_falls_back_to_internal() {
        let (console, sim, handle) = console();
        console.execute("main HDMI1 5 1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(1600)).await;
        sim.client.take();
        console.execute("leave HDMI1 5 1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(console.execute("current").await.unwrap(), reply("\"\""));
        assert_eq!(sim.client.take(), vec![CecCommand::DeviceSelect(0)]);
        let _ = handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn queries_and_settings() {
        let (console, sim, handle) = console();
        assert_eq!(console.execute("port 5").await.unwrap(), reply("1"));
        assert_eq!(console.execute("port 6").await.unwrap(), reply("none"));
        assert_eq!(console.execute("is-hdmi 5").await.unwrap(), reply("true"));
        assert_eq!(console.execute("is-hdmi 1").await.unwrap(), reply("false"));
        console.execute(&format!("setting {} 0", HDMI_CONTROL_ENABLED)).await.unwrap();
        assert_eq!(
            console.execute(&format!("key {} down", KEYCODE_MEDIA_PLAY_PAUSE)).await.unwrap(),
            reply("queued")
        );
        console.execute("hint 5").await.unwrap();
        console.execute("current").await.unwrap();
        assert_eq!(sim.tuner.cec_hints(), vec![DEVICE_ID_HDMI1]);
        let _ = handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn bad_input_is_an_error_not_a_quit() {
        let (console, _sim, handle) = console();
        assert!(console.execute("main").await.is_err());
        assert!(console.execute("main HDMI1 five").await.is_err());
        assert!(console.execute("key 85 sideways").await.is_err());
        assert!(console.execute("frobnicate").await.is_err());
        assert_eq!(console.execute("   ").await.unwrap(), reply(""));
        assert_eq!(console.execute("quit").await.unwrap(), ConsoleOutcome::Quit);
        let _ = handle.shutdown().await;
    }
}
