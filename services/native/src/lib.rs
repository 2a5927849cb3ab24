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

pub mod cli;
pub mod console;
pub mod platform_file;

use std::sync::Arc;

use anyhow::anyhow;
use cec_router_core::{spawn_service, CecRouter, HdmiCecManager, MultiServiceHandle, ServiceHandle};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::select;
use tokio::sync::Notify;

use crate::cli::Cli;
use crate::console::{Console, ConsoleOutcome, HELP};
use crate::platform_file::PlatformDescription;

/// Host the router against the simulated platform until Ctrl+C, `quit` or end of input.
pub async fn run_service(cli: Cli) -> anyhow::Result<()> {
    let description = match &cli.platform {
        Some(path) => PlatformDescription::load(path)?,
        None => PlatformDescription::default(),
    };
    let (sim, config) = description.build();
    config.validate()?;

    let manager = HdmiCecManager::new(config, sim.platform());
    if !manager.is_available() {
        warn!("CEC is unavailable on this platform; selections will be ignored");
    }
    let (router, client) = CecRouter::new(manager, Some(sim.settings.subscribe()));

    let mut services = MultiServiceHandle::new();
    services.add(router.run());

    let finished = Arc::new(Notify::new());
    services.add(run_console(Console::new(client, sim), finished.clone()));

    println!("{}", HELP);
    select! {
        res = tokio::signal::ctrl_c() => {
            res.map_err(|e| anyhow!("Failed to listen for Ctrl+C signal: {}", e))?;
            info!("Received Ctrl+C signal, stopping");
        }
        _ = finished.notified() => {
            info!("Console closed, stopping");
        }
    }
    services.shutdown().await?;
    info!("Exit.");
    Ok(())
}

fn run_console(console: Console, finished: Arc<Notify>) -> ServiceHandle {
    spawn_service(move |mut stop| async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            select! {
                biased;
                _ = stop.signaled() => break,
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => break,
                        Err(e) => {
                            warn!("Reading console input failed: {}", e);
                            break;
                        }
                    };
                    match console.execute(&line).await {
                        Ok(ConsoleOutcome::Reply(text)) if text.is_empty() => {}
                        Ok(ConsoleOutcome::Reply(text)) => println!("{}", text),
                        Ok(ConsoleOutcome::Quit) => break,
                        Err(e) => println!("error: {:#}", e),
                    }
                }
            }
        }
        finished.notify_one();
    })
}
