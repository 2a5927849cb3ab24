// Example showing how to wire a simulated platform + HdmiCecManager + CecRouter
use std::time::Duration;
use anyhow::Result;
use cec_router_core::{CecConfig, CecControl, CecRouter, HdmiCecManager};
use cec_router_core::definitions::{DEVICE_ID_HDMI1, KEYCODE_MEDIA_PLAY_PAUSE};
use cec_router_core::device_directory::{HardwareInfo, HdmiDeviceInfo, InputInfo};
use cec_router_core::simulated::SimulatedPlatform;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let sim = SimulatedPlatform::new();
    sim.registry.add_input(InputInfo {
        id: "HDMI1".to_string(),
        parent_id: None,
        hdmi_device: Some(HdmiDeviceInfo {
            logical_address: 4,
            physical_address: 0x1000,
            port_id: 1,
            display_name: "Demo player".to_string(),
        }),
    });
    sim.registry.add_hardware(HardwareInfo { device_id: DEVICE_ID_HDMI1, hdmi_port_id: 1 });

    let config = CecConfig::default();
    config.validate()?;
    let manager = HdmiCecManager::new(config, sim.platform());
    let (router, client) = CecRouter::new(manager, Some(sim.settings.subscribe()));
    let router_handle = router.run();

    // Switch to HDMI1, toggle play/pause, then go back to the tuner
    client.on_main_source_changed(true, "HDMI1", DEVICE_ID_HDMI1, 1).await?;
    client.send_key_event(KEYCODE_MEDIA_PLAY_PAUSE, true).await?;
    client.send_key_event(KEYCODE_MEDIA_PLAY_PAUSE, false).await?;
    info!("Current input: {:?}", client.get_current_input().await?);

    tokio::time::sleep(Duration::from_secs(2)).await;
    client.on_main_source_changed(false, "HDMI1", DEVICE_ID_HDMI1, 1).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;

    for command in sim.client.commands() {
        info!("CEC bus saw {:?}", command);
    }
    router_handle.shutdown().await?;
    Ok(())
}
