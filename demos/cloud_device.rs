// SPDX-License-Identifier: MPL-2.0

//! Demo program: a cloud device that registers, logs in and refreshes its
//! token on a simulated schedule until Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example cloud_device -- [device-name] [auth-code] [server-uri] [sid] [apn]
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=debug cargo run --example cloud_device -- kitchen-light test coaps://cloud.example:5684
//! ```

use std::env;
use std::time::Duration;

use lifecore_lib::cloud::{CloudConfig, CloudContext, CloudEvent};
use lifecore_lib::fota::FotaSignal;
use lifecore_lib::types::{CloudFlag, CloudStatus, FirmwareDescriptor, FotaCommand};
use lifecore_lib::{Device, EventLoop, UserData};
use uuid::Uuid;

fn print_status(ctx: Option<&CloudContext>, status: CloudStatus, _data: Option<&UserData>) {
    println!("\nCloud Manager Status:");
    for flag in status.iter() {
        match flag {
            CloudFlag::Registered => println!("\t\t-Registered"),
            CloudFlag::TokenExpiring => match ctx.and_then(CloudContext::token_expiry) {
                Some(expiry) => println!("\t\t-Token Expiry: {expiry}"),
                None => println!("\t\t-Token Expiry: "),
            },
            CloudFlag::Failed => println!("\t\t-Failure"),
            CloudFlag::LoggedIn => println!("\t\t-Logged In"),
            CloudFlag::LoggedOut => println!("\t\t-Logged Out"),
            CloudFlag::Deregistered => println!("\t\t-DeRegistered"),
            CloudFlag::TokenRefreshed => println!("\t\t-Refreshed Token"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let device_name = args.get(1).map_or("Cloud Device", String::as_str);
    let auth_code = args.get(2).map_or("test", String::as_str);
    let server_uri = args.get(3).map_or("coap+tcp://127.0.0.1:5683", String::as_str);
    let sid = match args.get(4) {
        Some(sid) => Uuid::parse_str(sid)?,
        None => Uuid::from_u128(1),
    };
    let apn = args.get(5).map_or("test", String::as_str);

    println!(
        "Parameters: device_name: {device_name}, auth_code: {auth_code}, \
         server_uri: {server_uri}, sid: {sid}, apn: {apn}"
    );
    if args.len() == 1 {
        println!(
            "Usage: {} [device-name] [auth-code] [server-uri] [sid] [apn]",
            args[0]
        );
        println!("Using the default values");
    }

    let mut device = Device::new(0);
    device.register_fota_cmd_handler(|cmd| {
        println!("FOTA command: {cmd}, accepting");
        true
    });

    let mut cloud = device.cloud();
    cloud.start(print_status, None);
    cloud.provision(
        CloudConfig::new(server_uri, auth_code)
            .with_sid(sid)
            .with_apn(apn),
    )?;

    let event_loop = EventLoop::new(device);
    let handle = event_loop.handle();
    let shared = event_loop.device();
    let task = event_loop.spawn();

    // Simulated transport
    handle.schedule_cloud_event(CloudEvent::Connected, Duration::from_millis(500));
    handle.schedule_cloud_event(CloudEvent::SessionStarted, Duration::from_secs(1));
    handle.schedule_cloud_event(
        CloudEvent::TokenRefreshDue { expires_in: 3600 },
        Duration::from_secs(5),
    );
    handle.schedule_cloud_event(CloudEvent::TokenRotated, Duration::from_secs(6));

    let firmware = FirmwareDescriptor::new("1.2.0", format!("{server_uri}/fw/1.2.0.bin"))?;
    handle.post_fota_command(FotaCommand::StartDownload, Some(firmware));
    handle.schedule_fota_signal(FotaSignal::DownloadComplete, Duration::from_secs(3));

    println!("Running, press Ctrl-C to stop...");
    tokio::signal::ctrl_c().await?;
    handle.shutdown();
    task.await?;

    shared.lock().cloud().stop();
    let snapshot = match shared.try_unwrap() {
        Ok(device) => device.shutdown(),
        Err(shared) => shared.lock().fota_snapshot(),
    };
    println!("Final FOTA state: {}", snapshot.to_json()?);

    Ok(())
}
